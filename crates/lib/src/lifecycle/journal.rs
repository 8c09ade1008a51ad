//! Install journal and rollback.
//!
//! Every release installed during an install or upgrade is recorded here in
//! order. When a later install fails, [`InstallJournal::unwind`] uninstalls
//! the recorded releases newest first. Releases that were updated or removed
//! are never recorded and never compensated.

use tracing::{error, info};

use crate::application::{OrganizationId, TemplateId};
use crate::chart::ReleaseTarget;

use super::LifecycleManager;
use super::types::ReleaseFailure;

/// Which lifecycle call owns the journal. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Installation,
  Upgrade,
}

impl Phase {
  fn as_str(self) -> &'static str {
    match self {
      Phase::Installation => "installation",
      Phase::Upgrade => "upgrade",
    }
  }
}

/// Ordered record of releases installed by the current call.
#[derive(Debug)]
pub struct InstallJournal {
  phase: Phase,
  organization_id: OrganizationId,
  template_id: TemplateId,
  installed: Vec<String>,
}

impl InstallJournal {
  pub fn new(phase: Phase, organization_id: OrganizationId, template_id: TemplateId) -> Self {
    Self {
      phase,
      organization_id,
      template_id,
      installed: Vec::new(),
    }
  }

  /// Record a release whose install succeeded.
  pub fn record(&mut self, release: &str) {
    self.installed.push(release.to_string());
  }

  /// Uninstall every recorded release, newest first.
  ///
  /// Every compensation is attempted. A failing uninstall is logged and
  /// returned, and does not stop the remaining ones.
  pub async fn unwind(self, manager: &LifecycleManager, target: &ReleaseTarget, dry_run: bool) -> Vec<ReleaseFailure> {
    if self.installed.is_empty() {
      return Vec::new();
    }

    info!(
      phase = self.phase.as_str(),
      organization = %self.organization_id,
      template = %self.template_id,
      count = self.installed.len(),
      "rolling back installed releases"
    );

    let mut failures = Vec::new();
    for release in self.installed.iter().rev() {
      match manager.uninstall_release(target, release, dry_run).await {
        Ok(()) => info!(release = %release, "rolled back release"),
        Err(err) => {
          error!(
            phase = self.phase.as_str(),
            organization = %self.organization_id,
            template = %self.template_id,
            release = %release,
            error = %err,
            "rollback of release failed"
          );
          failures.push(ReleaseFailure::from(&err));
        }
      }
    }
    failures
  }
}
