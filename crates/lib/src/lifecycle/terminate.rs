//! Tearing an application down.

use tracing::{info, warn};

use crate::application::Application;

use super::types::{LifecycleError, ReleaseFailure, TerminateOutcome};
use super::{LifecycleManager, release_target};

impl LifecycleManager {
  /// Uninstall every release of `application` and delete its record.
  ///
  /// Uninstall failures are logged and reported; the record is deleted
  /// regardless so a half-removed application cannot block cleanup.
  pub async fn terminate(&self, application: &Application) -> Result<TerminateOutcome, LifecycleError> {
    let (_lock, application) = self.lock_and_reload(application).await?;

    info!(
      application = %application.id,
      organization = %application.organization_id,
      template = %application.template_id,
      "starting termination"
    );

    let current = self.parse_stored_manifest(&application)?;
    let target = release_target(&application);
    let mut outcome = TerminateOutcome::default();

    for chart in &current.charts {
      match self.uninstall_release(&target, &chart.name, false).await {
        Ok(()) => {
          info!(release = %chart.name, "uninstalled release");
          outcome.uninstalled.push(chart.name.clone());
        }
        Err(err) => {
          warn!(
            phase = "terminate",
            organization = %application.organization_id,
            template = %application.template_id,
            release = %chart.name,
            error = %err,
            "chart uninstall failed, continuing"
          );
          outcome.failures.push(ReleaseFailure::from(&err));
        }
      }
    }

    self.repository.delete(application.id).await?;
    info!(
      application = %application.id,
      failures = outcome.failures.len(),
      "termination complete"
    );
    Ok(outcome)
  }
}
