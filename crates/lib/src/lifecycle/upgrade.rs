//! Moving an application to a new template revision.

use std::collections::BTreeMap;

use tracing::{error, info, warn};

use crate::application::{Application, TemplateRevision};
use crate::diff::compute_diff;
use crate::template::inputs::with_defaults;

use super::journal::{InstallJournal, Phase};
use super::types::{LifecycleError, ReleaseFailure, UpgradeOutcome};
use super::{LifecycleManager, install_version, release_target};

impl LifecycleManager {
  /// Re-render `application` from `template` and converge its releases.
  ///
  /// The stored inputs are overlaid on the new revision's defaults, so values
  /// the user chose survive and newly declared inputs get their default.
  /// Releases are then processed in three passes:
  ///
  /// 1. install releases only in the new manifest, in manifest order; a
  ///    failure rolls back the installs of this call and aborts
  /// 2. update releases in both manifests; failures are logged and reported
  /// 3. uninstall releases only in the old manifest; failures are logged and
  ///    reported
  ///
  /// Unless `dry_run` is set, the record then takes the new manifest,
  /// template id, and merged inputs.
  pub async fn upgrade(
    &self,
    application: &Application,
    template: &TemplateRevision,
    dry_run: bool,
  ) -> Result<UpgradeOutcome, LifecycleError> {
    let (_lock, mut application) = self.lock_and_reload(application).await?;
    let organization = application.organization_id;

    info!(
      application = %application.id,
      organization = %organization,
      from_template = %application.template_id,
      template = %template.id,
      dry_run,
      "starting upgrade"
    );

    let merged = with_defaults(&template.inputs, &application.user_inputs);
    let manifest = self.resolver.render(&template.template, &merged)?;
    let desired = self.resolver.parse(&manifest)?;
    let current = self.parse_stored_manifest(&application)?;

    let diff = compute_diff(&current.chart_mapping, &desired.chart_mapping);
    info!(
      install = diff.to_install.len(),
      update = diff.to_update.len(),
      remove = diff.to_remove.len(),
      "computed release diff"
    );

    // Manifest order, as on first install.
    let new_charts = desired
      .charts
      .iter()
      .filter(|chart| diff.to_install.contains(&chart.name))
      .map(|chart| install_version(chart).map(|version| (chart, version)))
      .collect::<Result<Vec<_>, _>>()?;

    let target = release_target(&application);
    let mut journal = InstallJournal::new(Phase::Upgrade, organization, template.id);
    let mut installed = BTreeMap::new();

    for (chart, version) in new_charts {
      match self.install_release(&target, chart, version, dry_run).await {
        Ok(info) => {
          info!(release = %chart.name, revision = info.revision, "installed release");
          journal.record(&chart.name);
          installed.insert(chart.name.clone(), info);
        }
        Err(err) => {
          error!(
            phase = "upgrade",
            organization = %organization,
            template = %template.id,
            release = %chart.name,
            error = %err,
            "chart install failed"
          );
          journal.unwind(self, &target, dry_run).await;
          return Err(err.into());
        }
      }
    }

    let mut updated = BTreeMap::new();
    let mut failures = Vec::new();

    for chart in diff.to_update.iter().filter_map(|name| desired.chart_mapping.get(name)) {
      match self.update_release(&target, chart, dry_run).await {
        Ok(info) => {
          info!(release = %chart.name, revision = info.revision, "updated release");
          updated.insert(chart.name.clone(), info);
        }
        Err(err) => {
          warn!(
            phase = "upgrade",
            organization = %organization,
            template = %template.id,
            release = %chart.name,
            error = %err,
            "chart update failed, continuing"
          );
          failures.push(ReleaseFailure::from(&err));
        }
      }
    }

    let mut uninstalled = Vec::new();

    for release in &diff.to_remove {
      match self.uninstall_release(&target, release, dry_run).await {
        Ok(()) => {
          info!(release = %release, "uninstalled release");
          uninstalled.push(release.clone());
        }
        Err(err) => {
          warn!(
            phase = "upgrade",
            organization = %organization,
            template = %template.id,
            release = %release,
            error = %err,
            "chart uninstall failed, continuing"
          );
          failures.push(ReleaseFailure::from(&err));
        }
      }
    }

    if dry_run {
      info!("dry run - not saving application");
    } else {
      application.manifest = manifest;
      application.template_id = template.id;
      application.user_inputs = merged;
      self.repository.save(&application).await?;
      info!(application = %application.id, failures = failures.len(), "upgrade complete");
    }

    Ok(UpgradeOutcome {
      diff,
      installed,
      updated,
      uninstalled,
      failures,
      application,
    })
  }
}
