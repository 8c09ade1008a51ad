//! First deployment of an application.

use std::collections::BTreeMap;

use tracing::{error, info};

use crate::application::{Actor, ApplicationStatus, NewApplication, TemplateRevision};
use crate::chart::ReleaseTarget;
use crate::template::inputs::with_defaults;
use crate::value::InputMap;

use super::journal::{InstallJournal, Phase};
use super::types::{InstallOutcome, LifecycleError, Placement};
use super::{LifecycleManager, install_version};

impl LifecycleManager {
  /// Render `template` with `inputs` and install every chart of the result.
  ///
  /// Charts are installed in manifest order. If one fails, the charts
  /// installed before it are uninstalled newest first and the original
  /// failure is returned; no record is written. On success a record holding
  /// the manifest and the effective inputs (defaults filled in) is created,
  /// unless `dry_run` is set.
  pub async fn install(
    &self,
    actor: &Actor,
    template: &TemplateRevision,
    placement: Placement,
    inputs: InputMap,
    dry_run: bool,
  ) -> Result<InstallOutcome, LifecycleError> {
    info!(
      organization = %actor.organization_id,
      template = %template.id,
      context = %placement.context_name,
      namespace = %placement.namespace,
      dry_run,
      "starting installation"
    );

    self.resolver.validate_inputs(&template.inputs, &inputs)?;
    let effective = with_defaults(&template.inputs, &inputs);

    let manifest = self.resolver.render(&template.template, &effective)?;
    let schema = self.resolver.parse(&manifest)?;

    // Every chart is new; check versions before touching the cluster.
    let versions = schema
      .charts
      .iter()
      .map(install_version)
      .collect::<Result<Vec<_>, _>>()?;

    let target = ReleaseTarget {
      organization_id: actor.organization_id,
      context_name: placement.context_name.clone(),
      namespace: placement.namespace.clone(),
    };

    let mut journal = InstallJournal::new(Phase::Installation, actor.organization_id, template.id);
    let mut results = BTreeMap::new();

    for (chart, version) in schema.charts.iter().zip(versions) {
      match self.install_release(&target, chart, version, dry_run).await {
        Ok(info) => {
          info!(release = %chart.name, revision = info.revision, "installed release");
          journal.record(&chart.name);
          results.insert(chart.name.clone(), info);
        }
        Err(err) => {
          error!(
            phase = "installation",
            organization = %actor.organization_id,
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

    if dry_run {
      info!(releases = results.len(), "dry run - not saving application");
      return Ok(InstallOutcome {
        application: None,
        results,
      });
    }

    let application = self
      .repository
      .create(NewApplication {
        name: schema.name.clone(),
        description: schema.description.clone().unwrap_or_default(),
        manifest,
        status: ApplicationStatus::Running,
        context_name: placement.context_name,
        namespace: placement.namespace,
        user_inputs: effective,
        template_id: template.id,
        creator_id: actor.user_id.clone(),
        organization_id: actor.organization_id,
      })
      .await?;

    info!(application = %application.id, releases = results.len(), "installation complete");
    Ok(InstallOutcome {
      application: Some(application),
      results,
    })
  }
}
