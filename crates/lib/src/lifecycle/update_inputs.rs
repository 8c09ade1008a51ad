//! Changing the inputs of a running application.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::application::{Application, TemplateRevision};
use crate::manifest::InputDecl;
use crate::value::InputMap;

use super::types::{LifecycleError, ReleaseFailure, UpdateInputsOutcome};
use super::{LifecycleManager, release_target};

impl LifecycleManager {
  /// Re-render `application` with new input values and update its releases.
  ///
  /// `template` must be the revision the application was rendered from. The
  /// new inputs are checked against that revision's input schema: they must
  /// name exactly the inputs the application already has, and no immutable
  /// input may change. Re-rendering must keep every release the
  /// application has. Update failures are logged and reported, not raised.
  pub async fn update_inputs(
    &self,
    application: &Application,
    template: &TemplateRevision,
    inputs: InputMap,
    dry_run: bool,
  ) -> Result<UpdateInputsOutcome, LifecycleError> {
    let (_lock, mut application) = self.lock_and_reload(application).await?;
    let organization = application.organization_id;

    if template.id != application.template_id {
      return Err(LifecycleError::TemplateMismatch {
        application: application.id,
        expected: application.template_id,
        actual: template.id,
      });
    }

    info!(
      application = %application.id,
      organization = %organization,
      template = %template.id,
      dry_run,
      "starting input update"
    );

    self.resolver.validate_inputs(&template.inputs, &inputs)?;
    check_same_keys(&application.user_inputs, &inputs)?;

    let changed = changed_immutables(&template.inputs, &application.user_inputs, &inputs);
    if !changed.is_empty() {
      return Err(LifecycleError::ImmutableInputs(changed));
    }

    let current = self.parse_stored_manifest(&application)?;
    let manifest = self.resolver.render(&template.template, &inputs)?;
    let desired = self.resolver.parse(&manifest)?;

    let dropped: Vec<String> = current
      .chart_mapping
      .keys()
      .filter(|name| !desired.chart_mapping.contains_key(*name))
      .cloned()
      .collect();
    if !dropped.is_empty() {
      return Err(LifecycleError::ReleasesDropped(dropped));
    }

    let target = release_target(&application);
    let mut updated = BTreeMap::new();
    let mut failures = Vec::new();

    for chart in &desired.charts {
      match self.update_release(&target, chart, dry_run).await {
        Ok(info) => {
          info!(release = %chart.name, revision = info.revision, "updated release");
          updated.insert(chart.name.clone(), info);
        }
        Err(err) => {
          warn!(
            phase = "update_inputs",
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

    if dry_run {
      info!("dry run - not saving application");
    } else {
      application.manifest = manifest;
      application.user_inputs = inputs;
      self.repository.save(&application).await?;
      info!(application = %application.id, failures = failures.len(), "input update complete");
    }

    Ok(UpdateInputsOutcome {
      updated,
      failures,
      application,
    })
  }
}

/// The new inputs must name exactly the inputs the application already has.
fn check_same_keys(current: &InputMap, new: &InputMap) -> Result<(), LifecycleError> {
  let current_keys: BTreeSet<&String> = current.keys().collect();
  let new_keys: BTreeSet<&String> = new.keys().collect();
  if current_keys == new_keys {
    return Ok(());
  }

  let mut problems = Vec::new();
  let missing: Vec<&str> = current_keys.difference(&new_keys).map(|k| k.as_str()).collect();
  if !missing.is_empty() {
    problems.push(format!("missing inputs: {}", missing.join(", ")));
  }
  let added: Vec<&str> = new_keys.difference(&current_keys).map(|k| k.as_str()).collect();
  if !added.is_empty() {
    problems.push(format!("unexpected inputs: {}", added.join(", ")));
  }
  Err(LifecycleError::InvalidInputs(problems.join("; ")))
}

/// Names of immutable inputs whose value differs, in schema order.
fn changed_immutables(schema: &[InputDecl], current: &InputMap, new: &InputMap) -> Vec<String> {
  schema
    .iter()
    .filter(|decl| decl.immutable && current.get(&decl.name) != new.get(&decl.name))
    .map(|decl| decl.name.clone())
    .collect()
}
