//! Implementation of the `chartdeck plan` command.
//!
//! Previews an upgrade of a stored application to a new template revision:
//! the inputs it would render with and which releases would be installed,
//! updated, or removed. Nothing is deployed or saved.

use std::path::Path;

use anyhow::{Context, Result};

use chartdeck_lib::application::{ApplicationId, ApplicationRepository, OrganizationId};
use chartdeck_lib::config::Settings;
use chartdeck_lib::diff::compute_diff;
use chartdeck_lib::template::inputs::with_defaults;
use chartdeck_lib::template::{HandlebarsResolver, TemplateResolver};

use crate::output::{print_info, print_json, print_stat, print_success, symbols};

use super::{load_revision, open_store, runtime};

pub fn cmd_plan(settings: &Settings, id: u64, org: u64, revision: &Path, json: bool) -> Result<()> {
  let revision = load_revision(revision)?;
  let store = open_store(settings);

  let application = runtime()?
    .block_on(store.get(ApplicationId(id), OrganizationId(org)))
    .with_context(|| format!("Failed to load application {}", id))?;

  let resolver = HandlebarsResolver::new();
  let merged = with_defaults(&revision.inputs, &application.user_inputs);
  let manifest = resolver
    .render(&revision.template, &merged)
    .context("Failed to render template")?;
  let desired = resolver.parse(&manifest).context("Rendered manifest is invalid")?;
  let current = resolver
    .parse(&application.manifest)
    .context("Stored manifest is invalid")?;

  let diff = compute_diff(&current.chart_mapping, &desired.chart_mapping);

  if json {
    return print_json(&serde_json::json!({
      "application": application.id,
      "from_template": application.template_id,
      "to_template": revision.id,
      "inputs": merged,
      "to_install": diff.to_install,
      "to_update": diff.to_update,
      "to_remove": diff.to_remove,
    }));
  }

  print_success(&format!(
    "Plan for {} ({}): template {} {} {}",
    application.name,
    application.id,
    application.template_id,
    symbols::ARROW,
    revision.id
  ));
  println!();
  println!("Inputs:");
  for (name, value) in &merged {
    print_stat(name, &value.to_string());
  }
  println!();

  if diff.total_releases() == 0 {
    print_info("No releases in either manifest.");
    return Ok(());
  }

  println!("Releases:");
  for name in &diff.to_install {
    println!("  {} {}", symbols::ADD, name);
  }
  for name in &diff.to_update {
    println!("  {} {}", symbols::MODIFY, name);
  }
  for name in &diff.to_remove {
    println!("  {} {}", symbols::REMOVE, name);
  }
  println!();
  print_stat("To install", &diff.to_install.len().to_string());
  print_stat("To update", &diff.to_update.len().to_string());
  print_stat("To remove", &diff.to_remove.len().to_string());
  Ok(())
}
