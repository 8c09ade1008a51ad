//! Implementation of the `chartdeck show` command.

use anyhow::{Context, Result};

use chartdeck_lib::application::{ApplicationId, ApplicationRepository, OrganizationId};
use chartdeck_lib::config::Settings;

use crate::output::{print_json, print_stat, print_success};

use super::{open_store, runtime};

pub fn cmd_show(settings: &Settings, id: u64, org: u64, json: bool) -> Result<()> {
  let store = open_store(settings);
  let app = runtime()?
    .block_on(store.get(ApplicationId(id), OrganizationId(org)))
    .with_context(|| format!("Failed to load application {}", id))?;

  if json {
    return print_json(&app);
  }

  print_success(&format!("{} ({})", app.name, app.id));
  if !app.description.is_empty() {
    print_stat("Description", &app.description);
  }
  print_stat("Status", "running");
  print_stat("Context", &app.context_name);
  print_stat("Namespace", &app.namespace);
  print_stat("Template", &app.template_id.to_string());
  print_stat("Creator", &app.creator_id);
  println!();
  println!("Inputs:");
  for (name, value) in &app.user_inputs {
    print_stat(name, &value.to_string());
  }
  println!();
  println!("Manifest:");
  for line in app.manifest.lines() {
    println!("  {}", line);
  }
  Ok(())
}
