//! Implementation of the `chartdeck list` command.

use anyhow::{Context, Result};

use chartdeck_lib::application::{ApplicationRepository, OrganizationId};
use chartdeck_lib::config::Settings;

use crate::output::{print_info, print_json, symbols};

use super::{open_store, runtime};

pub fn cmd_list(settings: &Settings, org: u64, json: bool) -> Result<()> {
  let store = open_store(settings);
  let applications = runtime()?
    .block_on(store.list(OrganizationId(org)))
    .context("Failed to list applications")?;

  if json {
    return print_json(&applications);
  }

  if applications.is_empty() {
    print_info(&format!("No applications for organization {}.", org));
    return Ok(());
  }

  for app in &applications {
    println!(
      "  {} {:>4}  {}  {}/{}  template {}",
      symbols::INFO,
      app.id,
      app.name,
      app.context_name,
      app.namespace,
      app.template_id
    );
  }
  Ok(())
}
