//! Implementation of the `chartdeck render` command.
//!
//! Validates inputs against a template revision, renders it, and prints the
//! charts an install would deploy.

use std::path::Path;

use anyhow::{Context, Result};

use chartdeck_lib::template::inputs::with_defaults;
use chartdeck_lib::template::{HandlebarsResolver, TemplateResolver};
use chartdeck_lib::value::{InputMap, Value};

use crate::output::{print_json, print_stat, print_success, symbols};

use super::{load_inputs, load_revision};

pub fn cmd_render(revision: &Path, inputs_file: Option<&Path>, sets: Vec<(String, Value)>, json: bool) -> Result<()> {
  let revision = load_revision(revision)?;

  let mut inputs = match inputs_file {
    Some(path) => load_inputs(path)?,
    None => InputMap::new(),
  };
  inputs.extend(sets);

  let resolver = HandlebarsResolver::new();
  resolver
    .validate_inputs(&revision.inputs, &inputs)
    .context("Inputs do not match the template")?;
  let effective = with_defaults(&revision.inputs, &inputs);

  let manifest = resolver
    .render(&revision.template, &effective)
    .context("Failed to render template")?;
  let schema = resolver.parse(&manifest).context("Rendered manifest is invalid")?;

  if json {
    return print_json(&serde_json::json!({
      "template": revision.id,
      "name": schema.name,
      "inputs": effective,
      "charts": schema.charts,
    }));
  }

  print_success(&format!("Rendered {} from template {}", schema.name, revision.id));
  println!();
  println!("Inputs:");
  for (name, value) in &effective {
    print_stat(name, &value.to_string());
  }
  println!();
  println!("Charts ({}):", schema.charts.len());
  for chart in &schema.charts {
    let version = chart.version.as_deref().unwrap_or("unpinned");
    println!("  {} {} {} {}", symbols::ADD, chart.name, chart.chart, version);
  }
  Ok(())
}
