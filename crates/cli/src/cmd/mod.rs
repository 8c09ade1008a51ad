//! Subcommand implementations.
//!
//! Commands are synchronous; the ones that touch the application store run
//! their async work on a runtime built per invocation.

mod list;
mod plan;
mod render;
mod show;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use chartdeck_lib::application::{FileApplicationStore, TemplateRevision};
use chartdeck_lib::config::Settings;
use chartdeck_lib::value::{InputMap, Value};

pub use list::cmd_list;
pub use plan::cmd_plan;
pub use render::cmd_render;
pub use show::cmd_show;

/// Read a template revision from a YAML file.
pub fn load_revision(path: &Path) -> Result<TemplateRevision> {
  let content =
    fs::read_to_string(path).with_context(|| format!("Failed to read template revision: {}", path.display()))?;
  serde_yaml::from_str(&content).with_context(|| format!("Failed to parse template revision: {}", path.display()))
}

/// Read an input map from a YAML file.
pub fn load_inputs(path: &Path) -> Result<InputMap> {
  let content = fs::read_to_string(path).with_context(|| format!("Failed to read inputs: {}", path.display()))?;
  serde_yaml::from_str(&content).with_context(|| format!("Failed to parse inputs: {}", path.display()))
}

/// Parse a `--set name=value` argument. The value is read as a YAML scalar.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
  match raw.split_once('=') {
    Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), Value::parse_literal(value))),
    _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
  }
}

pub fn open_store(settings: &Settings) -> FileApplicationStore {
  FileApplicationStore::new(settings.store_path())
}

pub fn runtime() -> Result<tokio::runtime::Runtime> {
  tokio::runtime::Runtime::new().context("Failed to create async runtime")
}
