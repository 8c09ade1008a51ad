//! Template resolution.
//!
//! A template revision is raw text that renders into a manifest document
//! (see [`crate::manifest`]). Rendering and parsing sit behind the
//! [`TemplateResolver`] trait so the lifecycle manager does not depend on a
//! particular template engine.
//!
//! # Submodules
//!
//! - [`inputs`] - input schema validation and default merging
//! - [`render`] - the handlebars-backed default resolver

pub mod inputs;
pub mod render;

use thiserror::Error;

use crate::manifest::{InputDecl, ManifestSchema};
use crate::value::InputMap;

pub use render::HandlebarsResolver;

/// Errors raised while validating inputs, rendering, or parsing a manifest.
#[derive(Debug, Error)]
pub enum TemplateError {
  /// Inputs do not match the template's input schema.
  #[error("invalid inputs: {0}")]
  InvalidInputs(String),

  /// Template syntax is invalid or references an unresolved input.
  #[error("failed to render template: {0}")]
  Render(String),

  /// Rendered manifest is not a valid manifest document.
  #[error("failed to parse manifest: {0}")]
  Parse(String),

  /// Two charts share a release name.
  #[error("duplicate release name in manifest: {0}")]
  DuplicateRelease(String),

  /// Two inputs share a name.
  #[error("duplicate input name in manifest: {0}")]
  DuplicateInput(String),

  /// A chart that has to be installed declares no version.
  #[error("chart for release {release} has no version")]
  MissingVersion { release: String },
}

/// Renders templates and parses the resulting manifests.
pub trait TemplateResolver: Send + Sync {
  /// Render `template` with the given inputs into manifest text.
  fn render(&self, template: &str, inputs: &InputMap) -> Result<String, TemplateError>;

  /// Parse rendered manifest text.
  fn parse(&self, manifest: &str) -> Result<ManifestSchema, TemplateError> {
    ManifestSchema::from_yaml(manifest)
  }

  /// Check `inputs` against an input schema.
  fn validate_inputs(&self, schema: &[InputDecl], inputs: &InputMap) -> Result<(), TemplateError> {
    inputs::validate(schema, inputs)
  }
}
