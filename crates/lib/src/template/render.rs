//! Handlebars-backed template resolver.
//!
//! Templates see their inputs under the `inputs` key:
//!
//! ```yaml
//! charts:
//!   - name: frontend
//!     chart: bitnami/nginx
//!     version: 15.4.0
//!     values:
//!       replicaCount: {{inputs.replicas}}
//!       ingress:
//!         hosts: {{json inputs.hosts}}
//! ```
//!
//! Strict mode is enabled, so a reference to an input that was not supplied is
//! a render error rather than an empty string. Output is not HTML-escaped.

use handlebars::{Context, Handlebars, Helper, HelperResult, Output, RenderContext};
use tracing::debug;

use crate::value::InputMap;

use super::{TemplateError, TemplateResolver};

/// Default [`TemplateResolver`] built on `handlebars`.
pub struct HandlebarsResolver {
  registry: Handlebars<'static>,
}

impl HandlebarsResolver {
  pub fn new() -> Self {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    registry.register_escape_fn(handlebars::no_escape);
    registry.register_helper("json", Box::new(json_helper));
    Self { registry }
  }
}

impl Default for HandlebarsResolver {
  fn default() -> Self {
    Self::new()
  }
}

impl TemplateResolver for HandlebarsResolver {
  fn render(&self, template: &str, inputs: &InputMap) -> Result<String, TemplateError> {
    debug!(inputs = inputs.len(), "rendering template");
    let data = serde_json::json!({ "inputs": inputs });
    self
      .registry
      .render_template(template, &data)
      .map_err(|e| TemplateError::Render(e.to_string()))
  }
}

/// Emits its argument as JSON, which is also valid YAML flow syntax.
fn json_helper(
  h: &Helper,
  _: &Handlebars,
  _: &Context,
  _: &mut RenderContext,
  out: &mut dyn Output,
) -> HelperResult {
  if let Some(param) = h.param(0) {
    out.write(&serde_json::to_string(param.value()).unwrap_or_default())?;
  }
  Ok(())
}
