//! Input schema validation and default handling.

use crate::manifest::InputDecl;
use crate::value::InputMap;

use super::TemplateError;

/// Validate user inputs against an input schema.
///
/// Every supplied input must be declared, and every required input (one
/// without a default) must be supplied. All problems are reported together.
pub fn validate(schema: &[InputDecl], inputs: &InputMap) -> Result<(), TemplateError> {
  let unknown: Vec<&str> = inputs
    .keys()
    .filter(|name| !schema.iter().any(|decl| &decl.name == *name))
    .map(String::as_str)
    .collect();

  let missing: Vec<&str> = schema
    .iter()
    .filter(|decl| decl.required() && !inputs.contains_key(&decl.name))
    .map(|decl| decl.name.as_str())
    .collect();

  let mut problems = Vec::new();
  if !unknown.is_empty() {
    problems.push(format!("unknown inputs: {}", unknown.join(", ")));
  }
  if !missing.is_empty() {
    problems.push(format!("missing required inputs: {}", missing.join(", ")));
  }

  if problems.is_empty() {
    Ok(())
  } else {
    Err(TemplateError::InvalidInputs(problems.join("; ")))
  }
}

/// Defaults declared by a schema, keyed by input name.
pub fn defaults(schema: &[InputDecl]) -> InputMap {
  schema
    .iter()
    .filter_map(|decl| decl.default.clone().map(|value| (decl.name.clone(), value)))
    .collect()
}

/// Overlay `inputs` on the schema defaults. Supplied values win.
pub fn with_defaults(schema: &[InputDecl], inputs: &InputMap) -> InputMap {
  let mut merged = defaults(schema);
  merged.extend(inputs.iter().map(|(k, v)| (k.clone(), v.clone())));
  merged
}
