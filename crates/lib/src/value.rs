//! Typed values for template inputs and chart values.
//!
//! Inputs and chart values are dynamic documents, but they are passed to the
//! chart client verbatim, so they are modeled as a closed union instead of an
//! untyped JSON blob. Maps are key-ordered ([`BTreeMap`]) so that serialized
//! manifests and value files are deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Key-ordered map of values, used for both chart values and user inputs.
pub type ValueMap = BTreeMap<String, Value>;

/// User inputs keyed by input name.
pub type InputMap = BTreeMap<String, Value>;

/// A single value in a manifest, input map, or chart value file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  /// YAML `~`/`null`, or a key with no value.
  Null,
  Bool(bool),
  Integer(i64),
  Float(f64),
  String(String),
  Array(Vec<Value>),
  Table(ValueMap),
}

impl Value {
  /// Parse a value from a `--set`-style literal.
  ///
  /// The literal is read as a YAML scalar or flow collection, so `3` becomes an
  /// integer, `true` a boolean and `null` [`Value::Null`]. An empty literal or
  /// anything that does not parse is kept as a plain string.
  pub fn parse_literal(raw: &str) -> Value {
    if raw.trim().is_empty() {
      return Value::String(raw.to_string());
    }
    serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
  }

  /// Returns the string contents for [`Value::String`].
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Value::Null => write!(f, "null"),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Integer(i) => write!(f, "{}", i),
      Value::Float(n) => write!(f, "{}", n),
      Value::String(s) => write!(f, "{}", s),
      Value::Array(_) | Value::Table(_) => {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        write!(f, "{}", json)
      }
    }
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Integer(value)
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}
