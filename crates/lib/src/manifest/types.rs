//! Manifest types for chartdeck.
//!
//! # Document Format
//!
//! ```yaml
//! name: storefront
//! inputs:
//!   - name: region
//!     default: us-east
//!     immutable: true
//!   - name: replicas
//!     default: 2
//! charts:
//!   - name: frontend
//!     chart: bitnami/nginx
//!     version: 15.4.0
//!     values:
//!       replicaCount: 2
//! ```
//!
//! The chart `name` is the release name. It is unique within a manifest and is
//! the identity used when diffing two manifests.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::template::TemplateError;
use crate::value::{Value, ValueMap};

/// A declared template input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputDecl {
  pub name: String,

  /// Default used when the caller does not supply the input.
  /// Inputs without a default are required.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default: Option<Value>,

  /// Immutable inputs cannot change after the application is installed.
  #[serde(default)]
  pub immutable: bool,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

impl InputDecl {
  pub fn required(&self) -> bool {
    self.default.is_none()
  }
}

/// A chart to deploy as a named release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDecl {
  /// Release name.
  pub name: String,

  /// Chart reference, e.g. `bitnami/nginx`.
  pub chart: String,

  /// Chart version. Required when the release is installed, ignored on update.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,

  #[serde(default)]
  pub values: ValueMap,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
  name: String,
  #[serde(default)]
  description: Option<String>,
  #[serde(default)]
  inputs: Vec<InputDecl>,
  #[serde(default)]
  charts: Vec<ChartDecl>,
}

/// A parsed manifest.
///
/// `charts` keeps declaration order (install order); `chart_mapping` is keyed
/// by release name for diffing.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestSchema {
  pub name: String,
  pub description: Option<String>,
  pub inputs: Vec<InputDecl>,
  pub charts: Vec<ChartDecl>,
  pub chart_mapping: BTreeMap<String, ChartDecl>,
}

impl ManifestSchema {
  /// Parse a rendered manifest document.
  ///
  /// Fails with [`TemplateError::Parse`] on malformed YAML and with
  /// [`TemplateError::DuplicateRelease`] / [`TemplateError::DuplicateInput`]
  /// when a name is declared twice.
  pub fn from_yaml(text: &str) -> Result<Self, TemplateError> {
    let raw: RawManifest = serde_yaml::from_str(text).map_err(|e| TemplateError::Parse(e.to_string()))?;

    let mut seen_inputs = HashSet::new();
    for input in &raw.inputs {
      if !seen_inputs.insert(input.name.as_str()) {
        return Err(TemplateError::DuplicateInput(input.name.clone()));
      }
    }

    let mut chart_mapping = BTreeMap::new();
    for chart in &raw.charts {
      if chart_mapping.insert(chart.name.clone(), chart.clone()).is_some() {
        return Err(TemplateError::DuplicateRelease(chart.name.clone()));
      }
    }

    Ok(Self {
      name: raw.name,
      description: raw.description,
      inputs: raw.inputs,
      charts: raw.charts,
      chart_mapping,
    })
  }
}
