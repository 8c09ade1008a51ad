use std::fmt;

use serde::{Deserialize, Serialize};

use crate::manifest::InputDecl;
use crate::value::InputMap;

/// Application record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

/// Organization identifier. Every record and template belongs to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganizationId(pub u64);

/// Template revision identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub u64);

impl fmt::Display for ApplicationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl fmt::Display for OrganizationId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl fmt::Display for TemplateId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The identity a lifecycle call acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  pub user_id: String,
  pub organization_id: OrganizationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
  Running,
}

/// A versioned application template.
///
/// Read-only to the lifecycle manager. `inputs` is the schema callers fill;
/// `template` is the raw text rendered into a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRevision {
  pub id: TemplateId,
  pub organization_id: OrganizationId,
  pub creator_id: String,
  #[serde(default)]
  pub inputs: Vec<InputDecl>,
  pub template: String,
}

/// A persisted application record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
  pub id: ApplicationId,
  pub name: String,
  #[serde(default)]
  pub description: String,
  /// Manifest text of the last successfully applied rendering.
  pub manifest: String,
  pub status: ApplicationStatus,
  pub context_name: String,
  pub namespace: String,
  pub user_inputs: InputMap,
  pub template_id: TemplateId,
  pub creator_id: String,
  pub organization_id: OrganizationId,
}

/// Fields for a record that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
  pub name: String,
  pub description: String,
  pub manifest: String,
  pub status: ApplicationStatus,
  pub context_name: String,
  pub namespace: String,
  pub user_inputs: InputMap,
  pub template_id: TemplateId,
  pub creator_id: String,
  pub organization_id: OrganizationId,
}

impl NewApplication {
  /// Attach an identifier, producing the stored record.
  pub fn with_id(self, id: ApplicationId) -> Application {
    Application {
      id,
      name: self.name,
      description: self.description,
      manifest: self.manifest,
      status: self.status,
      context_name: self.context_name,
      namespace: self.namespace,
      user_inputs: self.user_inputs,
      template_id: self.template_id,
      creator_id: self.creator_id,
      organization_id: self.organization_id,
    }
  }
}
