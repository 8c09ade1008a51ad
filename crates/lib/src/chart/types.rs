use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::OrganizationId;
use crate::value::ValueMap;

/// Where a release lives: the owning organization, cluster context, and namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTarget {
  pub organization_id: OrganizationId,
  pub context_name: String,
  pub namespace: String,
}

/// The kind of chart operation, used in errors and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartOperation {
  Install,
  Update,
  Uninstall,
}

impl fmt::Display for ChartOperation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChartOperation::Install => write!(f, "install"),
      ChartOperation::Update => write!(f, "update"),
      ChartOperation::Uninstall => write!(f, "uninstall"),
    }
  }
}

/// Release status as reported by the chart backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseStatus {
  Deployed,
  Failed,
  PendingInstall,
  PendingUpgrade,
  Superseded,
  Uninstalled,
  Unknown,
}

/// Result of a successful install or update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
  pub name: String,
  pub namespace: String,
  pub chart: String,
  pub revision: u32,
  pub status: ReleaseStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub app_version: Option<String>,
}

/// A chart operation failed.
///
/// Timeouts and cancellations are reported as errors like any other failure
/// so that callers run the same compensation logic for all of them.
#[derive(Debug, Clone, Error)]
pub enum ChartError {
  /// The backend rejected or failed the operation.
  #[error("{operation} of release {release} failed: {message}")]
  Failed {
    operation: ChartOperation,
    release: String,
    message: String,
  },

  /// The operation did not finish within the configured deadline.
  #[error("{operation} of release {release} timed out")]
  TimedOut { operation: ChartOperation, release: String },

  /// The operation was cancelled before completion.
  #[error("{operation} of release {release} was cancelled")]
  Cancelled { operation: ChartOperation, release: String },
}

impl ChartError {
  pub fn failed(operation: ChartOperation, release: &str, message: impl Into<String>) -> Self {
    ChartError::Failed {
      operation,
      release: release.to_string(),
      message: message.into(),
    }
  }

  /// Release the failed operation targeted.
  pub fn release(&self) -> &str {
    match self {
      ChartError::Failed { release, .. }
      | ChartError::TimedOut { release, .. }
      | ChartError::Cancelled { release, .. } => release,
    }
  }

  pub fn operation(&self) -> ChartOperation {
    match self {
      ChartError::Failed { operation, .. }
      | ChartError::TimedOut { operation, .. }
      | ChartError::Cancelled { operation, .. } => *operation,
    }
  }
}

/// Per-release chart operations against a cluster.
#[async_trait]
pub trait ChartClient: Send + Sync {
  /// Install `chart` at `version` as release `release`.
  async fn install(
    &self,
    target: &ReleaseTarget,
    release: &str,
    chart: &str,
    version: &str,
    values: &ValueMap,
    dry_run: bool,
  ) -> Result<ReleaseInfo, ChartError>;

  /// Upgrade an existing release with new values. The chart version is left to the backend.
  async fn update(
    &self,
    target: &ReleaseTarget,
    release: &str,
    chart: &str,
    values: &ValueMap,
    dry_run: bool,
  ) -> Result<ReleaseInfo, ChartError>;

  /// Remove a release.
  async fn uninstall(&self, target: &ReleaseTarget, release: &str, dry_run: bool) -> Result<(), ChartError>;
}
