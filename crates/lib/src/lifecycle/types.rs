//! Types for lifecycle operations.
//!
//! This module defines the configuration, error type, and per-operation
//! outcomes returned by the [`LifecycleManager`](super::LifecycleManager).

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;

use crate::application::{Application, ApplicationId, RepositoryError, TemplateId};
use crate::chart::{ChartError, ChartOperation, ReleaseInfo};
use crate::diff::DiffSet;
use crate::template::TemplateError;

/// Tunables for the lifecycle manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleConfig {
  /// Deadline for each chart call. Expiry is reported as
  /// [`ChartError::TimedOut`] and handled like any other chart failure.
  pub chart_timeout: Option<Duration>,

  /// Bound on waiting for the per-application lock. `None` waits forever.
  pub lock_timeout: Option<Duration>,
}

/// Cluster placement for a new application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
  pub context_name: String,
  pub namespace: String,
}

/// A chart failure that was logged and absorbed instead of aborting the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
  pub release: String,
  pub operation: ChartOperation,
  pub message: String,
}

impl From<&ChartError> for ReleaseFailure {
  fn from(err: &ChartError) -> Self {
    Self {
      release: err.release().to_string(),
      operation: err.operation(),
      message: err.to_string(),
    }
  }
}

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
  /// Input validation, rendering, or manifest parsing failed.
  #[error(transparent)]
  Template(#[from] TemplateError),

  /// The new input set does not match the current one.
  #[error("invalid user inputs: {0}")]
  InvalidInputs(String),

  /// One or more immutable inputs were changed.
  #[error("inputs are immutable and cannot be changed: {}", .0.join(", "))]
  ImmutableInputs(Vec<String>),

  /// Re-rendering dropped releases that the application still has deployed.
  #[error(
    "releases {} are missing from the manifest rendered with the new inputs",
    .0.join(", ")
  )]
  ReleasesDropped(Vec<String>),

  /// The template revision passed in is not the one the application uses.
  #[error("application {application} uses template {expected}, got template {actual}")]
  TemplateMismatch {
    application: ApplicationId,
    expected: TemplateId,
    actual: TemplateId,
  },

  /// A chart operation failed fatally.
  #[error(transparent)]
  Chart(#[from] ChartError),

  /// Reading or writing the application record failed.
  #[error(transparent)]
  Repository(#[from] RepositoryError),

  /// Another lifecycle call holds the application's lock.
  #[error("application {0} is busy with another lifecycle operation")]
  Busy(ApplicationId),
}

impl LifecycleError {
  /// Whether the caller can fix the error by changing the request.
  ///
  /// Manifest-level problems (unparseable output, duplicate names, missing
  /// chart versions) are faults of the template, not of the caller.
  pub fn is_client_error(&self) -> bool {
    match self {
      LifecycleError::Template(err) => matches!(err, TemplateError::InvalidInputs(_) | TemplateError::Render(_)),
      LifecycleError::InvalidInputs(_)
      | LifecycleError::ImmutableInputs(_)
      | LifecycleError::ReleasesDropped(_)
      | LifecycleError::TemplateMismatch { .. }
      | LifecycleError::Busy(_) => true,
      LifecycleError::Repository(err) => matches!(err, RepositoryError::NotFound(_)),
      LifecycleError::Chart(_) => false,
    }
  }
}

/// Result of an install.
#[derive(Debug, Clone)]
pub struct InstallOutcome {
  /// The created record. `None` on dry run.
  pub application: Option<Application>,

  /// Install result per release name.
  pub results: BTreeMap<String, ReleaseInfo>,
}

/// Result of an upgrade.
#[derive(Debug, Clone)]
pub struct UpgradeOutcome {
  /// Diff between the old and new manifests.
  pub diff: DiffSet,

  /// Releases installed by this upgrade.
  pub installed: BTreeMap<String, ReleaseInfo>,

  /// Releases updated. Releases whose update failed are absent.
  pub updated: BTreeMap<String, ReleaseInfo>,

  /// Releases uninstalled.
  pub uninstalled: Vec<String>,

  /// Update and uninstall failures that were absorbed.
  pub failures: Vec<ReleaseFailure>,

  /// The record after the upgrade (unchanged on dry run).
  pub application: Application,
}

/// Result of an input update.
#[derive(Debug, Clone)]
pub struct UpdateInputsOutcome {
  /// Update result per release name. Releases whose update failed are absent.
  pub updated: BTreeMap<String, ReleaseInfo>,

  /// Update failures that were absorbed.
  pub failures: Vec<ReleaseFailure>,

  /// The record after the update (unchanged on dry run).
  pub application: Application,
}

/// Result of a termination.
#[derive(Debug, Clone, Default)]
pub struct TerminateOutcome {
  /// Releases uninstalled.
  pub uninstalled: Vec<String>,

  /// Uninstall failures that were absorbed.
  pub failures: Vec<ReleaseFailure>,
}
