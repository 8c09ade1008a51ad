//! Application repository interface.

use std::io;

use async_trait::async_trait;
use thiserror::Error;

use super::types::{Application, ApplicationId, NewApplication, OrganizationId};

/// Errors that can occur when reading or writing application records.
#[derive(Debug, Error)]
pub enum RepositoryError {
  /// No record with this id exists for the organization.
  #[error("application {0} not found")]
  NotFound(ApplicationId),

  #[error("failed to read application record: {0}")]
  Read(#[source] io::Error),

  #[error("failed to write application record: {0}")]
  Write(#[source] io::Error),

  #[error("failed to create store directory: {0}")]
  CreateDir(#[source] io::Error),

  #[error("failed to parse application record: {0}")]
  Parse(#[source] serde_json::Error),

  #[error("failed to serialize application record: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Persistent storage of application records, scoped by organization.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
  /// Store a new record and return it with its assigned id.
  ///
  /// Ids increase and are never reused, even after the newest record is
  /// deleted.
  async fn create(&self, application: NewApplication) -> Result<Application, RepositoryError>;

  /// Overwrite an existing record.
  async fn save(&self, application: &Application) -> Result<(), RepositoryError>;

  /// Fetch a record owned by `organization_id`.
  async fn get(&self, id: ApplicationId, organization_id: OrganizationId) -> Result<Application, RepositoryError>;

  /// All records owned by `organization_id`, ordered by id.
  async fn list(&self, organization_id: OrganizationId) -> Result<Vec<Application>, RepositoryError>;

  /// Remove a record. Removing a missing record is not an error.
  async fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError>;
}
