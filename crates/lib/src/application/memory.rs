//! In-memory application repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::repository::{ApplicationRepository, RepositoryError};
use super::types::{Application, ApplicationId, NewApplication, OrganizationId};

/// Keeps records in a map for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryApplicationStore {
  records: RwLock<Records>,
}

#[derive(Debug, Default)]
struct Records {
  by_id: BTreeMap<ApplicationId, Application>,
  /// Highest id ever assigned.
  last_id: u64,
}

impl MemoryApplicationStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn is_empty(&self) -> bool {
    self.records.read().await.by_id.is_empty()
  }
}

#[async_trait]
impl ApplicationRepository for MemoryApplicationStore {
  async fn create(&self, application: NewApplication) -> Result<Application, RepositoryError> {
    let mut records = self.records.write().await;
    records.last_id += 1;
    let record = application.with_id(ApplicationId(records.last_id));
    records.by_id.insert(record.id, record.clone());
    Ok(record)
  }

  async fn save(&self, application: &Application) -> Result<(), RepositoryError> {
    let mut records = self.records.write().await;
    match records.by_id.get_mut(&application.id) {
      Some(existing) => {
        *existing = application.clone();
        Ok(())
      }
      None => Err(RepositoryError::NotFound(application.id)),
    }
  }

  async fn get(&self, id: ApplicationId, organization_id: OrganizationId) -> Result<Application, RepositoryError> {
    let records = self.records.read().await;
    records
      .by_id
      .get(&id)
      .filter(|app| app.organization_id == organization_id)
      .cloned()
      .ok_or(RepositoryError::NotFound(id))
  }

  async fn list(&self, organization_id: OrganizationId) -> Result<Vec<Application>, RepositoryError> {
    let records = self.records.read().await;
    Ok(
      records
        .by_id
        .values()
        .filter(|app| app.organization_id == organization_id)
        .cloned()
        .collect(),
    )
  }

  async fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
    self.records.write().await.by_id.remove(&id);
    Ok(())
  }
}
