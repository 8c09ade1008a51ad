//! File-backed application repository.
//!
//! # Storage Layout
//!
//! ```text
//! {store_dir}/
//! ├── last_id            # Highest id ever assigned
//! ├── 1.json
//! ├── 2.json
//! └── <id>.json          # One Application record per file
//! ```
//!
//! Writes go to a temporary file that is then renamed over the target, so a
//! crash never leaves a half-written record behind.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::repository::{ApplicationRepository, RepositoryError};
use super::types::{Application, ApplicationId, NewApplication, OrganizationId};

const LAST_ID_FILE: &str = "last_id";

/// Stores each application record as a JSON file.
#[derive(Debug)]
pub struct FileApplicationStore {
  base_path: PathBuf,
  /// Serializes id allocation in `create`.
  create_lock: Mutex<()>,
}

impl FileApplicationStore {
  /// Create a store rooted at `base_path`.
  pub fn new(base_path: PathBuf) -> Self {
    Self {
      base_path,
      create_lock: Mutex::new(()),
    }
  }

  fn record_path(&self, id: ApplicationId) -> PathBuf {
    self.base_path.join(format!("{}.json", id.0))
  }

  async fn ensure_dir(&self) -> Result<(), RepositoryError> {
    fs::create_dir_all(&self.base_path)
      .await
      .map_err(RepositoryError::CreateDir)
  }

  async fn write_record(&self, application: &Application) -> Result<(), RepositoryError> {
    self.ensure_dir().await?;

    let path = self.record_path(application.id);
    let temp_path = self.base_path.join(format!("{}.json.tmp", application.id.0));

    let content = serde_json::to_string_pretty(application).map_err(RepositoryError::Serialize)?;
    fs::write(&temp_path, &content).await.map_err(RepositoryError::Write)?;
    fs::rename(&temp_path, &path).await.map_err(RepositoryError::Write)?;

    debug!(application = %application.id, path = %path.display(), "application record written");
    Ok(())
  }

  async fn read_record(&self, id: ApplicationId) -> Result<Application, RepositoryError> {
    let content = fs::read_to_string(self.record_path(id)).await.map_err(|e| {
      if e.kind() == io::ErrorKind::NotFound {
        RepositoryError::NotFound(id)
      } else {
        RepositoryError::Read(e)
      }
    })?;
    serde_json::from_str(&content).map_err(RepositoryError::Parse)
  }

  /// Highest id ever assigned, or 0 for a fresh store.
  async fn read_last_id(&self) -> Result<u64, RepositoryError> {
    match fs::read_to_string(self.base_path.join(LAST_ID_FILE)).await {
      Ok(content) => serde_json::from_str(content.trim()).map_err(RepositoryError::Parse),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
      Err(e) => Err(RepositoryError::Read(e)),
    }
  }

  async fn write_last_id(&self, id: ApplicationId) -> Result<(), RepositoryError> {
    self.ensure_dir().await?;
    let path = self.base_path.join(LAST_ID_FILE);
    let temp_path = self.base_path.join(format!("{}.tmp", LAST_ID_FILE));
    fs::write(&temp_path, id.0.to_string()).await.map_err(RepositoryError::Write)?;
    fs::rename(&temp_path, &path).await.map_err(RepositoryError::Write)
  }

  /// Ids of all stored records, ascending.
  async fn record_ids(&self) -> Result<Vec<ApplicationId>, RepositoryError> {
    let mut entries = match fs::read_dir(&self.base_path).await {
      Ok(entries) => entries,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
      Err(e) => return Err(RepositoryError::Read(e)),
    };

    let mut ids = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(RepositoryError::Read)? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }
      if let Some(id) = path
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse::<u64>().ok())
      {
        ids.push(ApplicationId(id));
      }
    }
    ids.sort();
    Ok(ids)
  }
}

#[async_trait]
impl ApplicationRepository for FileApplicationStore {
  async fn create(&self, application: NewApplication) -> Result<Application, RepositoryError> {
    let _guard = self.create_lock.lock().await;
    let highest_record = self.record_ids().await?.last().map(|id| id.0).unwrap_or(0);
    let next = ApplicationId(self.read_last_id().await?.max(highest_record) + 1);
    // Claim the id before writing the record so a crash skips it instead of reusing it.
    self.write_last_id(next).await?;
    let record = application.with_id(next);
    self.write_record(&record).await?;
    Ok(record)
  }

  async fn save(&self, application: &Application) -> Result<(), RepositoryError> {
    if !fs::try_exists(self.record_path(application.id))
      .await
      .map_err(RepositoryError::Read)?
    {
      return Err(RepositoryError::NotFound(application.id));
    }
    self.write_record(application).await
  }

  async fn get(&self, id: ApplicationId, organization_id: OrganizationId) -> Result<Application, RepositoryError> {
    let record = self.read_record(id).await?;
    if record.organization_id != organization_id {
      return Err(RepositoryError::NotFound(id));
    }
    Ok(record)
  }

  async fn list(&self, organization_id: OrganizationId) -> Result<Vec<Application>, RepositoryError> {
    let mut records = Vec::new();
    for id in self.record_ids().await? {
      let record = self.read_record(id).await?;
      if record.organization_id == organization_id {
        records.push(record);
      }
    }
    Ok(records)
  }

  async fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
    match fs::remove_file(self.record_path(id)).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(RepositoryError::Write(e)),
    }
  }
}
