//! Settings for chartdeck.
//!
//! Settings are read from a TOML file, by default
//! `<config_dir>/config.toml`. Every key is optional.
//!
//! ```toml
//! [store]
//! path = "/var/lib/chartdeck/applications"
//!
//! [lifecycle]
//! chart_timeout_secs = 600
//! lock_timeout_secs = 30
//!
//! [log]
//! filter = "chartdeck=debug,info"
//! ```
//!
//! `CHARTDECK_STORE` overrides `store.path`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{CONFIG_FILENAME, STORE_ENV};
use crate::lifecycle::LifecycleConfig;
use crate::platform::paths::{config_dir, store_dir};

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: toml::de::Error,
  },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
  /// Directory holding application records.
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSettings {
  /// Deadline for a single chart operation.
  pub chart_timeout_secs: Option<u64>,
  /// How long a lifecycle call waits for another call on the same application.
  pub lock_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
  /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
  pub filter: String,
}

impl Default for LogSettings {
  fn default() -> Self {
    Self {
      filter: "info".to_string(),
    }
  }
}

/// All settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub store: StoreSettings,
  pub lifecycle: LifecycleSettings,
  pub log: LogSettings,
}

impl Settings {
  /// Default config file location.
  pub fn default_path() -> PathBuf {
    config_dir().join(CONFIG_FILENAME)
  }

  /// Load settings.
  ///
  /// An explicit `path` must exist. Without one, the default location is
  /// tried and a missing file yields default settings.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    let (path, required) = match path {
      Some(p) => (p.to_path_buf(), true),
      None => (Self::default_path(), false),
    };

    let content = match fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound && !required => return Ok(Self::default()),
      Err(source) => return Err(ConfigError::Read { path, source }),
    };

    toml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
  }

  /// Effective store directory.
  ///
  /// `CHARTDECK_STORE` wins over the config file, which wins over the
  /// platform default.
  pub fn store_path(&self) -> PathBuf {
    if std::env::var_os(STORE_ENV).is_some() {
      return store_dir();
    }
    self.store.path.clone().unwrap_or_else(store_dir)
  }

  pub fn lifecycle_config(&self) -> LifecycleConfig {
    LifecycleConfig {
      chart_timeout: self.lifecycle.chart_timeout_secs.map(Duration::from_secs),
      lock_timeout: self.lifecycle.lock_timeout_secs.map(Duration::from_secs),
    }
  }
}
