//! Application lifecycle orchestration.
//!
//! The [`LifecycleManager`] drives an application through its four
//! operations. Each renders the template revision into a manifest, works out
//! which releases to touch, performs the chart calls, and persists the
//! application record.
//!
//! | Operation | Chart calls | Failure handling |
//! |-----------|-------------|------------------|
//! | [`install`](LifecycleManager::install) | install every chart | roll back all installs on first failure |
//! | [`upgrade`](LifecycleManager::upgrade) | install / update / uninstall per diff | roll back new installs; absorb update and uninstall failures |
//! | [`update_inputs`](LifecycleManager::update_inputs) | update every release | absorb update failures |
//! | [`terminate`](LifecycleManager::terminate) | uninstall every release | absorb uninstall failures |
//!
//! Calls against one application are serialized by a per-application lock.
//!
//! # Submodules
//!
//! - [`journal`] - install journal and reverse-order rollback
//! - [`lock`] - per-application mutual exclusion
//! - [`types`] - configuration, errors, and outcomes

mod install;
pub mod journal;
pub mod lock;
mod terminate;
pub mod types;
mod update_inputs;
mod upgrade;

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::application::{Application, ApplicationId, ApplicationRepository, OrganizationId};
use crate::chart::{ChartClient, ChartError, ChartOperation, ReleaseInfo, ReleaseTarget};
use crate::manifest::{ChartDecl, ManifestSchema};
use crate::template::{TemplateError, TemplateResolver};

pub use lock::{ApplicationLock, ApplicationLocks};
pub use types::*;

/// Orchestrates application lifecycle operations.
///
/// Cheap to share: every collaborator is held behind an `Arc`.
pub struct LifecycleManager {
  resolver: Arc<dyn TemplateResolver>,
  charts: Arc<dyn ChartClient>,
  repository: Arc<dyn ApplicationRepository>,
  locks: ApplicationLocks,
  config: LifecycleConfig,
}

impl LifecycleManager {
  pub fn new(
    resolver: Arc<dyn TemplateResolver>,
    charts: Arc<dyn ChartClient>,
    repository: Arc<dyn ApplicationRepository>,
  ) -> Self {
    Self::with_config(resolver, charts, repository, LifecycleConfig::default())
  }

  pub fn with_config(
    resolver: Arc<dyn TemplateResolver>,
    charts: Arc<dyn ChartClient>,
    repository: Arc<dyn ApplicationRepository>,
    config: LifecycleConfig,
  ) -> Self {
    Self {
      resolver,
      charts,
      repository,
      locks: ApplicationLocks::new(),
      config,
    }
  }

  pub fn locks(&self) -> &ApplicationLocks {
    &self.locks
  }

  /// Fetch one application of an organization.
  pub async fn get_application(
    &self,
    id: ApplicationId,
    organization_id: OrganizationId,
  ) -> Result<Application, LifecycleError> {
    Ok(self.repository.get(id, organization_id).await?)
  }

  /// List the applications of an organization, ordered by id.
  pub async fn list_applications(&self, organization_id: OrganizationId) -> Result<Vec<Application>, LifecycleError> {
    Ok(self.repository.list(organization_id).await?)
  }

  /// Lock `application` and re-read its record so the call works on the
  /// latest persisted state.
  async fn lock_and_reload(&self, application: &Application) -> Result<(ApplicationLock, Application), LifecycleError> {
    let lock = self.locks.acquire(application.id, self.config.lock_timeout).await?;
    let current = self
      .repository
      .get(application.id, application.organization_id)
      .await?;
    Ok((lock, current))
  }

  fn parse_stored_manifest(&self, application: &Application) -> Result<ManifestSchema, TemplateError> {
    self.resolver.parse(&application.manifest)
  }

  async fn install_release(
    &self,
    target: &ReleaseTarget,
    chart: &ChartDecl,
    version: &str,
    dry_run: bool,
  ) -> Result<ReleaseInfo, ChartError> {
    debug!(release = %chart.name, chart = %chart.chart, version, dry_run, "installing release");
    self
      .bounded(
        ChartOperation::Install,
        &chart.name,
        self
          .charts
          .install(target, &chart.name, &chart.chart, version, &chart.values, dry_run),
      )
      .await
  }

  async fn update_release(
    &self,
    target: &ReleaseTarget,
    chart: &ChartDecl,
    dry_run: bool,
  ) -> Result<ReleaseInfo, ChartError> {
    debug!(release = %chart.name, chart = %chart.chart, dry_run, "updating release");
    self
      .bounded(
        ChartOperation::Update,
        &chart.name,
        self
          .charts
          .update(target, &chart.name, &chart.chart, &chart.values, dry_run),
      )
      .await
  }

  pub(crate) async fn uninstall_release(
    &self,
    target: &ReleaseTarget,
    release: &str,
    dry_run: bool,
  ) -> Result<(), ChartError> {
    debug!(release, dry_run, "uninstalling release");
    self
      .bounded(
        ChartOperation::Uninstall,
        release,
        self.charts.uninstall(target, release, dry_run),
      )
      .await
  }

  /// Apply the configured chart deadline to one chart call.
  async fn bounded<T, F>(&self, operation: ChartOperation, release: &str, call: F) -> Result<T, ChartError>
  where
    F: Future<Output = Result<T, ChartError>>,
  {
    match self.config.chart_timeout {
      Some(limit) => match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(ChartError::TimedOut {
          operation,
          release: release.to_string(),
        }),
      },
      None => call.await,
    }
  }
}

/// Target for the releases of an existing application.
fn release_target(application: &Application) -> ReleaseTarget {
  ReleaseTarget {
    organization_id: application.organization_id,
    context_name: application.context_name.clone(),
    namespace: application.namespace.clone(),
  }
}

/// The version of a chart that is about to be installed.
fn install_version(chart: &ChartDecl) -> Result<&str, TemplateError> {
  chart
    .version
    .as_deref()
    .ok_or_else(|| TemplateError::MissingVersion {
      release: chart.name.clone(),
    })
}
