//! Test utilities for chartdeck-lib.
//!
//! [`RecordingChartClient`] stands in for a real chart backend. It records
//! every call and can be told to fail or hang on specific releases.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::{Actor, MemoryApplicationStore, OrganizationId, TemplateId, TemplateRevision};
use crate::chart::{ChartClient, ChartError, ChartOperation, ReleaseInfo, ReleaseStatus, ReleaseTarget};
use crate::lifecycle::{LifecycleConfig, LifecycleManager, Placement};
use crate::manifest::InputDecl;
use crate::template::HandlebarsResolver;
use crate::value::{InputMap, Value, ValueMap};

/// One recorded chart call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartCall {
  pub operation: ChartOperation,
  pub release: String,
  pub dry_run: bool,
}

/// Chart client that records calls and fails on demand.
#[derive(Debug, Default)]
pub struct RecordingChartClient {
  calls: Mutex<Vec<ChartCall>>,
  failing: Mutex<Vec<(ChartOperation, String)>>,
  hanging: Mutex<Vec<(ChartOperation, String)>>,
  revisions: Mutex<BTreeMap<String, u32>>,
  values: Mutex<BTreeMap<String, ValueMap>>,
}

impl RecordingChartClient {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make `operation` on `release` fail.
  pub fn fail(&self, operation: ChartOperation, release: &str) {
    self.failing.lock().unwrap().push((operation, release.to_string()));
  }

  /// Make `operation` on `release` never complete.
  pub fn hang(&self, operation: ChartOperation, release: &str) {
    self.hanging.lock().unwrap().push((operation, release.to_string()));
  }

  pub fn calls(&self) -> Vec<ChartCall> {
    self.calls.lock().unwrap().clone()
  }

  /// Releases targeted by `operation`, in call order.
  pub fn releases(&self, operation: ChartOperation) -> Vec<String> {
    self
      .calls()
      .into_iter()
      .filter(|call| call.operation == operation)
      .map(|call| call.release)
      .collect()
  }

  /// Values passed with the latest install or update of `release`.
  pub fn last_values(&self, release: &str) -> Option<ValueMap> {
    self.values.lock().unwrap().get(release).cloned()
  }

  pub fn clear(&self) {
    self.calls.lock().unwrap().clear();
  }

  async fn record(&self, operation: ChartOperation, release: &str, dry_run: bool) -> Result<(), ChartError> {
    self.calls.lock().unwrap().push(ChartCall {
      operation,
      release: release.to_string(),
      dry_run,
    });

    let key = (operation, release.to_string());
    if self.hanging.lock().unwrap().contains(&key) {
      std::future::pending::<()>().await;
    }
    if self.failing.lock().unwrap().contains(&key) {
      return Err(ChartError::failed(operation, release, "scripted failure"));
    }
    Ok(())
  }

  fn info(&self, target: &ReleaseTarget, release: &str, chart: &str, values: &ValueMap) -> ReleaseInfo {
    let mut revisions = self.revisions.lock().unwrap();
    let revision = revisions.entry(release.to_string()).or_insert(0);
    *revision += 1;
    self.values.lock().unwrap().insert(release.to_string(), values.clone());

    ReleaseInfo {
      name: release.to_string(),
      namespace: target.namespace.clone(),
      chart: chart.to_string(),
      revision: *revision,
      status: ReleaseStatus::Deployed,
      app_version: None,
    }
  }
}

#[async_trait]
impl ChartClient for RecordingChartClient {
  async fn install(
    &self,
    target: &ReleaseTarget,
    release: &str,
    chart: &str,
    _version: &str,
    values: &ValueMap,
    dry_run: bool,
  ) -> Result<ReleaseInfo, ChartError> {
    self.record(ChartOperation::Install, release, dry_run).await?;
    Ok(self.info(target, release, chart, values))
  }

  async fn update(
    &self,
    target: &ReleaseTarget,
    release: &str,
    chart: &str,
    values: &ValueMap,
    dry_run: bool,
  ) -> Result<ReleaseInfo, ChartError> {
    self.record(ChartOperation::Update, release, dry_run).await?;
    Ok(self.info(target, release, chart, values))
  }

  async fn uninstall(&self, _target: &ReleaseTarget, release: &str, dry_run: bool) -> Result<(), ChartError> {
    self.record(ChartOperation::Uninstall, release, dry_run).await
  }
}

/// Two-chart template with an immutable `region` and a defaulted `replicas`.
pub const STOREFRONT_TEMPLATE: &str = r#"name: storefront
description: Web shop
inputs:
  - name: region
    immutable: true
  - name: replicas
    default: 2
charts:
  - name: frontend
    chart: bitnami/nginx
    version: 15.4.0
    values:
      replicaCount: {{inputs.replicas}}
      region: {{inputs.region}}
  - name: backend
    chart: acme/api
    version: 1.2.0
    values:
      region: {{inputs.region}}
"#;

/// Same inputs as [`STOREFRONT_TEMPLATE`]; `frontend` is replaced by `web`
/// and a `cache` release is added.
pub const STOREFRONT_V2_TEMPLATE: &str = r#"name: storefront
description: Web shop
inputs:
  - name: region
    immutable: true
  - name: replicas
    default: 3
charts:
  - name: backend
    chart: acme/api
    version: 1.3.0
    values:
      region: {{inputs.region}}
  - name: cache
    chart: bitnami/redis
    version: 18.0.0
  - name: web
    chart: bitnami/nginx
    version: 15.5.0
    values:
      replicaCount: {{inputs.replicas}}
"#;

pub fn storefront_inputs() -> Vec<InputDecl> {
  vec![
    InputDecl {
      name: "region".to_string(),
      default: None,
      immutable: true,
      description: None,
    },
    InputDecl {
      name: "replicas".to_string(),
      default: Some(Value::Integer(2)),
      immutable: false,
      description: None,
    },
  ]
}

pub fn revision(id: u64, template: &str) -> TemplateRevision {
  TemplateRevision {
    id: TemplateId(id),
    organization_id: OrganizationId(1),
    creator_id: "alice".to_string(),
    inputs: storefront_inputs(),
    template: template.to_string(),
  }
}

pub fn actor() -> Actor {
  Actor {
    user_id: "alice".to_string(),
    organization_id: OrganizationId(1),
  }
}

pub fn placement() -> Placement {
  Placement {
    context_name: "kind-dev".to_string(),
    namespace: "shop".to_string(),
  }
}

pub fn inputs(pairs: &[(&str, Value)]) -> InputMap {
  pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

/// Manager wired to a recording client and an in-memory store.
pub fn manager(config: LifecycleConfig) -> (LifecycleManager, Arc<RecordingChartClient>, Arc<MemoryApplicationStore>) {
  let charts = Arc::new(RecordingChartClient::new());
  let store = Arc::new(MemoryApplicationStore::new());
  let manager = LifecycleManager::with_config(
    Arc::new(HandlebarsResolver::new()),
    charts.clone(),
    store.clone(),
    config,
  );
  (manager, charts, store)
}
