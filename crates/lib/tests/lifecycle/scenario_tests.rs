//! Failure and convergence scenarios across whole lifecycle calls.

use chartdeck_lib::application::{ApplicationRepository, OrganizationId};
use chartdeck_lib::chart::ChartOperation;
use chartdeck_lib::lifecycle::LifecycleError;
use chartdeck_lib::value::{InputMap, Value};

use super::common::*;

const REGIONAL_TEMPLATE: &str = r#"name: regional
inputs:
  - name: region
    immutable: true
  - name: replicas
    default: 2
charts:
  - name: api
    chart: acme/api
    version: 2.0.0
    values:
      region: {{inputs.region}}
      replicas: {{inputs.replicas}}
"#;

#[tokio::test]
async fn failed_install_rolls_back_and_persists_nothing() {
  let h = Harness::on_disk();
  h.charts.fail(ChartOperation::Install, "backend");
  let rev = revision(1, vec![], &charts_template("shop", &["frontend", "backend"]));

  let err = h
    .manager
    .install(&actor(), &rev, placement(), InputMap::new(), false)
    .await
    .unwrap_err();

  assert!(matches!(&err, LifecycleError::Chart(e) if e.release() == "backend"));
  assert_eq!(h.charts.releases(ChartOperation::Uninstall), vec!["frontend"]);
  assert!(h.store.list(actor().organization_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn upgrade_swaps_one_release() {
  let h = Harness::on_disk();
  let app = h
    .manager
    .install(
      &actor(),
      &revision(1, vec![], &charts_template("shop", &["a", "b"])),
      placement(),
      InputMap::new(),
      false,
    )
    .await
    .unwrap()
    .application
    .unwrap();
  h.charts.reset();

  let next = revision(2, vec![], &charts_template("shop", &["b", "c"]));
  let outcome = h.manager.upgrade(&app, &next, false).await.unwrap();

  assert_eq!(outcome.diff.to_install, vec!["c"]);
  assert_eq!(outcome.diff.to_update, vec!["b"]);
  assert_eq!(outcome.diff.to_remove, vec!["a"]);
  assert_eq!(
    h.charts.calls(),
    vec![
      (ChartOperation::Install, "c".to_string(), false),
      (ChartOperation::Update, "b".to_string(), false),
      (ChartOperation::Uninstall, "a".to_string(), false),
    ]
  );

  let stored = h.manager.get_application(app.id, app.organization_id).await.unwrap();
  assert_eq!(stored.manifest, charts_template("shop", &["b", "c"]));
  assert_eq!(stored.template_id, next.id);
}

#[tokio::test]
async fn changing_immutable_region_is_refused() {
  let h = Harness::in_memory();
  let rev = revision(
    1,
    vec![input("region", None, true), input("replicas", Some(Value::Integer(2)), false)],
    REGIONAL_TEMPLATE,
  );
  let app = h
    .manager
    .install(&actor(), &rev, placement(), values(&[("region", Value::from("us-east"))]), false)
    .await
    .unwrap()
    .application
    .unwrap();
  h.charts.reset();

  let err = h
    .manager
    .update_inputs(
      &app,
      &rev,
      values(&[("region", Value::from("us-west")), ("replicas", Value::Integer(3))]),
      false,
    )
    .await
    .unwrap_err();

  assert!(matches!(err, LifecycleError::ImmutableInputs(ref names) if names == &["region"]));
  assert!(err.to_string().contains("region"));
  assert!(h.charts.releases(ChartOperation::Update).is_empty());
}

#[tokio::test]
async fn terminate_attempts_every_uninstall() {
  let h = Harness::on_disk();
  let app = h
    .manager
    .install(
      &actor(),
      &revision(1, vec![], &charts_template("trio", &["one", "two", "three"])),
      placement(),
      InputMap::new(),
      false,
    )
    .await
    .unwrap()
    .application
    .unwrap();
  h.charts.reset();
  h.charts.fail(ChartOperation::Uninstall, "two");

  let outcome = h.manager.terminate(&app).await.unwrap();

  assert_eq!(h.charts.releases(ChartOperation::Uninstall), vec!["one", "two", "three"]);
  assert_eq!(outcome.uninstalled, vec!["one", "three"]);
  assert_eq!(outcome.failures[0].release, "two");
  assert!(h.manager.list_applications(app.organization_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn applications_are_scoped_to_their_organization() {
  let h = Harness::in_memory();
  let app = h
    .manager
    .install(
      &actor(),
      &revision(1, vec![], &charts_template("solo", &["only"])),
      placement(),
      InputMap::new(),
      false,
    )
    .await
    .unwrap()
    .application
    .unwrap();

  let other = OrganizationId(99);
  assert!(h.manager.list_applications(other).await.unwrap().is_empty());

  let err = h.manager.get_application(app.id, other).await.unwrap_err();
  assert!(err.is_client_error());
}

#[tokio::test]
async fn inputs_follow_the_revision_through_upgrade_and_update() {
  let h = Harness::on_disk();
  let template = charts_template("shop", &["web"]);
  let v1 = revision(1, vec![input("replicas", Some(Value::Integer(1)), false)], &template);
  let app = h
    .manager
    .install(&actor(), &v1, placement(), InputMap::new(), false)
    .await
    .unwrap()
    .application
    .unwrap();

  // Unchanged inputs on a revision whose text declares no inputs.
  h.manager
    .update_inputs(&app, &v1, app.user_inputs.clone(), false)
    .await
    .unwrap();

  let v2 = revision(
    2,
    vec![
      input("replicas", Some(Value::Integer(1)), false),
      input("tier", Some(Value::from("basic")), false),
    ],
    &template,
  );
  let upgraded = h.manager.upgrade(&app, &v2, false).await.unwrap().application;
  h.charts.reset();

  h.manager
    .update_inputs(&upgraded, &v2, upgraded.user_inputs.clone(), false)
    .await
    .unwrap();
  let outcome = h
    .manager
    .update_inputs(
      &upgraded,
      &v2,
      values(&[("replicas", Value::Integer(4)), ("tier", Value::from("gold"))]),
      false,
    )
    .await
    .unwrap();

  assert!(outcome.failures.is_empty());
  assert_eq!(h.charts.releases(ChartOperation::Update), vec!["web", "web"]);
  let stored = h.store.get(app.id, app.organization_id).await.unwrap();
  assert_eq!(stored.user_inputs["tier"], Value::from("gold"));
}

#[tokio::test]
async fn upgrade_installs_new_releases_in_manifest_order() {
  let h = Harness::in_memory();
  let app = h
    .manager
    .install(
      &actor(),
      &revision(1, vec![], &charts_template("stack", &["base"])),
      placement(),
      InputMap::new(),
      false,
    )
    .await
    .unwrap()
    .application
    .unwrap();
  h.charts.reset();

  let next = revision(2, vec![], &charts_template("stack", &["base", "zeta", "alpha"]));
  h.manager.upgrade(&app, &next, false).await.unwrap();

  assert_eq!(h.charts.releases(ChartOperation::Install), vec!["zeta", "alpha"]);
}

#[tokio::test]
async fn stale_handle_cannot_reach_a_later_application() {
  for h in [Harness::in_memory(), Harness::on_disk()] {
    let install = |name: &'static str| {
      let rev = revision(1, vec![], &charts_template(name, &["web"]));
      let manager = &h.manager;
      async move {
        manager
          .install(&actor(), &rev, placement(), InputMap::new(), false)
          .await
          .unwrap()
          .application
          .unwrap()
      }
    };

    let first = install("first").await;
    h.manager.terminate(&first).await.unwrap();
    let second = install("second").await;
    assert_ne!(second.id, first.id);
    h.charts.reset();

    let err = h.manager.terminate(&first).await.unwrap_err();
    assert!(err.is_client_error());
    assert!(h.charts.calls().is_empty());
    assert_eq!(h.store.get(second.id, second.organization_id).await.unwrap(), second);
  }
}
