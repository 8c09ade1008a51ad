//! Behavioural guarantees checked over several inputs.

use std::collections::{BTreeMap, BTreeSet};

use chartdeck_lib::application::ApplicationRepository;
use chartdeck_lib::chart::ChartOperation;
use chartdeck_lib::diff::compute_diff;
use chartdeck_lib::manifest::ManifestSchema;
use chartdeck_lib::value::{InputMap, Value};

use super::common::*;

#[test]
fn diff_partitions_release_names() {
  let names = ["a", "b", "c", "d", "e"];
  // Every pair of subsets of a five-name universe.
  for old_mask in 0u32..32 {
    for new_mask in 0u32..32 {
      let pick = |mask: u32| -> Vec<&str> {
        names
          .iter()
          .enumerate()
          .filter(|(i, _)| mask & (1 << i) != 0)
          .map(|(_, n)| *n)
          .collect()
      };
      let old = ManifestSchema::from_yaml(&charts_template("x", &pick(old_mask))).unwrap();
      let new = ManifestSchema::from_yaml(&charts_template("x", &pick(new_mask))).unwrap();
      let diff = compute_diff(&old.chart_mapping, &new.chart_mapping);

      let a: BTreeSet<String> = old.chart_mapping.keys().cloned().collect();
      let b: BTreeSet<String> = new.chart_mapping.keys().cloned().collect();

      assert_eq!(diff.to_install, b.difference(&a).cloned().collect::<Vec<_>>());
      assert_eq!(diff.to_remove, a.difference(&b).cloned().collect::<Vec<_>>());
      assert_eq!(diff.to_update, a.intersection(&b).cloned().collect::<Vec<_>>());
      assert_eq!(diff.total_releases(), a.union(&b).count());
    }
  }
}

#[tokio::test]
async fn rollback_uninstalls_exactly_the_earlier_charts_in_reverse() {
  let names = ["r1", "r2", "r3", "r4"];
  for k in 1..=names.len() {
    let h = Harness::in_memory();
    h.charts.fail(ChartOperation::Install, names[k - 1]);
    let rev = revision(1, vec![], &charts_template("app", &names));

    let err = h
      .manager
      .install(&actor(), &rev, placement(), InputMap::new(), false)
      .await
      .unwrap_err();

    let expected: Vec<String> = names[..k - 1].iter().rev().map(|s| s.to_string()).collect();
    assert_eq!(h.charts.releases(ChartOperation::Uninstall), expected, "failure at chart {k}");
    assert!(err.to_string().contains(names[k - 1]));
  }
}

#[tokio::test]
async fn rollback_keeps_going_when_a_compensation_fails() {
  let h = Harness::in_memory();
  h.charts.fail(ChartOperation::Install, "r3");
  h.charts.fail(ChartOperation::Uninstall, "r2");
  let rev = revision(1, vec![], &charts_template("app", &["r1", "r2", "r3"]));

  let err = h
    .manager
    .install(&actor(), &rev, placement(), InputMap::new(), false)
    .await
    .unwrap_err();

  assert_eq!(h.charts.releases(ChartOperation::Uninstall), vec!["r2", "r1"]);
  assert!(err.to_string().starts_with("install of release r3"));
}

#[tokio::test]
async fn dry_runs_never_write_records() {
  let h = Harness::on_disk();
  let org = actor().organization_id;
  let v1 = revision(
    1,
    vec![input("replicas", Some(Value::Integer(1)), false)],
    "name: app\ninputs:\n  - name: replicas\n    default: 1\ncharts:\n  - name: web\n    chart: repo/web\n    version: 1.0.0\n    values:\n      replicas: {{inputs.replicas}}\n",
  );

  let dry = h
    .manager
    .install(&actor(), &v1, placement(), InputMap::new(), true)
    .await
    .unwrap();
  assert!(dry.application.is_none());
  assert!(h.store.list(org).await.unwrap().is_empty());

  let app = h
    .manager
    .install(&actor(), &v1, placement(), InputMap::new(), false)
    .await
    .unwrap()
    .application
    .unwrap();
  h.charts.reset();

  let v2 = revision(2, v1.inputs.clone(), &charts_template("app", &["web", "worker"]));
  h.manager.upgrade(&app, &v2, true).await.unwrap();
  h.manager
    .update_inputs(&app, &v1, values(&[("replicas", Value::Integer(5))]), true)
    .await
    .unwrap();

  assert!(!h.charts.calls().is_empty());
  assert!(h.charts.calls().iter().all(|(_, _, dry_run)| *dry_run));
  assert_eq!(h.store.get(app.id, org).await.unwrap(), app);
}

#[tokio::test]
async fn key_set_change_fails_before_any_chart_call() {
  let h = Harness::in_memory();
  let rev = revision(
    1,
    vec![input("a", Some(Value::Integer(1)), false), input("b", Some(Value::Integer(2)), false)],
    "name: ab\ninputs:\n  - name: a\n    default: 1\n  - name: b\n    default: 2\ncharts:\n  - name: web\n    chart: repo/web\n    version: 1.0.0\n",
  );
  let app = h
    .manager
    .install(&actor(), &rev, placement(), InputMap::new(), false)
    .await
    .unwrap()
    .application
    .unwrap();
  h.charts.reset();

  let err = h
    .manager
    .update_inputs(&app, &rev, values(&[("a", Value::Integer(3))]), false)
    .await
    .unwrap_err();

  assert!(err.is_client_error());
  assert!(h.charts.calls().is_empty());
}

#[tokio::test]
async fn all_changed_immutables_are_listed() {
  let h = Harness::in_memory();
  let rev = revision(
    1,
    vec![input("zone", None, true), input("tier", None, true), input("size", None, false)],
    "name: many\ninputs:\n  - name: zone\n    immutable: true\n  - name: tier\n    immutable: true\n  - name: size\ncharts:\n  - name: db\n    chart: repo/db\n    version: 1.0.0\n",
  );
  let original = values(&[
    ("zone", Value::from("a")),
    ("tier", Value::from("gold")),
    ("size", Value::Integer(1)),
  ]);
  let app = h
    .manager
    .install(&actor(), &rev, placement(), original, false)
    .await
    .unwrap()
    .application
    .unwrap();

  let changed = values(&[
    ("zone", Value::from("b")),
    ("tier", Value::from("silver")),
    ("size", Value::Integer(2)),
  ]);
  let err = h.manager.update_inputs(&app, &rev, changed, false).await.unwrap_err();

  assert_eq!(
    err.to_string(),
    "inputs are immutable and cannot be changed: zone, tier"
  );
}

#[tokio::test]
async fn upgrade_prefers_existing_inputs_over_new_defaults() {
  let h = Harness::in_memory();
  let template = "name: merge\ncharts:\n  - name: web\n    chart: repo/web\n    version: 1.0.0\n";
  let v1 = revision(1, vec![input("replicas", Some(Value::Integer(1)), false)], template);
  let app = h
    .manager
    .install(&actor(), &v1, placement(), values(&[("replicas", Value::Integer(7))]), false)
    .await
    .unwrap()
    .application
    .unwrap();

  let v2 = revision(
    2,
    vec![
      input("replicas", Some(Value::Integer(3)), false),
      input("tier", Some(Value::from("basic")), false),
    ],
    template,
  );
  let outcome = h.manager.upgrade(&app, &v2, false).await.unwrap();

  let expected: BTreeMap<String, Value> = values(&[("replicas", Value::Integer(7)), ("tier", Value::from("basic"))]);
  assert_eq!(outcome.application.user_inputs, expected);
}
