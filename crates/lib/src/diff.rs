//! Diff computation between manifests.
//!
//! This module computes the difference between the chart set of the currently
//! applied manifest and a newly rendered one, determining which releases need
//! to be installed, updated, or removed.

use std::collections::{BTreeMap, BTreeSet};

use crate::manifest::ChartDecl;

/// Diff between current and desired chart sets.
///
/// The three lists are disjoint and together cover every release name that
/// appears in either manifest. Each list is sorted by release name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffSet {
  /// Releases in desired, not in current.
  pub to_install: Vec<String>,

  /// Releases in both.
  pub to_update: Vec<String>,

  /// Releases in current, not in desired.
  pub to_remove: Vec<String>,
}

impl DiffSet {
  /// Total number of distinct release names across both manifests.
  pub fn total_releases(&self) -> usize {
    self.to_install.len() + self.to_update.len() + self.to_remove.len()
  }
}

/// Compute the diff between two chart mappings keyed by release name.
///
/// # Arguments
///
/// * `current` - Chart mapping of the applied manifest
/// * `desired` - Chart mapping of the newly rendered manifest
///
/// # Diff Logic
///
/// - Releases in desired but not in current → `to_install`
/// - Releases in current but not in desired → `to_remove`
/// - Releases in both → `to_update`
///
/// Only release names are compared. A release whose chart reference changes
/// keeps its name and is therefore updated, not reinstalled.
pub fn compute_diff(current: &BTreeMap<String, ChartDecl>, desired: &BTreeMap<String, ChartDecl>) -> DiffSet {
  let current_names: BTreeSet<&String> = current.keys().collect();
  let desired_names: BTreeSet<&String> = desired.keys().collect();

  DiffSet {
    to_install: desired_names
      .difference(&current_names)
      .map(|name| (*name).clone())
      .collect(),
    to_update: desired_names
      .intersection(&current_names)
      .map(|name| (*name).clone())
      .collect(),
    to_remove: current_names
      .difference(&desired_names)
      .map(|name| (*name).clone())
      .collect(),
  }
}
