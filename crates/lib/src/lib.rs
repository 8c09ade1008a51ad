//! chartdeck-lib: Core types and logic for chartdeck
//!
//! This crate provides the pieces needed to run applications built from
//! chart templates:
//! - `TemplateRevision`: versioned template text plus its input schema
//! - `ManifestSchema`: a rendered template, listing the charts to deploy
//! - `Application`: the persisted record of a deployed manifest
//! - `LifecycleManager`: install, upgrade, update inputs, and terminate

pub mod application;
pub mod chart;
pub mod config;
pub mod consts;
pub mod diff;
pub mod lifecycle;
pub mod manifest;
pub mod platform;
pub mod template;
pub mod util;
pub mod value;
