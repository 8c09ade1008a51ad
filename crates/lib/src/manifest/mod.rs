//! Rendered application manifests.
//!
//! A manifest is the output of rendering a template revision with a concrete
//! input map. It declares the application name, its input schema, and the
//! ordered list of charts to deploy.

mod types;

pub use types::*;
