//! Chart operation client interface.
//!
//! Chart backends (for example a wrapper around the `helm` CLI) implement
//! [`ChartClient`]. Each call targets a single release in one cluster context
//! and namespace. Cluster credentials belong to the client implementation and
//! are supplied to it at construction time.

mod types;

pub use types::*;
