//! Platform directory resolution.

pub mod paths;
