//! Shared utilities.
//!
//! Currently only test helpers.

#[cfg(test)]
pub mod testutil;
