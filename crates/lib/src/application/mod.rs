//! Application records and their persistence.
//!
//! An [`Application`] is a deployed instance of a [`TemplateRevision`]: the
//! rendered manifest that was last applied, the inputs used to render it, and
//! where it runs.
//!
//! # Submodules
//!
//! - [`repository`] - the [`ApplicationRepository`] trait
//! - [`memory`] - in-memory repository
//! - [`store`] - JSON file repository

pub mod memory;
pub mod repository;
pub mod store;
mod types;

pub use memory::MemoryApplicationStore;
pub use repository::{ApplicationRepository, RepositoryError};
pub use store::FileApplicationStore;
pub use types::*;
