//! # revu-catalog
//!
//! [`CaseCatalog`](revu_core::catalog::CaseCatalog) implementations.
//!
//! - [`FsCatalog`] reads one sub-directory per case from a base directory.
//!   Each case directory holds a reference report, a generated report and
//!   zero or more image slices.
//! - [`InMemoryCatalog`] is built in code, for tests and scripted runs.

pub mod error;
pub mod fs;
pub mod memory;

pub use error::CatalogError;
pub use fs::FsCatalog;
pub use memory::InMemoryCatalog;
