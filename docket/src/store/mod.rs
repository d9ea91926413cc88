//! The document-store seam.
//!
//! A [`StoreModule`] turns a connection string into a [`DocumentStore`]; a
//! store hands out [`DocumentCollection`] handles; a collection performs the
//! document round-trips a repository needs. The in-memory backend in
//! [`memory`] implements the seam without any server; driver-backed stores
//! live in their own adapter crates.

mod document_collection;
mod document_store;
mod find_options;
pub mod memory;
mod store_module;
mod write_result;

pub use document_collection::*;
pub use document_store::*;
pub use find_options::*;
pub use store_module::*;
pub use write_result::*;
