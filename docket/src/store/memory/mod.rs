//! In-memory document store.
//!
//! Keeps every collection as a vector of documents guarded by a read-write
//! lock. Databases live as long as the [`InMemoryModule`] that created them,
//! and every connection made through the same module to the same database
//! sees the same data.

mod collection;
mod error;
mod module;
mod store;

pub use collection::*;
pub use error::*;
pub use module::*;
pub use store::*;
