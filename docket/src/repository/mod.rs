//! Typed repositories over document collections.
//!
//! A [`Repository<T>`] maps entities of type `T` to documents of one
//! collection. Entities implement [`Entity`], which names the default
//! collection, the identifier field and the [`KeyStrategy`] converting
//! caller-facing keys to stored identifiers.
//!
//! Every operation is async. [`BlockingRepository<T>`] drives the same
//! operations to completion on an owned runtime for callers without one.

mod blocking;
mod cursor;
mod entity;
mod key;
mod operation_guard;
mod query;
mod repository;
mod repository_operations;

pub use blocking::*;
pub use cursor::*;
pub use entity::*;
pub use key::*;
pub(crate) use operation_guard::*;
pub use query::*;
pub use repository::*;
pub(crate) use repository_operations::*;
