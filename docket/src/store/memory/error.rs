use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised by the in-memory store itself.
///
/// They reach callers as the cause of a `BackendError`, the same way a
/// driver's own errors do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InMemoryStoreError {
    /// A document with the same `_id` already exists in the collection.
    DuplicateKey { collection: String, id: String },
    /// A replacement tried to change the `_id` of the matched document.
    ImmutableId { collection: String },
}

impl Display for InMemoryStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InMemoryStoreError::DuplicateKey { collection, id } => write!(
                f,
                "E11000 duplicate key error collection: {} dup key: {{ _id: {} }}",
                collection, id
            ),
            InMemoryStoreError::ImmutableId { collection } => write!(
                f,
                "the (immutable) field '_id' was found to have been altered in collection {}",
                collection
            ),
        }
    }
}

impl Error for InMemoryStoreError {}
