use async_trait::async_trait;

use crate::errors::DocketResult;
use crate::store::DocumentStore;

/// A pluggable document-store backend.
///
/// A module turns a connection string into a connected [`DocumentStore`].
/// The connection string must name the database to use.
#[async_trait]
pub trait StoreModule: Send + Sync {
    /// Connects to the store described by `connection_string`.
    ///
    /// Malformed or unsupported connection strings fail with
    /// `ConfigurationError`; unreachable targets with `ConnectionError`.
    async fn connect(&self, connection_string: &str) -> DocketResult<DocumentStore>;
}
