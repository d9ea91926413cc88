use thiserror::Error;

/// Errors raised by the adapter itself, as opposed to the driver.
///
/// They reach callers as the cause of a `DocketError`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MongoAdapterError {
    #[error("Connection string does not name a default database: {0}")]
    MissingDatabase(String),

    #[error("Invalid collection name '{0}'")]
    InvalidCollectionName(String),
}
