use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::common::MEMORY_SCHEME;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::memory::InMemoryStore;
use crate::store::{DocumentStore, StoreModule};

/// Store module for `memory://<host>/<database>` connection strings.
///
/// Clones share the same set of databases.
///
/// # Examples
///
/// ```rust,ignore
/// let module = InMemoryModule::new();
/// let store = module.connect("memory://localhost/shop").await?;
/// let orders = store.collection("orders")?;
/// ```
#[derive(Clone, Default)]
pub struct InMemoryModule {
    databases: Arc<DashMap<String, InMemoryStore>>,
}

impl InMemoryModule {
    pub fn new() -> InMemoryModule {
        InMemoryModule::default()
    }

    /// Number of databases opened through this module so far.
    pub fn database_count(&self) -> usize {
        self.databases.len()
    }
}

#[async_trait]
impl StoreModule for InMemoryModule {
    async fn connect(&self, connection_string: &str) -> DocketResult<DocumentStore> {
        let (host, database) = parse_connection_string(connection_string)?;
        let key = format!("{}/{}", host, database);
        let store = self
            .databases
            .entry(key)
            .or_insert_with(|| InMemoryStore::new(&database))
            .clone();

        log::debug!("Connected to in-memory database {} on {}", database, host);
        Ok(DocumentStore::new(store))
    }
}

fn parse_connection_string(connection_string: &str) -> DocketResult<(String, String)> {
    let prefix = format!("{}://", MEMORY_SCHEME);
    let rest = match connection_string.strip_prefix(&prefix) {
        Some(rest) => rest,
        None => {
            log::error!(
                "Unsupported connection string for in-memory store: {}",
                connection_string
            );
            return Err(DocketError::new(
                &format!(
                    "Unsupported connection string, expected {}://<host>/<database>",
                    MEMORY_SCHEME
                ),
                ErrorKind::ConfigurationError,
            ));
        }
    };

    let rest = rest.split('?').next().unwrap_or_default();
    let (host, database) = rest.split_once('/').unwrap_or((rest, ""));
    if database.is_empty() || database.contains('/') {
        log::error!("Connection string does not name a database: {}", connection_string);
        return Err(DocketError::new(
            "Connection string does not name a database",
            ErrorKind::ConfigurationError,
        ));
    }

    let host = if host.is_empty() { "localhost" } else { host };
    Ok((host.to_string(), database.to_string()))
}
