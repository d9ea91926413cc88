use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;

use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::store::memory::InMemoryCollection;
use crate::store::{DocumentCollection, DocumentStoreProvider};

/// One in-memory database.
///
/// Collections are created on first access and live as long as the store.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

struct InMemoryStoreInner {
    database_name: String,
    collections: DashMap<String, Arc<RwLock<Vec<bson::Document>>>>,
}

impl InMemoryStore {
    pub fn new(database_name: &str) -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner {
                database_name: database_name.to_string(),
                collections: DashMap::new(),
            }),
        }
    }

    /// Names of the collections touched so far.
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}

impl DocumentStoreProvider for InMemoryStore {
    fn database_name(&self) -> String {
        self.inner.database_name.clone()
    }

    fn collection(&self, name: &str) -> DocketResult<DocumentCollection> {
        if name.trim().is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(DocketError::new(
                "Collection name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        let documents = self
            .inner
            .collections
            .entry(name.to_string())
            .or_default()
            .clone();
        Ok(DocumentCollection::new(InMemoryCollection::new(
            name, documents,
        )))
    }
}
