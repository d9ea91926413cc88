use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use crate::errors::DocketResult;
use crate::store::DocumentCollection;

/// Low-level interface to one database of a document store.
pub trait DocumentStoreProvider: Send + Sync {
    /// The database this store is bound to.
    fn database_name(&self) -> String;

    /// Resolves a handle to the named collection. Collections are created
    /// lazily by the store on first write.
    fn collection(&self, name: &str) -> DocketResult<DocumentCollection>;
}

/// A connected database, as returned by [`StoreModule::connect`].
///
/// [`StoreModule::connect`]: crate::store::StoreModule::connect
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<dyn DocumentStoreProvider>,
}

impl DocumentStore {
    pub fn new<T: DocumentStoreProvider + 'static>(inner: T) -> Self {
        DocumentStore {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for DocumentStore {
    type Target = Arc<dyn DocumentStoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for DocumentStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("database", &self.inner.database_name())
            .finish()
    }
}
