use async_trait::async_trait;
use bson::Document;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use crate::errors::DocketResult;
use crate::filter::Filter;
use crate::store::{FindOptions, WriteResult};

/// A stream of documents produced by a find round-trip.
///
/// Documents are pulled from the store as the stream is polled; dropping the
/// stream releases the underlying cursor.
pub type DocumentStream = BoxStream<'static, DocketResult<Document>>;

/// Low-level interface to one named collection of a document store.
///
/// Every method is one round-trip to the store. Implementations must report
/// the store's own errors as [`ErrorKind::BackendError`] with the driver error
/// attached unchanged as the cause.
///
/// [`ErrorKind::BackendError`]: crate::errors::ErrorKind::BackendError
#[async_trait]
pub trait DocumentCollectionProvider: Any + Send + Sync {
    /// The collection name.
    fn name(&self) -> String;

    /// Inserts one document. Returns the inserted identifier.
    async fn insert_one(&self, document: Document) -> DocketResult<WriteResult>;

    /// Inserts documents in order as one batch, stopping at the first failure.
    async fn insert_many(&self, documents: Vec<Document>) -> DocketResult<WriteResult>;

    /// Replaces the first document matching `filter`. With `upsert`, inserts
    /// `replacement` when nothing matches.
    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        upsert: bool,
    ) -> DocketResult<WriteResult>;

    /// Deletes the first document matching `filter`.
    async fn delete_one(&self, filter: &Filter) -> DocketResult<WriteResult>;

    /// Deletes every document matching `filter`.
    async fn delete_many(&self, filter: &Filter) -> DocketResult<WriteResult>;

    /// Counts documents matching `filter`.
    async fn count_documents(&self, filter: &Filter) -> DocketResult<u64>;

    /// Checks whether at least one document matches `filter`.
    async fn exists(&self, filter: &Filter) -> DocketResult<bool> {
        let options = FindOptions::new().limit(1);
        let mut documents = self.find(filter, &options).await?;
        Ok(documents.try_next().await?.is_some())
    }

    /// Opens a cursor over the documents matching `filter`.
    async fn find(&self, filter: &Filter, options: &FindOptions) -> DocketResult<DocumentStream>;

    fn as_any(&self) -> &dyn Any;
}

/// Handle to one named collection, bound once and shared by clones.
///
/// # Examples
///
/// ```rust,ignore
/// let collection = store.collection("people")?;
/// let result = collection.insert_one(doc! { "name": "Ada" }).await?;
/// ```
#[derive(Clone)]
pub struct DocumentCollection {
    inner: Arc<dyn DocumentCollectionProvider>,
}

impl DocumentCollection {
    pub fn new<T: DocumentCollectionProvider + 'static>(inner: T) -> Self {
        DocumentCollection {
            inner: Arc::new(inner),
        }
    }

    /// Downcasts the backing provider to a concrete collection type.
    pub fn downcast_ref<T: DocumentCollectionProvider + 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }
}

impl Deref for DocumentCollection {
    type Target = Arc<dyn DocumentCollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for DocumentCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCollection")
            .field("name", &self.inner.name())
            .finish()
    }
}
