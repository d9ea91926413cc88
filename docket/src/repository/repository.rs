use futures::TryStreamExt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::ConnectionUrl;
use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::{all, Filter};
use crate::repository::{
    Entity, EntityStream, KeyOf, OperationGuard, Query, RepositoryOperations,
};
use crate::repository_builder::RepositoryBuilder;
use crate::store::{limit_to, DocumentCollection, StoreModule};

/// A typed repository over one collection of a document store.
///
/// # Purpose
///
/// `Repository<T>` maps entities of type `T` to documents of one named
/// collection and exposes CRUD and query operations on them. Every operation
/// is one (or, for `update_many`, one per entity) round-trip delegated to the
/// store; the repository adds no caching, no locking and no retries.
///
/// # Characteristics
///
/// - **Cheap to clone**: clones share the same collection handle
/// - **Thread-safe**: `Send + Sync`, usable from many tasks at once
/// - **Bound once**: the collection handle is resolved at construction and
///   never reassigned
/// - **Bounded round-trips**: an optional operation timeout and cancellation
///   token apply to every round-trip; dropping a returned future also
///   abandons the operation
///
/// # Construction
///
/// ```rust,ignore
/// let module = InMemoryModule::new();
///
/// // connection string from the DOCKET_SERVER_SETTINGS entry
/// let people: Repository<Person> = Repository::open(&module).await?;
///
/// // explicit connection string and collection
/// let people: Repository<Person> =
///     Repository::open_collection(&module, "memory://localhost/crm", "contacts").await?;
///
/// // everything else through the builder
/// let people: Repository<Person> = Repository::builder()
///     .connection_string("memory://localhost/crm")
///     .operation_timeout(Duration::from_secs(5))
///     .open(&module)
///     .await?;
/// ```
pub struct Repository<T: Entity> {
    inner: Arc<RepositoryInner<T>>,
}

struct RepositoryInner<T: Entity> {
    collection: DocumentCollection,
    operations: RepositoryOperations<T>,
    guard: OperationGuard,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Entity> Debug for Repository<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &std::any::type_name::<T>())
            .field("collection", &self.inner.collection.name())
            .finish()
    }
}

impl<T: Entity> Repository<T> {
    /// Starts configuring a repository.
    pub fn builder() -> RepositoryBuilder<T> {
        RepositoryBuilder::new()
    }

    /// Opens a repository on the default connection entry
    /// (`DOCKET_SERVER_SETTINGS`) and the entity's default collection.
    pub async fn open<M: StoreModule>(module: &M) -> DocketResult<Self> {
        Repository::builder().open(module).await
    }

    /// Opens a repository on an explicit connection string and the entity's
    /// default collection.
    pub async fn open_with_connection_string<M: StoreModule>(
        module: &M,
        connection_string: &str,
    ) -> DocketResult<Self> {
        Repository::builder()
            .connection_string(connection_string)
            .open(module)
            .await
    }

    /// Opens a repository on an explicit connection string and collection.
    pub async fn open_collection<M: StoreModule>(
        module: &M,
        connection_string: &str,
        collection_name: &str,
    ) -> DocketResult<Self> {
        Repository::builder()
            .connection_string(connection_string)
            .collection_name(collection_name)
            .open(module)
            .await
    }

    /// Opens a repository on a structured connection URL, with an optional
    /// collection name overriding the entity's default.
    pub async fn open_url<M: StoreModule>(
        module: &M,
        url: &ConnectionUrl,
        collection_name: Option<&str>,
    ) -> DocketResult<Self> {
        let mut builder = Repository::builder().connection_url(url);
        if let Some(name) = collection_name {
            builder = builder.collection_name(name);
        }
        builder.open(module).await
    }

    /// Binds a repository to an already resolved collection handle.
    pub fn from_collection(collection: DocumentCollection) -> Self {
        Repository::with_guard(collection, OperationGuard::default())
    }

    pub(crate) fn with_guard(collection: DocumentCollection, guard: OperationGuard) -> Self {
        Repository {
            inner: Arc::new(RepositoryInner {
                collection,
                operations: RepositoryOperations::new(),
                guard,
            }),
        }
    }

    /// Returns a repository sharing this collection whose round-trips are
    /// abandoned with `Cancelled` once `token` is cancelled.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Repository::with_guard(
            self.inner.collection.clone(),
            self.inner.guard.with_cancellation(token),
        )
    }

    /// Returns a repository sharing this collection whose round-trips fail
    /// with `Timeout` after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Repository::with_guard(
            self.inner.collection.clone(),
            self.inner.guard.with_timeout(timeout),
        )
    }

    /// The name of the bound collection.
    pub fn collection_name(&self) -> String {
        self.inner.collection.name()
    }

    /// The raw collection handle.
    ///
    /// This is an escape hatch for operations the repository does not expose.
    /// Writes made through it bypass entity mapping; downcast it with
    /// [`DocumentCollection::downcast_ref`] to reach a driver's native handle.
    pub fn collection(&self) -> &DocumentCollection {
        &self.inner.collection
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.inner.guard.timeout()
    }

    /// Starts a query over the collection.
    pub fn query(&self) -> Query<T> {
        Query::new(
            self.inner.collection.clone(),
            self.inner.operations.clone(),
            self.inner.guard.clone(),
        )
    }

    /// Lazily enumerates every entity of the collection.
    pub fn stream(&self) -> EntityStream<T> {
        self.query().stream()
    }

    /// Lazily enumerates the entities matching `filter`.
    pub fn find(&self, filter: Filter) -> EntityStream<T> {
        self.query().filter(filter).stream()
    }

    /// Fetches the single entity with `id`.
    ///
    /// Fails with `NotFound` when no entity has this id and with `NotUnique`
    /// when more than one has it.
    pub async fn get_by_id(&self, id: &KeyOf<T>) -> DocketResult<T> {
        let filter = self.inner.operations.create_id_filter(id)?;
        let options = limit_to(2);

        let (first, second) = self
            .inner
            .guard
            .run("get_by_id", async {
                let mut documents = self.inner.collection.find(&filter, &options).await?;
                let first = documents.try_next().await?;
                let second = match first {
                    Some(_) => documents.try_next().await?,
                    None => None,
                };
                Ok((first, second))
            })
            .await?;

        match (first, second) {
            (Some(document), None) => self.inner.operations.to_entity(document),
            (None, _) => {
                log::debug!("No {} found with id {:?}", std::any::type_name::<T>(), id);
                Err(DocketError::new(
                    &format!("No entity found with id {:?}", id),
                    ErrorKind::NotFound,
                ))
            }
            (Some(_), Some(_)) => {
                log::error!(
                    "More than one {} found with id {:?}",
                    std::any::type_name::<T>(),
                    id
                );
                Err(DocketError::new(
                    &format!("More than one entity found with id {:?}", id),
                    ErrorKind::NotUnique,
                ))
            }
        }
    }

    /// Counts every entity of the collection.
    pub async fn count(&self) -> DocketResult<u64> {
        let filter = all();
        self.inner
            .guard
            .run("count", self.inner.collection.count_documents(&filter))
            .await
    }

    /// Whether at least one entity matches `filter`.
    pub async fn exists(&self, filter: Filter) -> DocketResult<bool> {
        self.inner
            .guard
            .run("exists", self.inner.collection.exists(&filter))
            .await
    }

    /// Inserts an entity and returns it with its store-assigned id.
    pub async fn add(&self, entity: T) -> DocketResult<T> {
        let document = self.inner.operations.to_document(&entity)?;
        let result = self
            .inner
            .guard
            .run("insert_one", self.inner.collection.insert_one(document))
            .await?;
        self.inner
            .operations
            .with_assigned_id(entity, result.inserted_ids().first())
    }

    /// Inserts entities as one batch and returns them with their
    /// store-assigned ids, in input order.
    ///
    /// The batch is ordered: on failure, entities before the failing one are
    /// stored and the rest are not.
    pub async fn add_many(&self, entities: Vec<T>) -> DocketResult<Vec<T>> {
        if entities.is_empty() {
            return Ok(entities);
        }

        let documents = self.inner.operations.to_documents(&entities)?;
        let result = self
            .inner
            .guard
            .run("insert_many", self.inner.collection.insert_many(documents))
            .await?;

        let ids = result.inserted_ids();
        let mut added = Vec::with_capacity(entities.len());
        for (index, entity) in entities.into_iter().enumerate() {
            added.push(
                self.inner
                    .operations
                    .with_assigned_id(entity, ids.get(index))?,
            );
        }
        Ok(added)
    }

    /// Inserts or replaces an entity.
    ///
    /// An entity without id is added. Otherwise the document with its id is
    /// replaced, or inserted when none exists. The entity is returned
    /// unchanged.
    pub async fn update(&self, entity: T) -> DocketResult<T> {
        let key = match self.inner.operations.key_of(&entity)? {
            Some(key) => key,
            None => return self.add(entity).await,
        };

        let filter = self.inner.operations.create_id_filter(&key)?;
        let document = self.inner.operations.to_document(&entity)?;
        self.inner
            .guard
            .run(
                "replace_one",
                self.inner.collection.replace_one(&filter, document, true),
            )
            .await?;
        Ok(entity)
    }

    /// Upserts entities one at a time, in order.
    ///
    /// Stops at the first failure: entities before it are stored, entities
    /// after it are not attempted.
    pub async fn update_many(&self, entities: Vec<T>) -> DocketResult<Vec<T>> {
        let mut updated = Vec::with_capacity(entities.len());
        for entity in entities {
            updated.push(self.update(entity).await?);
        }
        Ok(updated)
    }

    /// Deletes the entity with `id`. Returns how many were deleted (0 or 1).
    pub async fn delete_by_id(&self, id: &KeyOf<T>) -> DocketResult<u64> {
        let filter = self.inner.operations.create_id_filter(id)?;
        let result = self
            .inner
            .guard
            .run("delete_one", self.inner.collection.delete_one(&filter))
            .await?;
        Ok(result.deleted_count())
    }

    /// Deletes the stored counterpart of `entity`.
    ///
    /// An entity without id has no stored counterpart; nothing is sent to the
    /// store and 0 is returned.
    pub async fn delete(&self, entity: &T) -> DocketResult<u64> {
        match self.inner.operations.key_of(entity)? {
            Some(key) => self.delete_by_id(&key).await,
            None => {
                log::debug!(
                    "Skipping delete of {} without id",
                    std::any::type_name::<T>()
                );
                Ok(0)
            }
        }
    }

    /// Deletes every entity matching `filter`. Returns how many were deleted.
    pub async fn delete_where(&self, filter: Filter) -> DocketResult<u64> {
        let result = self
            .inner
            .guard
            .run("delete_many", self.inner.collection.delete_many(&filter))
            .await?;
        Ok(result.deleted_count())
    }

    /// Deletes every entity of the collection.
    pub async fn delete_all(&self) -> DocketResult<u64> {
        self.delete_where(all()).await
    }
}
