use futures::StreamExt;
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};

use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::Filter;
use crate::repository::{Entity, EntityStream, KeyOf, Query, Repository};
use crate::repository_builder::RepositoryBuilder;
use crate::store::StoreModule;

/// A blocking front end to [`Repository<T>`].
///
/// Owns a tokio runtime and drives every repository operation to completion
/// on it, so the operations can be called from synchronous code. Must not be
/// used from within an async context; use [`Repository<T>`] there.
///
/// # Examples
///
/// ```rust,ignore
/// let module = InMemoryModule::new();
/// let people = BlockingRepository::<Person>::open_with_connection_string(
///     &module,
///     "memory://localhost/crm",
/// )?;
///
/// let ada = people.add(Person::new("Ada"))?;
/// for person in &people {
///     println!("{}", person?.name);
/// }
/// ```
pub struct BlockingRepository<T: Entity> {
    runtime: Arc<Runtime>,
    repository: Repository<T>,
}

impl<T: Entity> Clone for BlockingRepository<T> {
    fn clone(&self) -> Self {
        BlockingRepository {
            runtime: self.runtime.clone(),
            repository: self.repository.clone(),
        }
    }
}

fn new_runtime() -> DocketResult<Arc<Runtime>> {
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .thread_name("docket-blocking")
        .build()
        .map_err(|e| {
            log::error!("Failed to start runtime for blocking repository: {}", e);
            DocketError::new_with_cause(
                "Failed to start runtime for blocking repository",
                ErrorKind::InternalError,
                e,
            )
        })?;
    Ok(Arc::new(runtime))
}

impl<T: Entity> BlockingRepository<T> {
    /// Opens a repository configured by `builder` on a new runtime.
    pub fn open_with<M: StoreModule>(builder: RepositoryBuilder<T>, module: &M) -> DocketResult<Self> {
        let runtime = new_runtime()?;
        let repository = runtime.block_on(builder.open(module))?;
        Ok(BlockingRepository {
            runtime,
            repository,
        })
    }

    /// Blocking counterpart of [`Repository::open`].
    pub fn open<M: StoreModule>(module: &M) -> DocketResult<Self> {
        BlockingRepository::open_with(Repository::builder(), module)
    }

    /// Blocking counterpart of [`Repository::open_with_connection_string`].
    pub fn open_with_connection_string<M: StoreModule>(
        module: &M,
        connection_string: &str,
    ) -> DocketResult<Self> {
        BlockingRepository::open_with(
            Repository::builder().connection_string(connection_string),
            module,
        )
    }

    /// Blocking counterpart of [`Repository::open_collection`].
    pub fn open_collection<M: StoreModule>(
        module: &M,
        connection_string: &str,
        collection_name: &str,
    ) -> DocketResult<Self> {
        BlockingRepository::open_with(
            Repository::builder()
                .connection_string(connection_string)
                .collection_name(collection_name),
            module,
        )
    }

    /// Wraps an existing repository, driving it on a new runtime.
    ///
    /// The repository's store must not be tied to another runtime.
    pub fn from_repository(repository: Repository<T>) -> DocketResult<Self> {
        Ok(BlockingRepository {
            runtime: new_runtime()?,
            repository,
        })
    }

    /// The underlying async repository.
    pub fn as_async(&self) -> &Repository<T> {
        &self.repository
    }

    pub fn collection_name(&self) -> String {
        self.repository.collection_name()
    }

    pub fn get_by_id(&self, id: &KeyOf<T>) -> DocketResult<T> {
        self.runtime.block_on(self.repository.get_by_id(id))
    }

    pub fn count(&self) -> DocketResult<u64> {
        self.runtime.block_on(self.repository.count())
    }

    pub fn exists(&self, filter: Filter) -> DocketResult<bool> {
        self.runtime.block_on(self.repository.exists(filter))
    }

    pub fn add(&self, entity: T) -> DocketResult<T> {
        self.runtime.block_on(self.repository.add(entity))
    }

    pub fn add_many(&self, entities: Vec<T>) -> DocketResult<Vec<T>> {
        self.runtime.block_on(self.repository.add_many(entities))
    }

    pub fn update(&self, entity: T) -> DocketResult<T> {
        self.runtime.block_on(self.repository.update(entity))
    }

    pub fn update_many(&self, entities: Vec<T>) -> DocketResult<Vec<T>> {
        self.runtime.block_on(self.repository.update_many(entities))
    }

    pub fn delete_by_id(&self, id: &KeyOf<T>) -> DocketResult<u64> {
        self.runtime.block_on(self.repository.delete_by_id(id))
    }

    pub fn delete(&self, entity: &T) -> DocketResult<u64> {
        self.runtime.block_on(self.repository.delete(entity))
    }

    pub fn delete_where(&self, filter: Filter) -> DocketResult<u64> {
        self.runtime.block_on(self.repository.delete_where(filter))
    }

    pub fn delete_all(&self) -> DocketResult<u64> {
        self.runtime.block_on(self.repository.delete_all())
    }

    /// Collects the results of a query built on [`Repository::query`].
    pub fn fetch(&self, query: &Query<T>) -> DocketResult<Vec<T>> {
        self.runtime.block_on(query.to_vec())
    }

    pub fn query(&self) -> Query<T> {
        self.repository.query()
    }

    /// Iterates every entity of the collection.
    pub fn iter(&self) -> BlockingIter<T> {
        self.iter_stream(self.repository.stream())
    }

    /// Iterates the results of `query` lazily.
    pub fn iter_query(&self, query: &Query<T>) -> BlockingIter<T> {
        self.iter_stream(query.stream())
    }

    fn iter_stream(&self, stream: EntityStream<T>) -> BlockingIter<T> {
        BlockingIter {
            runtime: self.runtime.clone(),
            stream,
        }
    }
}

/// A blocking iterator over an [`EntityStream`].
pub struct BlockingIter<T> {
    runtime: Arc<Runtime>,
    stream: EntityStream<T>,
}

impl<T> Iterator for BlockingIter<T> {
    type Item = DocketResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}

impl<'a, T: Entity> IntoIterator for &'a BlockingRepository<T> {
    type Item = DocketResult<T>;
    type IntoIter = BlockingIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
