use bson::Document;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;

use crate::common::SortOrder;
use crate::errors::{DocketError, DocketResult};
use crate::filter::{all, merge_filters, Filter};
use crate::repository::{Entity, EntityStream, OperationGuard, RepositoryOperations};
use crate::store::{DocumentCollection, FindOptions};

/// The queryable surface of a repository.
///
/// A `Query` accumulates a filter, sort keys, skip and limit without touching
/// the store. The store is contacted when a result is requested: when the
/// stream returned by [`Query::stream`] is first polled, or when one of the
/// async terminal operations is awaited.
///
/// # Examples
///
/// ```rust,ignore
/// let adults = repository
///     .query()
///     .filter(field("age").gte(18))
///     .sort_by("name", SortOrder::Ascending)
///     .limit(10)
///     .to_vec()
///     .await?;
/// ```
pub struct Query<T: Entity> {
    collection: DocumentCollection,
    operations: RepositoryOperations<T>,
    guard: OperationGuard,
    filter: Option<Filter>,
    options: FindOptions,
}

impl<T: Entity> Clone for Query<T> {
    fn clone(&self) -> Self {
        Query {
            collection: self.collection.clone(),
            operations: self.operations.clone(),
            guard: self.guard.clone(),
            filter: self.filter.clone(),
            options: self.options.clone(),
        }
    }
}

impl<T: Entity> Query<T> {
    pub(crate) fn new(
        collection: DocumentCollection,
        operations: RepositoryOperations<T>,
        guard: OperationGuard,
    ) -> Self {
        Query {
            collection,
            operations,
            guard,
            filter: None,
            options: FindOptions::new(),
        }
    }

    /// Name of the element type this query produces.
    pub fn element_type(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    /// Narrows the query. Repeated calls are combined with AND.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(merge_filters(self.filter.take(), filter));
        self
    }

    /// Appends a sort key. Earlier keys take precedence.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> Self {
        self.options = self.options.sort_by(field_name, sort_order);
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.options = self.options.skip(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.options = self.options.limit(limit);
        self
    }

    /// The effective filter; `all()` when none was given.
    pub fn current_filter(&self) -> Filter {
        self.filter.clone().unwrap_or_else(all)
    }

    pub fn find_options(&self) -> &FindOptions {
        &self.options
    }

    /// Starts a lazy enumeration of the matching entities.
    pub fn stream(&self) -> EntityStream<T> {
        let operations = self.operations.clone();
        let entities = self
            .documents(self.options.clone())
            .and_then(move |document| future::ready(operations.to_entity(document)));
        EntityStream::new(entities.boxed())
    }

    /// Enumerates only `fields` of the matching documents, read as `P`.
    ///
    /// `_id` is always included. `P` should tolerate missing fields (for
    /// example with `#[serde(default)]`) since everything else is left out.
    pub fn project<P>(&self, fields: &[&str]) -> EntityStream<P>
    where
        P: DeserializeOwned + Send + 'static,
    {
        let fields = fields.iter().map(|f| f.to_string()).collect();
        let projected = self
            .documents(self.options.clone().projection(fields))
            .and_then(|document| {
                future::ready(bson::from_document::<P>(document).map_err(DocketError::from))
            });
        EntityStream::new(projected.boxed())
    }

    /// Collects every matching entity.
    pub async fn to_vec(&self) -> DocketResult<Vec<T>> {
        self.stream().to_vec().await
    }

    /// Returns the first matching entity, if any.
    pub async fn first(&self) -> DocketResult<Option<T>> {
        let limit = self.options.limit_count().map_or(1, |limit| limit.min(1));
        self.clone().limit(limit).stream().first().await
    }

    /// Counts matching entities, honouring skip and limit.
    pub async fn count(&self) -> DocketResult<u64> {
        let filter = self.current_filter();
        let total = self
            .guard
            .run("count_documents", self.collection.count_documents(&filter))
            .await?;

        let remaining = total.saturating_sub(self.options.skip_count().unwrap_or(0));
        Ok(match self.options.limit_count() {
            Some(limit) => remaining.min(limit),
            None => remaining,
        })
    }

    /// Whether at least one entity matches the filter.
    pub async fn exists(&self) -> DocketResult<bool> {
        let filter = self.current_filter();
        self.guard
            .run("exists", self.collection.exists(&filter))
            .await
    }

    fn documents(&self, options: FindOptions) -> BoxStream<'static, DocketResult<Document>> {
        let collection = self.collection.clone();
        let filter = self.current_filter();
        let guard = self.guard.clone();
        let item_guard = self.guard.clone();

        stream::once(async move {
            guard
                .run("find", collection.find(&filter, &options))
                .await
        })
        .try_flatten()
        .and_then(move |document| future::ready(item_guard.check("find").map(|_| document)))
        .boxed()
    }
}
