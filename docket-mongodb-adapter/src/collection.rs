use async_trait::async_trait;
use bson::Document;
use docket::common::SortOrder;
use docket::errors::{DocketError, DocketResult};
use docket::filter::Filter;
use docket::store::{
    DocumentCollection, DocumentCollectionProvider, DocumentStream, FindOptions, WriteResult,
};
use futures::stream::{self, StreamExt, TryStreamExt};
use mongodb::Collection;
use std::any::Any;

/// A collection of a MongoDB database.
///
/// Filters are rendered to the MongoDB query language with
/// [`Filter::to_query`]; every method is a single driver call.
#[derive(Clone)]
pub struct MongoCollection {
    collection: Collection<Document>,
}

impl MongoCollection {
    pub(crate) fn new(collection: Collection<Document>) -> MongoCollection {
        MongoCollection { collection }
    }

    /// The driver's collection handle.
    pub fn native(&self) -> &Collection<Document> {
        &self.collection
    }

    fn backend_error(&self, operation: &str, cause: mongodb::error::Error) -> DocketError {
        log::error!(
            "{} on collection {} failed: {}",
            operation,
            self.collection.name(),
            cause
        );
        DocketError::backend(operation, cause)
    }
}

/// Returns the driver's collection handle behind `collection`, if it is
/// backed by MongoDB.
pub fn native_collection(collection: &DocumentCollection) -> Option<&Collection<Document>> {
    collection
        .downcast_ref::<MongoCollection>()
        .map(|collection| collection.native())
}

fn sort_document(options: &FindOptions) -> Option<Document> {
    if options.sort_fields().is_empty() {
        return None;
    }
    let mut sort = Document::new();
    for (field, order) in options.sort_fields() {
        let direction = match order {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        };
        sort.insert(field.clone(), direction);
    }
    Some(sort)
}

fn projection_document(options: &FindOptions) -> Option<Document> {
    options.projected_fields().map(|fields| {
        let mut projection = Document::new();
        for field in fields {
            projection.insert(field.clone(), 1);
        }
        projection
    })
}

#[async_trait]
impl DocumentCollectionProvider for MongoCollection {
    fn name(&self) -> String {
        self.collection.name().to_string()
    }

    async fn insert_one(&self, document: Document) -> DocketResult<WriteResult> {
        let result = self
            .collection
            .insert_one(document)
            .await
            .map_err(|e| self.backend_error("insert_one", e))?;
        Ok(WriteResult::inserted(vec![result.inserted_id]))
    }

    async fn insert_many(&self, documents: Vec<Document>) -> DocketResult<WriteResult> {
        let count = documents.len();
        let result = self
            .collection
            .insert_many(documents)
            .ordered(true)
            .await
            .map_err(|e| self.backend_error("insert_many", e))?;

        let mut ids = result.inserted_ids;
        let inserted = (0..count).filter_map(|index| ids.remove(&index)).collect();
        Ok(WriteResult::inserted(inserted))
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        upsert: bool,
    ) -> DocketResult<WriteResult> {
        let query = filter.to_query()?;
        let result = self
            .collection
            .replace_one(query, replacement)
            .upsert(upsert)
            .await
            .map_err(|e| self.backend_error("replace_one", e))?;
        Ok(WriteResult::replaced(
            result.matched_count,
            result.modified_count,
            result.upserted_id,
        ))
    }

    async fn delete_one(&self, filter: &Filter) -> DocketResult<WriteResult> {
        let query = filter.to_query()?;
        let result = self
            .collection
            .delete_one(query)
            .await
            .map_err(|e| self.backend_error("delete_one", e))?;
        Ok(WriteResult::deleted(result.deleted_count))
    }

    async fn delete_many(&self, filter: &Filter) -> DocketResult<WriteResult> {
        let query = filter.to_query()?;
        let result = self
            .collection
            .delete_many(query)
            .await
            .map_err(|e| self.backend_error("delete_many", e))?;
        Ok(WriteResult::deleted(result.deleted_count))
    }

    async fn count_documents(&self, filter: &Filter) -> DocketResult<u64> {
        let query = filter.to_query()?;
        self.collection
            .count_documents(query)
            .await
            .map_err(|e| self.backend_error("count_documents", e))
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> DocketResult<DocumentStream> {
        // the driver reads a limit of 0 as "no limit"
        if options.limit_count() == Some(0) {
            return Ok(stream::empty().boxed());
        }

        let query = filter.to_query()?;
        let mut find = self.collection.find(query);
        if let Some(sort) = sort_document(options) {
            find = find.sort(sort);
        }
        if let Some(skip) = options.skip_count() {
            find = find.skip(skip);
        }
        if let Some(limit) = options.limit_count() {
            find = find.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        if let Some(projection) = projection_document(options) {
            find = find.projection(projection);
        }

        let cursor = find.await.map_err(|e| self.backend_error("find", e))?;
        let name = self.name();
        Ok(cursor
            .map_err(move |e| {
                log::error!("Reading cursor of collection {} failed: {}", name, e);
                DocketError::backend("find", e)
            })
            .boxed())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
