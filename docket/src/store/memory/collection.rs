use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document};
use futures::stream::{self, StreamExt};
use parking_lot::RwLock;
use std::any::Any;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::common::{get_field, sort_compare, values_equal, SortOrder, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocketError, DocketResult};
use crate::filter::Filter;
use crate::store::memory::InMemoryStoreError;
use crate::store::{DocumentCollectionProvider, DocumentStream, FindOptions, WriteResult};

/// A collection of the in-memory store.
///
/// Mirrors the observable behaviour of a real document store closely enough
/// for repositories to be tested against it: `_id` is unique and generated
/// when missing, batched inserts are ordered and stop at the first failure,
/// and a replacement cannot change a document's `_id`.
pub struct InMemoryCollection {
    name: String,
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryCollection {
    pub(crate) fn new(name: &str, documents: Arc<RwLock<Vec<Document>>>) -> Self {
        InMemoryCollection {
            name: name.to_string(),
            documents,
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    fn duplicate_key(&self, operation: &str, id: &Bson) -> DocketError {
        let cause = InMemoryStoreError::DuplicateKey {
            collection: self.name.clone(),
            id: id.to_string(),
        };
        log::error!("{} on collection {} failed: {}", operation, self.name, cause);
        DocketError::backend(operation, cause)
    }

    // inserts into an already locked document list
    fn insert_locked(
        &self,
        operation: &str,
        documents: &mut Vec<Document>,
        document: Document,
    ) -> DocketResult<Bson> {
        let document = with_id(document);
        let id = document.get(DOC_ID).cloned().unwrap_or(Bson::Null);
        if contains_id(documents, &id) {
            return Err(self.duplicate_key(operation, &id));
        }
        documents.push(document);
        Ok(id)
    }
}

/// Puts `_id` first, generating an ObjectId when it is missing or null.
fn with_id(document: Document) -> Document {
    let id = match document.get(DOC_ID) {
        None | Some(Bson::Null) => Bson::ObjectId(ObjectId::new()),
        Some(id) => id.clone(),
    };

    let mut result = Document::new();
    result.insert(DOC_ID, id);
    for (key, value) in document {
        if key != DOC_ID {
            result.insert(key, value);
        }
    }
    result
}

fn contains_id(documents: &[Document], id: &Bson) -> bool {
    documents
        .iter()
        .any(|doc| doc.get(DOC_ID).map(|v| values_equal(v, id)).unwrap_or(false))
}

fn matching_positions(documents: &[Document], filter: &Filter) -> DocketResult<Vec<usize>> {
    let mut positions = Vec::new();
    for (index, document) in documents.iter().enumerate() {
        if filter.apply(document)? {
            positions.push(index);
        }
    }
    Ok(positions)
}

fn compare_documents(a: &Document, b: &Document, sort_by: &[(String, SortOrder)]) -> Ordering {
    for (field, order) in sort_by {
        let ordering = sort_compare(get_field(a, field), get_field(b, field));
        let ordering = match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn project(document: &Document, fields: &[String]) -> Document {
    let mut result = Document::new();
    if let Some(id) = document.get(DOC_ID) {
        result.insert(DOC_ID, id.clone());
    }
    for field in fields {
        let top = field.split(FIELD_SEPARATOR).next().unwrap_or(field.as_str());
        if let Some(value) = document.get(top) {
            result.insert(top, value.clone());
        }
    }
    result
}

#[async_trait]
impl DocumentCollectionProvider for InMemoryCollection {
    fn name(&self) -> String {
        self.name.clone()
    }

    async fn insert_one(&self, document: Document) -> DocketResult<WriteResult> {
        let mut documents = self.documents.write();
        let id = self.insert_locked("insert_one", &mut documents, document)?;
        Ok(WriteResult::inserted(vec![id]))
    }

    async fn insert_many(&self, documents: Vec<Document>) -> DocketResult<WriteResult> {
        let mut stored = self.documents.write();
        let mut ids = Vec::with_capacity(documents.len());
        for document in documents {
            ids.push(self.insert_locked("insert_many", &mut stored, document)?);
        }
        Ok(WriteResult::inserted(ids))
    }

    async fn replace_one(
        &self,
        filter: &Filter,
        replacement: Document,
        upsert: bool,
    ) -> DocketResult<WriteResult> {
        let mut documents = self.documents.write();
        let position = matching_positions(&documents, filter)?.into_iter().next();

        match position {
            Some(index) => {
                let existing_id = documents[index].get(DOC_ID).cloned().unwrap_or(Bson::Null);
                if let Some(new_id) = replacement.get(DOC_ID) {
                    if !values_equal(new_id, &existing_id) {
                        let cause = InMemoryStoreError::ImmutableId {
                            collection: self.name.clone(),
                        };
                        log::error!("replace_one on collection {} failed: {}", self.name, cause);
                        return Err(DocketError::backend("replace_one", cause));
                    }
                }

                let mut replacement = replacement;
                replacement.insert(DOC_ID, existing_id);
                let replacement = with_id(replacement);
                let modified = if documents[index] == replacement { 0 } else { 1 };
                documents[index] = replacement;
                Ok(WriteResult::replaced(1, modified, None))
            }
            None if upsert => {
                let id = self.insert_locked("replace_one", &mut documents, replacement)?;
                Ok(WriteResult::replaced(0, 0, Some(id)))
            }
            None => Ok(WriteResult::replaced(0, 0, None)),
        }
    }

    async fn delete_one(&self, filter: &Filter) -> DocketResult<WriteResult> {
        let mut documents = self.documents.write();
        match matching_positions(&documents, filter)?.into_iter().next() {
            Some(index) => {
                documents.remove(index);
                Ok(WriteResult::deleted(1))
            }
            None => Ok(WriteResult::deleted(0)),
        }
    }

    async fn delete_many(&self, filter: &Filter) -> DocketResult<WriteResult> {
        let mut documents = self.documents.write();
        let positions = matching_positions(&documents, filter)?;
        for index in positions.iter().rev() {
            documents.remove(*index);
        }
        Ok(WriteResult::deleted(positions.len() as u64))
    }

    async fn count_documents(&self, filter: &Filter) -> DocketResult<u64> {
        let documents = self.documents.read();
        Ok(matching_positions(&documents, filter)?.len() as u64)
    }

    async fn find(&self, filter: &Filter, options: &FindOptions) -> DocketResult<DocumentStream> {
        let mut result = {
            let documents = self.documents.read();
            let mut matched = Vec::new();
            for document in documents.iter() {
                if filter.apply(document)? {
                    matched.push(document.clone());
                }
            }
            matched
        };

        if !options.sort_fields().is_empty() {
            result.sort_by(|a, b| compare_documents(a, b, options.sort_fields()));
        }

        let skip = options.skip_count().unwrap_or(0) as usize;
        let limit = options.limit_count().map(|l| l as usize).unwrap_or(usize::MAX);
        let projection = options.projected_fields().map(|fields| fields.to_vec());

        let documents: Vec<Document> = result
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|document| match &projection {
                Some(fields) => project(&document, fields),
                None => document,
            })
            .collect();

        Ok(stream::iter(documents.into_iter().map(Ok)).boxed())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
