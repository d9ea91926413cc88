use bson::oid::ObjectId;
use bson::{Bson, Document};
use std::marker::PhantomData;

use crate::errors::{DocketError, DocketResult, ErrorKind};
use crate::filter::Filter;
use crate::repository::{Entity, EntityId, KeyOf, KeyStrategy};

/// Maps entities to documents and back, converting the identifier field with
/// the entity's key strategy on the way.
pub(crate) struct RepositoryOperations<T: Entity> {
    entity_id: EntityId,
    _phantom: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for RepositoryOperations<T> {
    fn clone(&self) -> Self {
        RepositoryOperations {
            entity_id: self.entity_id.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entity> RepositoryOperations<T> {
    pub(crate) fn new() -> Self {
        RepositoryOperations {
            entity_id: T::entity_id(),
            _phantom: PhantomData,
        }
    }

    pub(crate) fn to_documents(&self, entities: &[T]) -> DocketResult<Vec<Document>> {
        let mut documents = Vec::with_capacity(entities.len());
        for entity in entities {
            documents.push(self.to_document(entity)?);
        }
        Ok(documents)
    }

    /// Serializes an entity, converting a set identifier to its stored
    /// representation.
    ///
    /// A missing `_id` is generated by the key strategy when it can, and
    /// otherwise left to the store, provided the key can hold the ObjectId the
    /// store assigns. A key that cannot is rejected with `InvalidId` before
    /// anything is written.
    pub(crate) fn to_document(&self, entity: &T) -> DocketResult<Document> {
        let mut document = bson::to_document(entity)?;
        let field_name = self.entity_id.field_name();

        match document.remove(field_name) {
            None | Some(Bson::Null) => {
                if self.entity_id.is_doc_id() {
                    match T::Id::generate_document_value() {
                        Some(generated) => {
                            document.insert(field_name, generated);
                        }
                        None => self.check_store_assignable()?,
                    }
                }
            }
            Some(value) => {
                let key: KeyOf<T> = bson::from_bson(value)?;
                let stored = T::Id::to_document_value(&key)?;
                document.insert(field_name, stored);
            }
        }
        Ok(document)
    }

    fn check_store_assignable(&self) -> DocketResult<()> {
        let assigned = Bson::ObjectId(ObjectId::new());
        if T::Id::from_document_value(&assigned).is_ok() {
            return Ok(());
        }
        log::error!(
            "{} has no id and its key cannot hold a store assigned ObjectId",
            std::any::type_name::<T>()
        );
        Err(DocketError::new(
            &format!(
                "{} must be given an id: its key cannot hold a store assigned ObjectId",
                std::any::type_name::<T>()
            ),
            ErrorKind::InvalidId,
        ))
    }

    /// Deserializes a stored document, converting the stored identifier back
    /// to the entity's key form first.
    pub(crate) fn to_entity(&self, mut document: Document) -> DocketResult<T> {
        let field_name = self.entity_id.field_name();
        if let Some(value) = document.get(field_name) {
            if !matches!(value, Bson::Null) {
                let key = T::Id::from_document_value(value)?;
                document.insert(field_name, bson::to_bson(&key)?);
            }
        }
        Ok(bson::from_document(document)?)
    }

    /// Reads the identifier of an entity, `None` when it is not set.
    pub(crate) fn key_of(&self, entity: &T) -> DocketResult<Option<KeyOf<T>>> {
        let document = bson::to_document(entity)?;
        match document.get(self.entity_id.field_name()) {
            None | Some(Bson::Null) => Ok(None),
            Some(value) => Ok(Some(bson::from_bson(value.clone())?)),
        }
    }

    pub(crate) fn create_id_filter(&self, key: &KeyOf<T>) -> DocketResult<Filter> {
        self.entity_id.create_id_filter::<T::Id>(key)
    }

    /// Writes a store-assigned `_id` back into an entity inserted without
    /// one. Entities identified by another field are returned unchanged.
    pub(crate) fn with_assigned_id(&self, entity: T, assigned: Option<&Bson>) -> DocketResult<T> {
        let assigned = match assigned {
            Some(id) if self.entity_id.is_doc_id() => id,
            _ => return Ok(entity),
        };

        let mut document = bson::to_document(&entity)?;
        let field_name = self.entity_id.field_name();
        match document.get(field_name) {
            None | Some(Bson::Null) => {
                let key = T::Id::from_document_value(assigned).map_err(|e| {
                    log::error!(
                        "Store assigned identifier {} cannot be represented by the key of {}",
                        assigned,
                        std::any::type_name::<T>()
                    );
                    DocketError::new_with_cause(
                        &format!(
                            "Store assigned identifier {} cannot be represented by the entity key",
                            assigned
                        ),
                        ErrorKind::InvalidId,
                        e,
                    )
                })?;
                document.insert(field_name, bson::to_bson(&key)?);
                Ok(bson::from_document(document)?)
            }
            Some(_) => Ok(entity),
        }
    }
}
