use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::DOC_ID;
use crate::errors::DocketResult;
use crate::filter::{field, Filter};
use crate::repository::KeyStrategy;

/// A record type stored by a [`Repository`].
///
/// An entity serializes to a document with serde and carries exactly one
/// identifier field, usually an `Option<_>` so that `None` marks an entity
/// that has not been persisted yet. Implement it with `#[derive(Entity)]`
/// from `docket_derive`, or by hand:
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Person {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<String>,
///     name: String,
/// }
///
/// impl Entity for Person {
///     type Id = NativeObjectId;
///
///     fn entity_name() -> String {
///         "people".to_string()
///     }
/// }
/// ```
///
/// [`Repository`]: crate::repository::Repository
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// How keys of this entity are converted to stored identifiers.
    type Id: KeyStrategy;

    /// Default collection name for this entity.
    fn entity_name() -> String;

    /// The document field holding the identifier.
    fn entity_id() -> EntityId {
        EntityId::new(DOC_ID)
    }
}

/// Caller-facing key type of an entity.
pub type KeyOf<T> = <<T as Entity>::Id as KeyStrategy>::Key;

/// Names the document field that identifies an entity.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct EntityId {
    field_name: String,
}

impl EntityId {
    pub fn new(field_name: &str) -> Self {
        EntityId {
            field_name: field_name.to_string(),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Whether the identifier lives in the store's primary key field `_id`.
    pub fn is_doc_id(&self) -> bool {
        self.field_name == DOC_ID
    }

    /// Builds the equality filter selecting the entity with `key`.
    ///
    /// The key is converted with the strategy `S` first, so an unconvertible
    /// key fails here, before any store round-trip.
    pub fn create_id_filter<S: KeyStrategy>(&self, key: &S::Key) -> DocketResult<Filter> {
        let value = S::to_document_value(key)?;
        Ok(field(&self.field_name).eq(value))
    }
}
