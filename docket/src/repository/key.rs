use bson::oid::ObjectId;
use bson::Bson;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::marker::PhantomData;

use crate::errors::{DocketError, DocketResult, ErrorKind};

/// Converts caller-facing keys to the identifier values stored in documents.
///
/// The strategy is chosen per entity type through [`Entity::Id`], so the
/// conversion is fixed at compile time.
///
/// [`Entity::Id`]: crate::repository::Entity::Id
pub trait KeyStrategy: Send + Sync + 'static {
    /// The key type callers use to address entities.
    type Key: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static;

    /// Converts a key to the value stored in the identifier field.
    ///
    /// Fails with `InvalidId` when the key cannot be represented.
    fn to_document_value(key: &Self::Key) -> DocketResult<Bson>;

    /// Converts a stored identifier value back to a key.
    fn from_document_value(value: &Bson) -> DocketResult<Self::Key>;

    /// A fresh identifier for an entity inserted without one, or `None` to
    /// let the store assign it.
    fn generate_document_value() -> Option<Bson> {
        None
    }
}

/// Keys stored as they serialize: strings as strings, integers as integers.
///
/// The stored value and the key always have the same representation. An
/// entity whose key can hold a string gets a fresh ObjectId hex string as its
/// id when it is inserted without one, stored as a string. A stored value the
/// key cannot hold, such as an ObjectId read into a `String` key, is rejected
/// with `InvalidId`.
pub struct OpaqueKey<K>(PhantomData<fn() -> K>);

impl<K> KeyStrategy for OpaqueKey<K>
where
    K: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static,
{
    type Key = K;

    fn to_document_value(key: &K) -> DocketResult<Bson> {
        bson::to_bson(key).map_err(|e| {
            log::error!("Failed to convert key {:?} to an identifier: {}", key, e);
            DocketError::new_with_cause(
                &format!("Cannot convert key {:?} to an identifier: {}", key, e),
                ErrorKind::InvalidId,
                e,
            )
        })
    }

    fn from_document_value(value: &Bson) -> DocketResult<K> {
        bson::from_bson::<K>(value.clone()).map_err(|e| {
            log::error!("Cannot read identifier {} as key: {}", value, e);
            DocketError::new_with_cause(
                &format!("Cannot read identifier {} as key: {}", value, e),
                ErrorKind::InvalidId,
                e,
            )
        })
    }

    fn generate_document_value() -> Option<Bson> {
        let value = Bson::String(ObjectId::new().to_hex());
        match bson::from_bson::<K>(value.clone()) {
            Ok(_) => Some(value),
            Err(_) => None,
        }
    }
}

/// The store-native object identifier.
///
/// Callers hold the identifier as its 24-character hex string; documents hold
/// a BSON ObjectId. A string that is not a valid ObjectId is rejected with
/// `InvalidId` before any store round-trip.
pub struct NativeObjectId;

impl NativeObjectId {
    /// Parses a hex string into an ObjectId.
    pub fn parse(key: &str) -> DocketResult<ObjectId> {
        ObjectId::parse_str(key).map_err(|e| {
            log::error!("'{}' is not a valid object id: {}", key, e);
            DocketError::new_with_cause(
                &format!("'{}' is not a valid object id", key),
                ErrorKind::InvalidId,
                e,
            )
        })
    }
}

impl KeyStrategy for NativeObjectId {
    type Key = String;

    fn to_document_value(key: &String) -> DocketResult<Bson> {
        Ok(Bson::ObjectId(NativeObjectId::parse(key)?))
    }

    fn from_document_value(value: &Bson) -> DocketResult<String> {
        match value {
            Bson::ObjectId(oid) => Ok(oid.to_hex()),
            Bson::String(hex) => Ok(NativeObjectId::parse(hex)?.to_hex()),
            other => {
                log::error!("Stored identifier {} is not an object id", other);
                Err(DocketError::new(
                    &format!("Stored identifier {} is not an object id", other),
                    ErrorKind::InvalidId,
                ))
            }
        }
    }
}
