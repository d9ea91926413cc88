use bson::Bson;

/// Outcome of a write round-trip, as reported by the store.
///
/// Counts and identifiers are carried verbatim; nothing is recomputed on the
/// client side.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteResult {
    inserted_ids: Vec<Bson>,
    matched_count: u64,
    modified_count: u64,
    deleted_count: u64,
    upserted_id: Option<Bson>,
}

impl WriteResult {
    /// Result of an insert, with the identifiers in insertion order.
    pub fn inserted(inserted_ids: Vec<Bson>) -> Self {
        WriteResult {
            inserted_ids,
            ..Default::default()
        }
    }

    /// Result of a replace, optionally carrying the id of an upserted document.
    pub fn replaced(matched_count: u64, modified_count: u64, upserted_id: Option<Bson>) -> Self {
        WriteResult {
            matched_count,
            modified_count,
            upserted_id,
            ..Default::default()
        }
    }

    /// Result of a delete.
    pub fn deleted(deleted_count: u64) -> Self {
        WriteResult {
            deleted_count,
            ..Default::default()
        }
    }

    pub fn inserted_ids(&self) -> &[Bson] {
        &self.inserted_ids
    }

    pub fn matched_count(&self) -> u64 {
        self.matched_count
    }

    pub fn modified_count(&self) -> u64 {
        self.modified_count
    }

    pub fn deleted_count(&self) -> u64 {
        self.deleted_count
    }

    pub fn upserted_id(&self) -> Option<&Bson> {
        self.upserted_id.as_ref()
    }
}
