use crate::common::SortOrder;

/// Options shaping the result of a find round-trip.
///
/// Combined with a filter, `FindOptions` describes one query: sort keys are
/// applied in the order they were added, then `skip`, then `limit`.
/// A projection restricts the returned fields.
///
/// # Examples
///
/// ```rust,ignore
/// let options = order_by("name", SortOrder::Ascending).skip(10).limit(20);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindOptions {
    pub(crate) sort_by: Vec<(String, SortOrder)>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
    pub(crate) projection: Option<Vec<String>>,
}

/// Creates `FindOptions` with sorting by a field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

/// Creates `FindOptions` that skips a number of results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

/// Creates `FindOptions` that limits the number of results.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

impl FindOptions {
    /// Creates a new `FindOptions` with default settings.
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    /// Appends a sort key. Earlier keys take precedence.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> FindOptions {
        self.sort_by.push((field_name.to_string(), sort_order));
        self
    }

    /// Restricts returned documents to the given fields (plus `_id`).
    pub fn projection(mut self, fields: Vec<String>) -> FindOptions {
        self.projection = Some(fields);
        self
    }

    pub fn sort_fields(&self) -> &[(String, SortOrder)] {
        &self.sort_by
    }

    pub fn skip_count(&self) -> Option<u64> {
        self.skip
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }

    pub fn projected_fields(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }
}
