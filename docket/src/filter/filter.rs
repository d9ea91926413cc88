use bson::{Bson, Document};
use std::any::Any;
use std::fmt::Display;
use std::ops::Deref;
use std::sync::Arc;

use crate::errors::{DocketError, DocketResult, ErrorKind};

use super::{AllFilter, AndFilter, NotFilter, OrFilter};

/// Trait for implementing custom filters.
///
/// A `FilterProvider` defines how a predicate is evaluated against a document
/// and how it is expressed in the store's query language. Built-in filters
/// implement both; a custom provider plugged into [`Filter::new`] must do the
/// same so it works with every store backend.
pub trait FilterProvider: Any + Send + Sync + Display {
    /// Applies the filter to a document and returns whether it matches.
    ///
    /// # Arguments
    ///
    /// * `entry` - The document to evaluate
    ///
    /// # Returns
    ///
    /// `Ok(true)` if the document matches the filter, `Ok(false)` otherwise
    fn apply(&self, entry: &Document) -> DocketResult<bool>;

    /// Renders the filter as a MongoDB query document.
    ///
    /// # Returns
    ///
    /// The query document, e.g. `{"age": {"$gt": 25}}`
    fn to_query(&self) -> DocketResult<Document>;

    /// Checks if this filter operates on a specific field.
    #[inline]
    fn has_field(&self) -> bool {
        false
    }

    /// Gets the field name this filter operates on.
    fn get_field_name(&self) -> DocketResult<String> {
        log::error!("Filter {} does not have field name", self);
        Err(DocketError::new(
            "Filter does not have field name",
            ErrorKind::FilterError,
        ))
    }

    /// Gets the sub-filters of a logical filter.
    fn logical_filters(&self) -> DocketResult<Vec<Filter>> {
        Err(DocketError::new(
            "Filter is not a logical filter",
            ErrorKind::FilterError,
        ))
    }

    fn as_any(&self) -> &dyn Any;
}

/// A query filter for selecting documents from a collection.
///
/// `Filter` wraps a [`FilterProvider`] behind an `Arc`, so cloning is cheap and
/// clones share the same predicate.
///
/// # Filter Composition
///
/// - `and(other)` - Combines with another filter using logical AND
/// - `or(other)` - Combines with another filter using logical OR
/// - `not()` - Negates the filter using logical NOT
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    /// Creates a new filter from a filter provider implementation.
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter { inner: Arc::new(inner) }
    }

    /// Combines this filter with another using logical AND.
    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    /// Combines this filter with another using logical OR.
    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }

    /// Negates this filter using logical NOT.
    pub fn not(&self) -> Self {
        Filter::new(NotFilter::new(self.clone()))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter{}", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Creates a filter that matches all documents.
pub fn all() -> Filter {
    Filter::new(AllFilter {})
}

/// Combines multiple filters using logical AND.
///
/// An empty list matches every document.
pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

/// Combines multiple filters using logical OR.
///
/// An empty list matches no document.
pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

/// Negates a filter using logical NOT.
pub fn not(filter: Filter) -> Filter {
    Filter::new(NotFilter::new(filter))
}

/// Builds `{field: {operator: value}}`.
pub(crate) fn operator_query<V: Into<Bson>>(field_name: &str, operator: &str, value: V) -> Document {
    let mut condition = Document::new();
    condition.insert(operator, value.into());
    let mut query = Document::new();
    query.insert(field_name, condition);
    query
}

pub(crate) fn is_all_filter(filter: &Filter) -> bool {
    filter.as_any().is::<AllFilter>()
}

/// Combines two optional filters with AND, dropping `all()` operands.
pub(crate) fn merge_filters(current: Option<Filter>, next: Filter) -> Filter {
    match current {
        None => next,
        Some(current) if is_all_filter(&current) => next,
        Some(current) if is_all_filter(&next) => current,
        Some(current) => current.and(next),
    }
}
