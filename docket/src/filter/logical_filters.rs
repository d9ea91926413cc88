use std::{any::Any, fmt::Display};

use bson::{Bson, Document};

use crate::{
    common::{OP_AND, OP_NOR, OP_OR},
    errors::DocketResult,
};

use super::{Filter, FilterProvider};

fn render_all(filters: &[Filter]) -> DocketResult<Vec<Bson>> {
    filters
        .iter()
        .map(|filter| filter.to_query().map(Bson::Document))
        .collect()
}

fn join(filters: &[Filter], separator: &str) -> String {
    filters
        .iter()
        .map(|filter| filter.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}

/// A filter that applies logical AND operation on multiple filters.
///
/// Evaluation short-circuits on the first filter that does not match. An
/// empty conjunction matches every document.
pub(crate) struct AndFilter {
    filters: Vec<Filter>,
}

impl AndFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        AndFilter { filters }
    }
}

impl Display for AndFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", join(&self.filters, " && "))
    }
}

impl FilterProvider for AndFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        for filter in &self.filters {
            if !filter.apply(entry)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn to_query(&self) -> DocketResult<Document> {
        if self.filters.is_empty() {
            return Ok(Document::new());
        }
        let mut query = Document::new();
        query.insert(OP_AND, render_all(&self.filters)?);
        Ok(query)
    }

    fn logical_filters(&self) -> DocketResult<Vec<Filter>> {
        Ok(self.filters.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that applies logical OR operation on multiple filters.
///
/// Evaluation short-circuits on the first filter that matches.
pub(crate) struct OrFilter {
    filters: Vec<Filter>,
}

impl OrFilter {
    pub(crate) fn new(filters: Vec<Filter>) -> Self {
        OrFilter { filters }
    }
}

impl Display for OrFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", join(&self.filters, " || "))
    }
}

impl FilterProvider for OrFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        for filter in &self.filters {
            if filter.apply(entry)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn to_query(&self) -> DocketResult<Document> {
        let mut query = Document::new();
        if self.filters.is_empty() {
            // $or rejects an empty array; $nor of an always-true clause never matches
            query.insert(OP_NOR, vec![Bson::Document(Document::new())]);
            return Ok(query);
        }
        query.insert(OP_OR, render_all(&self.filters)?);
        Ok(query)
    }

    fn logical_filters(&self) -> DocketResult<Vec<Filter>> {
        Ok(self.filters.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A filter that negates another filter.
pub(crate) struct NotFilter {
    filter: Filter,
}

impl NotFilter {
    pub(crate) fn new(filter: Filter) -> Self {
        NotFilter { filter }
    }
}

impl Display for NotFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "!({})", self.filter)
    }
}

impl FilterProvider for NotFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        Ok(!self.filter.apply(entry)?)
    }

    fn to_query(&self) -> DocketResult<Document> {
        let mut query = Document::new();
        query.insert(OP_NOR, vec![Bson::Document(self.filter.to_query()?)]);
        Ok(query)
    }

    fn logical_filters(&self) -> DocketResult<Vec<Filter>> {
        Ok(vec![self.filter.clone()])
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
