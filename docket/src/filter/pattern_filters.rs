use regex::Regex;
use std::{any::Any, fmt::Display};

use bson::{Bson, Document};

use crate::{
    common::{get_field, OP_REGEX},
    errors::{DocketError, DocketResult, ErrorKind},
};

use super::{operator_query, FilterProvider};

/// A filter that matches string fields against a regular expression.
///
/// The pattern is compiled once at construction. An invalid pattern is logged
/// and kept as-is, so that evaluating the filter reports a filter error
/// instead of silently matching nothing.
pub(crate) struct RegexFilter {
    field_name: String,
    source: String,
    pattern: Option<Regex>,
}

impl RegexFilter {
    pub(crate) fn new(field_name: String, source: String) -> Self {
        let pattern = match Regex::new(&source) {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::error!("Invalid regex pattern '{}': {}", source, e);
                None
            }
        };

        RegexFilter {
            field_name,
            source,
            pattern,
        }
    }
}

impl Display for RegexFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} regex {})", self.field_name, self.source)
    }
}

impl FilterProvider for RegexFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        let pattern = match &self.pattern {
            Some(pattern) => pattern,
            None => {
                log::error!("Invalid regex pattern for filter {}", self);
                return Err(DocketError::new(
                    &format!("Invalid regex pattern: {}", self.source),
                    ErrorKind::FilterError,
                ));
            }
        };

        match get_field(entry, &self.field_name) {
            Some(Bson::String(value)) => Ok(pattern.is_match(value)),
            Some(Bson::Array(items)) => Ok(items.iter().any(|item| match item {
                Bson::String(value) => pattern.is_match(value),
                _ => false,
            })),
            _ => Ok(false),
        }
    }

    fn to_query(&self) -> DocketResult<Document> {
        Ok(operator_query(&self.field_name, OP_REGEX, self.source.clone()))
    }

    fn has_field(&self) -> bool {
        true
    }

    fn get_field_name(&self) -> DocketResult<String> {
        Ok(self.field_name.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
