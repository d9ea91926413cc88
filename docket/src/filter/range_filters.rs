use std::{any::Any, cmp::Ordering, fmt::Display};

use bson::{Bson, Document};

use crate::{
    common::{compare_values, get_field, OP_GT, OP_GTE, OP_LT, OP_LTE},
    errors::DocketResult,
};

use super::{operator_query, FilterProvider};

/// The relational operator a [`ComparisonFilter`] applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ComparisonMode {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl ComparisonMode {
    fn operator(&self) -> &'static str {
        match self {
            ComparisonMode::Greater => OP_GT,
            ComparisonMode::GreaterEqual => OP_GTE,
            ComparisonMode::Lesser => OP_LT,
            ComparisonMode::LesserEqual => OP_LTE,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            ComparisonMode::Greater => ">",
            ComparisonMode::GreaterEqual => ">=",
            ComparisonMode::Lesser => "<",
            ComparisonMode::LesserEqual => "<=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonMode::Greater => ordering == Ordering::Greater,
            ComparisonMode::GreaterEqual => ordering != Ordering::Less,
            ComparisonMode::Lesser => ordering == Ordering::Less,
            ComparisonMode::LesserEqual => ordering != Ordering::Greater,
        }
    }
}

/// A filter comparing a field against a value with a relational operator.
///
/// Only values of the same type class are compared: numbers with numbers
/// (across integer and floating point widths), strings with strings, dates with
/// dates. A document whose field is missing or holds an incomparable value does
/// not match. Array fields match when any element satisfies the comparison.
pub(crate) struct ComparisonFilter {
    field_name: String,
    field_value: Bson,
    mode: ComparisonMode,
}

impl ComparisonFilter {
    pub(crate) fn new(field_name: String, field_value: Bson, mode: ComparisonMode) -> Self {
        ComparisonFilter {
            field_name,
            field_value,
            mode,
        }
    }

    fn matches(&self, actual: &Bson) -> bool {
        compare_values(actual, &self.field_value)
            .map(|ordering| self.mode.accepts(ordering))
            .unwrap_or(false)
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} {} {})",
            self.field_name,
            self.mode.symbol(),
            self.field_value
        )
    }
}

impl FilterProvider for ComparisonFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        match get_field(entry, &self.field_name) {
            None => Ok(false),
            Some(Bson::Array(items)) => Ok(items.iter().any(|item| self.matches(item))),
            Some(actual) => Ok(self.matches(actual)),
        }
    }

    fn to_query(&self) -> DocketResult<Document> {
        Ok(operator_query(
            &self.field_name,
            self.mode.operator(),
            self.field_value.clone(),
        ))
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
