use std::{any::Any, fmt::Display};

use bson::{Bson, Document};

use crate::{
    common::{get_field, values_equal, OP_EQ, OP_EXISTS, OP_IN, OP_NE, OP_NIN},
    errors::DocketResult,
};

use super::{operator_query, FilterProvider};

/// A filter that matches all documents.
///
/// Used as the default filter when no condition is specified; renders to the
/// empty query document.
pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> DocketResult<bool> {
        Ok(true)
    }

    fn to_query(&self) -> DocketResult<Document> {
        Ok(Document::new())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// Field value equality with store query semantics: an array field matches
/// when it equals the value or holds an element equal to it, and a missing
/// field matches `null`.
pub(crate) fn field_matches(entry: &Document, field_name: &str, expected: &Bson) -> bool {
    match get_field(entry, field_name) {
        None => matches!(expected, Bson::Null),
        Some(actual) => {
            if values_equal(actual, expected) {
                return true;
            }
            match actual {
                Bson::Array(items) => items.iter().any(|item| values_equal(item, expected)),
                _ => false,
            }
        }
    }
}

/// A filter that matches documents where a field equals a specific value.
///
/// This is the filter identifier lookups are built from.
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Bson,
}

impl EqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Bson) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        Ok(field_matches(entry, &self.field_name, &self.field_value))
    }

    fn to_query(&self) -> DocketResult<Document> {
        Ok(operator_query(&self.field_name, OP_EQ, self.field_value.clone()))
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

/// A filter that matches documents where a field differs from a value.
pub(crate) struct NotEqualsFilter {
    field_name: String,
    field_value: Bson,
}

impl NotEqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Bson) -> Self {
        NotEqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for NotEqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} != {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for NotEqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        Ok(!field_matches(entry, &self.field_name, &self.field_value))
    }

    fn to_query(&self) -> DocketResult<Document> {
        Ok(operator_query(&self.field_name, OP_NE, self.field_value.clone()))
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

/// A filter that matches documents where a field holds one of several values.
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Bson>,
}

impl InFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Bson>) -> Self {
        InFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} in {})",
            self.field_name,
            Bson::Array(self.field_values.clone())
        )
    }
}

impl FilterProvider for InFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        Ok(self
            .field_values
            .iter()
            .any(|value| field_matches(entry, &self.field_name, value)))
    }

    fn to_query(&self) -> DocketResult<Document> {
        Ok(operator_query(&self.field_name, OP_IN, self.field_values.clone()))
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

/// A filter that matches documents where a field holds none of several values.
pub(crate) struct NotInFilter {
    field_name: String,
    field_values: Vec<Bson>,
}

impl NotInFilter {
    pub(crate) fn new(field_name: String, field_values: Vec<Bson>) -> Self {
        NotInFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for NotInFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({} not in {})",
            self.field_name,
            Bson::Array(self.field_values.clone())
        )
    }
}

impl FilterProvider for NotInFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        Ok(!self
            .field_values
            .iter()
            .any(|value| field_matches(entry, &self.field_name, value)))
    }

    fn to_query(&self) -> DocketResult<Document> {
        Ok(operator_query(&self.field_name, OP_NIN, self.field_values.clone()))
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

/// A filter on the presence of a field.
pub(crate) struct ExistsFilter {
    field_name: String,
    present: bool,
}

impl ExistsFilter {
    pub(crate) fn new(field_name: String, present: bool) -> Self {
        ExistsFilter {
            field_name,
            present,
        }
    }
}

impl Display for ExistsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.present {
            write!(f, "({} exists)", self.field_name)
        } else {
            write!(f, "({} not exists)", self.field_name)
        }
    }
}

impl FilterProvider for ExistsFilter {
    fn apply(&self, entry: &Document) -> DocketResult<bool> {
        Ok(get_field(entry, &self.field_name).is_some() == self.present)
    }

    fn to_query(&self) -> DocketResult<Document> {
        Ok(operator_query(&self.field_name, OP_EXISTS, self.present))
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
