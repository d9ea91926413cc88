use bson::Bson;

use super::{
    and, ComparisonFilter, ComparisonMode, EqualsFilter, ExistsFilter, Filter, InFilter,
    NotEqualsFilter, NotInFilter, RegexFilter,
};

/// Creates a fluent filter builder for the specified field name.
///
/// The name may be a dot-separated path into embedded documents
/// (`"address.city"`).
///
/// # Arguments
///
/// * `field_name` - The name of the field to filter on
///
/// # Returns
///
/// A `FluentFilter` builder for constructing field-specific filters
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

/// A fluent builder for constructing filters on a specific field.
///
/// Each method consumes the builder and returns a [`Filter`] that can be used
/// directly with repository queries or combined with other filters.
pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    /// Matches documents where the field equals the value.
    ///
    /// When the field holds an array, the filter matches if any element equals
    /// the value.
    #[inline]
    pub fn eq<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    /// Matches documents where the field does not equal the value,
    /// including documents where the field is missing.
    #[inline]
    pub fn ne<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(NotEqualsFilter::new(self.field_name, value.into()))
    }

    /// Matches documents where the field is greater than the value.
    #[inline]
    pub fn gt<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::Greater,
        ))
    }

    /// Matches documents where the field is greater than or equal to the value.
    #[inline]
    pub fn gte<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::GreaterEqual,
        ))
    }

    /// Matches documents where the field is less than the value.
    #[inline]
    pub fn lt<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::Lesser,
        ))
    }

    /// Matches documents where the field is less than or equal to the value.
    #[inline]
    pub fn lte<T: Into<Bson>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::LesserEqual,
        ))
    }

    /// Matches documents where the field lies within `[lower_bound, upper_bound]`.
    pub fn between<T: Into<Bson>>(self, lower_bound: T, upper_bound: T) -> Filter {
        let lower = Filter::new(ComparisonFilter::new(
            self.field_name.clone(),
            lower_bound.into(),
            ComparisonMode::GreaterEqual,
        ));
        let upper = Filter::new(ComparisonFilter::new(
            self.field_name,
            upper_bound.into(),
            ComparisonMode::LesserEqual,
        ));
        and(vec![lower, upper])
    }

    /// Matches documents where the field value is one of `values`.
    pub fn in_array<T: Into<Bson>>(self, values: Vec<T>) -> Filter {
        Filter::new(InFilter::new(
            self.field_name,
            values.into_iter().map(|v| v.into()).collect(),
        ))
    }

    /// Matches documents where the field value is none of `values`.
    pub fn not_in_array<T: Into<Bson>>(self, values: Vec<T>) -> Filter {
        Filter::new(NotInFilter::new(
            self.field_name,
            values.into_iter().map(|v| v.into()).collect(),
        ))
    }

    /// Matches documents where the field is present (`true`) or absent (`false`).
    #[inline]
    pub fn exists(self, present: bool) -> Filter {
        Filter::new(ExistsFilter::new(self.field_name, present))
    }

    /// Matches documents whose string field matches the regular expression.
    ///
    /// An invalid pattern is reported as a filter error when the filter is
    /// evaluated.
    #[inline]
    pub fn regex(self, pattern: &str) -> Filter {
        Filter::new(RegexFilter::new(self.field_name, pattern.to_string()))
    }
}
