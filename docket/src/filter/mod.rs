//! Query filters for selecting documents from collections.
//!
//! Filters are built with the fluent API and composed with logical operators.
//! Every filter can evaluate itself against a [`bson::Document`] (used by the
//! in-memory store) and render itself to the MongoDB query language (used by
//! drivers that push the predicate to the server).
//!
//! # Creating Filters
//!
//! - `field("age").gt(30)` - comparison operators
//! - `field("name").eq("Alice")` - equality checks
//! - `field("address.city").eq("London")` - dot paths into embedded documents
//! - `all()` - match all documents
//! - `field("age").gt(30).and(field("status").eq("active"))` - logical AND
//!
//! # Examples
//!
//! ```rust,ignore
//! use docket::filter::{field, all, or};
//!
//! let adults = field("age").gte(18);
//! let named = field("name").regex("^A");
//! let either = or(vec![adults.clone(), named]);
//!
//! // {"$or": [{"age": {"$gte": 18}}, {"name": {"$regex": "^A"}}]}
//! let query = either.to_query()?;
//! ```
//!
//! # Supported Operators
//!
//! - **Equality**: `eq`, `ne`
//! - **Comparison**: `gt`, `gte`, `lt`, `lte`, `between`
//! - **Membership**: `in_array`, `not_in_array`
//! - **Presence**: `exists`
//! - **Pattern**: `regex`
//! - **Logical**: `and`, `or`, `not`

mod basic_filters;
mod filter;
mod fluent;
mod logical_filters;
mod pattern_filters;
mod range_filters;

pub(crate) use basic_filters::*;
pub use filter::*;
pub use fluent::*;
pub(crate) use logical_filters::*;
pub(crate) use pattern_filters::*;
pub(crate) use range_filters::*;
