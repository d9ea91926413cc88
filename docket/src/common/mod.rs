//! Shared constants and BSON value helpers used by filters and stores.

mod constants;
mod sort_order;
mod value;

pub use constants::*;
pub use sort_order::*;
pub use value::*;
