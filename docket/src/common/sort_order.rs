/// Specifies the direction for sorting documents.
///
/// Used with [`FindOptions`](crate::store::FindOptions) and
/// [`Query::sort`](crate::repository::Query::sort):
/// ```text
/// let adults = repository.query().filter(field("age").gte(18)).sort("name", SortOrder::Ascending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Sort in ascending order (smallest to largest, A-Z, oldest to newest)
    Ascending,
    /// Sort in descending order (largest to smallest, Z-A, newest to oldest)
    Descending,
}

impl SortOrder {
    /// The direction as the store's sort specification value (`1` / `-1`).
    pub fn as_direction(&self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}
