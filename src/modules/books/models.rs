use serde::{Deserialize, Serialize};

/// Identifier of a book record.
pub type BookId = i64;

/// Title reported for ids that have no record.
pub const NOT_FOUND_TITLE: &str = "Not Found";

/// Body returned by the single-book endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Book identifier taken from the path
    pub id: BookId,
    /// Stored title, or [`NOT_FOUND_TITLE`] on lookups of absent ids
    pub title: String,
}

/// Name of the query parameter carrying the title on create and update.
pub const TITLE_PARAM: &str = "title";

/// Title from raw query pairs. Repeated `title` parameters resolve to the
/// last one.
pub fn last_title(pairs: Vec<(String, String)>) -> Option<String> {
    pairs
        .into_iter()
        .rev()
        .find_map(|(key, value)| (key == TITLE_PARAM).then_some(value))
}
