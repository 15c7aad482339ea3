use serde::{Deserialize, Serialize};

/// One row of a title search. The list is replaced wholesale on every
/// successful search and never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResult {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
}
