pub mod movie;
pub mod search_result;
pub mod summary;
pub mod watched;

pub use movie::{parse_imdb_rating, parse_runtime_minutes, MovieDetails};
pub use search_result::SearchResult;
pub use summary::{summarize, WatchedSummary};
pub use watched::{WatchedEntry, MAX_USER_RATING, MIN_USER_RATING};
