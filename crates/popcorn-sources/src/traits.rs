use async_trait::async_trait;
use popcorn_models::{MovieDetails, SearchResult};
use crate::error::SourceError;

/// A read-only movie database.
///
/// Fetchers hold an `Arc<dyn MovieSource>` so tests can swap in a double.
#[async_trait]
pub trait MovieSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Titles matching `query`. An explicit "no matches" answer is
    /// `SourceError::NotFound`, never an empty `Ok`.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError>;

    /// Full details for one identifier
    async fn details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError>;
}
