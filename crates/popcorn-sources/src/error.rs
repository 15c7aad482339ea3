use reqwest::StatusCode;

/// Failure of a single request against a movie source.
///
/// The `Display` text is what the user sees in the error slot of a fetcher.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Upstream answered with a non-success status
    #[error("Failed to fetch data (HTTP {0})")]
    Http(StatusCode),

    /// The request never produced a response (DNS, connection refused, TLS)
    #[error("Failed to fetch data: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Upstream explicitly reported no match
    #[error("{0}")]
    NotFound(String),

    #[error("OMDb API key is not configured (set OMDB_API_KEY or run `popcorn config set-api-key`)")]
    MissingApiKey,
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_distinguish_not_found_from_fetch_failure() {
        let http = SourceError::Http(StatusCode::INTERNAL_SERVER_ERROR);
        let not_found = SourceError::NotFound("Movies not found".to_string());

        assert!(http.to_string().starts_with("Failed to fetch data"));
        assert_eq!(not_found.to_string(), "Movies not found");
        assert!(not_found.is_not_found());
        assert!(!http.is_not_found());
    }
}
