use crate::flight::SingleFlight;
use popcorn_models::MovieDetails;
use popcorn_sources::{MovieSource, SourceError};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Title shown when no details are loaded
pub const DEFAULT_TITLE: &str = "usePopcorn";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailsState {
    /// The identifier being shown (or loaded)
    pub imdb_id: Option<String>,
    pub details: Option<MovieDetails>,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Header title for the current details state
pub fn display_title(state: &DetailsState) -> String {
    match &state.details {
        Some(details) if !details.title.is_empty() => format!("movie | {}", details.title),
        _ => DEFAULT_TITLE.to_string(),
    }
}

/// Loads full details for the selected identifier.
///
/// Uses the same supersede-and-cancel discipline as the search fetcher, so
/// rapid re-selection can never show details for an earlier pick.
pub struct DetailsFetcher {
    source: Arc<dyn MovieSource>,
    flight: SingleFlight<DetailsState>,
}

impl DetailsFetcher {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self {
            source,
            flight: SingleFlight::new("details", DetailsState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailsState> {
        self.flight.subscribe()
    }

    pub fn state(&self) -> DetailsState {
        self.flight.snapshot()
    }

    /// React to a selection change; `None` clears details without a request.
    /// Must be called from within a tokio runtime.
    pub fn observe(&self, imdb_id: Option<&str>) {
        let Some(imdb_id) = imdb_id else {
            self.flight.supersede(|state| *state = DetailsState::default());
            return;
        };

        let id = imdb_id.to_string();
        let source = Arc::clone(&self.source);
        let request_id = id.clone();
        let request = async move { source.details(&request_id).await };

        self.flight.launch(
            move |state| {
                state.imdb_id = Some(id);
                state.details = None;
                state.is_loading = true;
                state.error = None;
            },
            request,
            |state, outcome: Result<MovieDetails, SourceError>| {
                match outcome {
                    Ok(details) => state.details = Some(details),
                    Err(e) => {
                        warn!(imdb_id = ?state.imdb_id, error = %e, "Details fetch failed");
                        state.error = Some(e.to_string());
                    }
                }
                state.is_loading = false;
            },
        );
    }

    pub async fn wait_idle(&self) -> DetailsState {
        self.flight.wait_until(|state| !state.is_loading).await
    }

    pub fn cancel(&self) {
        self.flight.supersede(|state| state.is_loading = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{details, Reply, ScriptedSource};
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn test_loads_details_for_selection() {
        let source = ScriptedSource::new();
        source.reply("tt0816692", Reply::Details(details("tt0816692", "Interstellar")));

        let fetcher = DetailsFetcher::new(source.clone());
        fetcher.observe(Some("tt0816692"));
        assert!(fetcher.state().is_loading);
        assert_eq!(display_title(&fetcher.state()), DEFAULT_TITLE);

        let state = fetcher.wait_idle().await;
        assert_eq!(state.imdb_id.as_deref(), Some("tt0816692"));
        assert_eq!(state.details.as_ref().unwrap().title, "Interstellar");
        assert_eq!(display_title(&state), "movie | Interstellar");
    }

    #[tokio::test]
    async fn test_none_clears_without_request() {
        let source = ScriptedSource::new();
        source.reply("tt1", Reply::Details(details("tt1", "One")));

        let fetcher = DetailsFetcher::new(source.clone());
        fetcher.observe(Some("tt1"));
        fetcher.wait_idle().await;

        fetcher.observe(None);
        let state = fetcher.state();
        assert_eq!(state, DetailsState::default());
        assert_eq!(display_title(&state), DEFAULT_TITLE);
        assert_eq!(source.details_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rapid_reselection_shows_latest() {
        let source = ScriptedSource::new();
        source.reply("tt1", Reply::Details(details("tt1", "First")));
        source.reply("tt2", Reply::Details(details("tt2", "Second")));
        let first_gate = source.gate("tt1");

        let fetcher = DetailsFetcher::new(source.clone());
        fetcher.observe(Some("tt1"));
        fetcher.observe(Some("tt2"));

        let state = fetcher.wait_idle().await;
        assert_eq!(state.details.as_ref().unwrap().title, "Second");

        first_gate.notify_one();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(fetcher.state().details.unwrap().title, "Second");
    }

    #[tokio::test]
    async fn test_unknown_id_surfaces_not_found() {
        let source = ScriptedSource::new();

        let fetcher = DetailsFetcher::new(source.clone());
        fetcher.observe(Some("bogus"));
        let state = fetcher.wait_idle().await;

        assert!(state.details.is_none());
        assert_eq!(state.error.as_deref(), Some("Movies not found"));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_cancelled_request_leaves_no_error() {
        let source = ScriptedSource::new();
        source.reply("tt1", Reply::Details(details("tt1", "One")));
        let gate = source.gate("tt1");

        let fetcher = DetailsFetcher::new(source.clone());
        fetcher.observe(Some("tt1"));
        fetcher.cancel();

        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let state = fetcher.state();
        assert!(!state.is_loading);
        assert!(state.details.is_none());
        assert_eq!(state.error, None);
    }
}
