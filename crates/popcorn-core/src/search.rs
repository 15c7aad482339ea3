use crate::flight::SingleFlight;
use popcorn_models::SearchResult;
use popcorn_sources::{MovieSource, SourceError};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

/// Observable state of a [`SearchFetcher`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// The query as last observed (untrimmed)
    pub query: String,
    pub results: Vec<SearchResult>,
    pub is_loading: bool,
    pub error: Option<String>,
}

type ResetCallback = Box<dyn Fn() + Send + Sync>;

/// Keeps a result list in sync with a changing text query.
///
/// Every [`observe`](Self::observe) supersedes the previous request: it is
/// cancelled, and only the newest request may write `results`/`error`.
/// Cancellation is silent and never shows up in `error`.
pub struct SearchFetcher {
    source: Arc<dyn MovieSource>,
    flight: SingleFlight<SearchState>,
    on_query_change: Option<ResetCallback>,
}

impl SearchFetcher {
    pub fn new(source: Arc<dyn MovieSource>) -> Self {
        Self {
            source,
            flight: SingleFlight::new("search", SearchState::default()),
            on_query_change: None,
        }
    }

    /// Called first on every query change (the browse view closes details with it)
    pub fn with_reset_callback(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_query_change = Some(Box::new(callback));
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.flight.subscribe()
    }

    pub fn state(&self) -> SearchState {
        self.flight.snapshot()
    }

    /// React to a new query. Must be called from within a tokio runtime.
    pub fn observe(&self, query: &str) {
        if let Some(reset) = &self.on_query_change {
            reset();
        }

        let raw = query.to_string();
        let trimmed = query.trim().to_string();

        if trimmed.is_empty() {
            self.flight.supersede(move |state| {
                state.query = raw;
                state.results.clear();
                state.is_loading = false;
                state.error = None;
            });
            return;
        }

        let source = Arc::clone(&self.source);
        let request = async move { source.search(&trimmed).await };

        self.flight.launch(
            move |state| {
                state.query = raw;
                state.is_loading = true;
                state.error = None;
            },
            request,
            |state, outcome: Result<Vec<SearchResult>, SourceError>| {
                match outcome {
                    Ok(results) => {
                        state.results = results;
                        state.error = None;
                    }
                    Err(e) => {
                        warn!(query = %state.query, error = %e, "Search failed");
                        state.error = Some(e.to_string());
                    }
                }
                state.is_loading = false;
            },
        );
    }

    /// Wait for the current request (if any) to settle and return the state
    pub async fn wait_idle(&self) -> SearchState {
        self.flight.wait_until(|state| !state.is_loading).await
    }

    /// Abandon the in-flight request, e.g. when the owning view goes away
    pub fn cancel(&self) {
        self.flight.supersede(|state| state.is_loading = false);
    }
}
