use async_trait::async_trait;
use popcorn_models::{MovieDetails, SearchResult};
use popcorn_sources::{MovieSource, SourceError};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Canned answer for one query or identifier
#[derive(Clone)]
pub enum Reply {
    Results(Vec<SearchResult>),
    Details(MovieDetails),
    NotFound,
    HttpError(u16),
}

/// In-memory `MovieSource` with per-key replies and optional gates that hold a
/// request until the test releases it.
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub search_calls: AtomicUsize,
    pub details_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, key: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(key.to_string(), reply);
    }

    /// Hold requests for `key` until the returned handle is notified
    pub fn gate(&self, key: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates.lock().unwrap().insert(key.to_string(), notify.clone());
        notify
    }

    async fn respond(&self, key: &str) -> Result<Reply, SourceError> {
        let gate = self.gates.lock().unwrap().get(key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self.replies.lock().unwrap().get(key).cloned();
        match reply {
            Some(Reply::NotFound) | None => Err(SourceError::NotFound("Movies not found".to_string())),
            Some(Reply::HttpError(code)) => Err(SourceError::Http(
                StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            )),
            Some(reply) => Ok(reply),
        }
    }
}

#[async_trait]
impl MovieSource for ScriptedSource {
    fn source_name(&self) -> &str {
        "scripted"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match self.respond(query).await? {
            Reply::Results(results) => Ok(results),
            _ => Err(SourceError::NotFound("Movies not found".to_string())),
        }
    }

    async fn details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError> {
        self.details_calls.fetch_add(1, Ordering::SeqCst);
        match self.respond(imdb_id).await? {
            Reply::Details(details) => Ok(details),
            _ => Err(SourceError::NotFound("Incorrect IMDb ID.".to_string())),
        }
    }
}

pub fn result(imdb_id: &str, title: &str) -> SearchResult {
    SearchResult {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2000".to_string(),
        poster: "N/A".to_string(),
    }
}

pub fn details(imdb_id: &str, title: &str) -> MovieDetails {
    MovieDetails {
        imdb_id: imdb_id.to_string(),
        title: title.to_string(),
        year: "2000".to_string(),
        poster: "N/A".to_string(),
        runtime: Some(100),
        imdb_rating: Some(7.0),
        plot: String::new(),
        released: String::new(),
        actors: String::new(),
        director: String::new(),
        genre: String::new(),
    }
}
