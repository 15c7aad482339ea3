use crate::persisted::PersistedCell;
use crate::storage::Storage;
use popcorn_models::{summarize, WatchedEntry, WatchedSummary};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum WatchedError {
    #[error("'{0}' is already in the watched list")]
    AlreadyWatched(String),

    #[error("Rating {0} is outside 1-10")]
    InvalidRating(f64),
}

/// The user's watched list, persisted on every change
pub struct WatchedList {
    cell: PersistedCell<Vec<WatchedEntry>>,
}

impl WatchedList {
    pub fn load(key: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        Self {
            cell: PersistedCell::new(Vec::new(), key, storage),
        }
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        self.cell.get()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn contains(&self, imdb_id: &str) -> bool {
        self.entries().iter().any(|e| e.imdb_id == imdb_id)
    }

    /// The rating the user gave a title, if it is in the list
    pub fn user_rating(&self, imdb_id: &str) -> Option<f64> {
        self.entries()
            .iter()
            .find(|e| e.imdb_id == imdb_id)
            .map(|e| e.user_rating)
    }

    pub fn add(&mut self, entry: WatchedEntry) -> Result<(), WatchedError> {
        if !entry.has_valid_rating() {
            return Err(WatchedError::InvalidRating(entry.user_rating));
        }
        if self.contains(&entry.imdb_id) {
            return Err(WatchedError::AlreadyWatched(entry.imdb_id));
        }

        info!(imdb_id = %entry.imdb_id, title = %entry.title, "Adding to watched list");
        self.cell.update(|watched| {
            let mut next = watched.clone();
            next.push(entry);
            next
        });
        Ok(())
    }

    /// Removes every entry with this identifier; returns how many were removed
    pub fn remove(&mut self, imdb_id: &str) -> usize {
        let before = self.len();
        self.cell.update(|watched| {
            watched
                .iter()
                .filter(|e| e.imdb_id != imdb_id)
                .cloned()
                .collect()
        });
        let removed = before - self.len();
        if removed > 0 {
            info!(imdb_id, "Removed from watched list");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.cell.set(Vec::new());
    }

    pub fn summary(&self) -> WatchedSummary {
        summarize(self.entries())
    }
}
