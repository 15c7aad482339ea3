use serde::{Deserialize, Serialize};
use crate::watched::WatchedEntry;

/// Aggregate statistics over the watched list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub mean_imdb_rating: f64,
    pub mean_user_rating: f64,
    pub mean_runtime: f64,
}

/// Average where every term is divided by the length before summing.
/// An empty slice averages to 0.
fn mean(values: impl Iterator<Item = f64>, len: usize) -> f64 {
    if len == 0 {
        return 0.0;
    }
    values.fold(0.0, |acc, value| acc + value / len as f64)
}

pub fn summarize(entries: &[WatchedEntry]) -> WatchedSummary {
    let len = entries.len();
    WatchedSummary {
        count: len,
        mean_imdb_rating: mean(entries.iter().map(|e| e.imdb_rating), len),
        mean_user_rating: mean(entries.iter().map(|e| e.user_rating), len),
        mean_runtime: mean(entries.iter().map(|e| e.runtime as f64), len),
    }
}
