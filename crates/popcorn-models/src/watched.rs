use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::movie::MovieDetails;

pub const MIN_USER_RATING: f64 = 1.0;
pub const MAX_USER_RATING: f64 = 10.0;

/// A title the user has watched, with their personal rating.
///
/// At most one entry per `imdb_id` lives in the watched list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedEntry {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    /// Runtime in minutes (0 when unknown)
    pub runtime: u32,
    /// IMDb rating (0 when unknown)
    pub imdb_rating: f64,
    pub user_rating: f64,
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl WatchedEntry {
    pub fn from_details(details: &MovieDetails, user_rating: f64) -> Self {
        Self {
            imdb_id: details.imdb_id.clone(),
            title: details.title.clone(),
            year: details.year.clone(),
            poster: details.poster.clone(),
            runtime: details.runtime.unwrap_or(0),
            imdb_rating: details.imdb_rating.unwrap_or(0.0),
            user_rating,
            added_at: Utc::now(),
        }
    }

    pub fn has_valid_rating(&self) -> bool {
        (MIN_USER_RATING..=MAX_USER_RATING).contains(&self.user_rating)
    }
}
