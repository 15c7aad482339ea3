use serde::{Deserialize, Serialize};

/// Full details for a single title, fetched fresh for every selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub imdb_id: String,
    pub title: String,
    pub year: String,
    pub poster: String,
    /// Runtime in minutes, `None` when upstream reports "N/A"
    pub runtime: Option<u32>,
    /// IMDb rating (0-10), `None` when upstream reports "N/A"
    pub imdb_rating: Option<f64>,
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

impl MovieDetails {
    /// Runtime as shown to the user ("142 min" or "N/A")
    pub fn runtime_label(&self) -> String {
        match self.runtime {
            Some(minutes) => format!("{} min", minutes),
            None => "N/A".to_string(),
        }
    }
}

/// Parse an upstream runtime string such as "142 min".
///
/// Only the leading token is considered, so "90 min (director's cut)" still
/// yields 90.
pub fn parse_runtime_minutes(raw: &str) -> Option<u32> {
    raw.split_whitespace().next()?.parse().ok()
}

/// Parse an upstream rating string such as "8.1".
pub fn parse_imdb_rating(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|rating| rating.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runtime_minutes() {
        assert_eq!(parse_runtime_minutes("142 min"), Some(142));
        assert_eq!(parse_runtime_minutes("  90 min"), Some(90));
        assert_eq!(parse_runtime_minutes("N/A"), None);
        assert_eq!(parse_runtime_minutes(""), None);
    }

    #[test]
    fn test_parse_imdb_rating() {
        assert_eq!(parse_imdb_rating("8.1"), Some(8.1));
        assert_eq!(parse_imdb_rating("10"), Some(10.0));
        assert_eq!(parse_imdb_rating("N/A"), None);
        assert_eq!(parse_imdb_rating("NaN"), None);
    }

    #[test]
    fn test_runtime_label() {
        let mut details = MovieDetails {
            imdb_id: "tt0372784".to_string(),
            title: "Batman Begins".to_string(),
            year: "2005".to_string(),
            poster: "N/A".to_string(),
            runtime: Some(140),
            imdb_rating: Some(8.2),
            plot: String::new(),
            released: "15 Jun 2005".to_string(),
            actors: String::new(),
            director: "Christopher Nolan".to_string(),
            genre: "Action, Crime, Drama".to_string(),
        };
        assert_eq!(details.runtime_label(), "140 min");

        details.runtime = None;
        assert_eq!(details.runtime_label(), "N/A");
    }
}
