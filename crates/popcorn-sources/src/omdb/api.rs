use popcorn_models::{parse_imdb_rating, parse_runtime_minutes, MovieDetails, SearchResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::error::SourceError;

/// Shown when upstream says "False" without an explanation
pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "Movies not found";

#[derive(Debug, Deserialize)]
struct OmdbSearchItem {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "imdbID")]
    imdb_id: String,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchItem>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbMovie {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Error")]
    error: Option<String>,
    #[serde(rename = "imdbID", default)]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
    #[serde(rename = "Runtime", default)]
    runtime: String,
    #[serde(rename = "imdbRating", default)]
    imdb_rating: String,
    #[serde(rename = "Plot", default)]
    plot: String,
    #[serde(rename = "Released", default)]
    released: String,
    #[serde(rename = "Actors", default)]
    actors: String,
    #[serde(rename = "Director", default)]
    director: String,
    #[serde(rename = "Genre", default)]
    genre: String,
}

fn not_found(error: Option<String>) -> SourceError {
    SourceError::NotFound(
        error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_NOT_FOUND_MESSAGE.to_string()),
    )
}

fn is_false(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("false")
}

/// Decode a search payload
pub fn parse_search_response(body: &str) -> Result<Vec<SearchResult>, SourceError> {
    let response: OmdbSearchResponse = serde_json::from_str(body)?;

    if is_false(&response.response) {
        return Err(not_found(response.error));
    }

    Ok(response
        .search
        .into_iter()
        .map(|item| SearchResult {
            imdb_id: item.imdb_id,
            title: item.title,
            year: item.year,
            poster: item.poster,
        })
        .collect())
}

/// Decode a details payload. `requested_id` fills in the identifier if upstream omits it.
pub fn parse_details_response(body: &str, requested_id: &str) -> Result<MovieDetails, SourceError> {
    let movie: OmdbMovie = serde_json::from_str(body)?;

    if movie.response.as_deref().map(is_false).unwrap_or(false) {
        return Err(not_found(movie.error));
    }

    let imdb_id = if movie.imdb_id.is_empty() {
        requested_id.to_string()
    } else {
        movie.imdb_id
    };

    Ok(MovieDetails {
        imdb_id,
        title: movie.title,
        year: movie.year,
        poster: movie.poster,
        runtime: parse_runtime_minutes(&movie.runtime),
        imdb_rating: parse_imdb_rating(&movie.imdb_rating),
        plot: movie.plot,
        released: movie.released,
        actors: movie.actors,
        director: movie.director,
        genre: movie.genre,
    })
}

async fn get_body(client: &Client, base_url: &str, params: &[(&str, &str)]) -> Result<String, SourceError> {
    let response = client.get(base_url).query(params).send().await?;

    let status = response.status();
    if !status.is_success() {
        debug!(%status, "OMDb request failed");
        return Err(SourceError::Http(status));
    }

    Ok(response.text().await?)
}

/// `GET {base}?apikey={key}&s={query}`
pub async fn search(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<Vec<SearchResult>, SourceError> {
    let body = get_body(client, base_url, &[("apikey", api_key), ("s", query)]).await?;
    let results = parse_search_response(&body)?;
    debug!(query, count = results.len(), "OMDb search complete");
    Ok(results)
}

/// `GET {base}?apikey={key}&i={imdb_id}`
pub async fn get_details(
    client: &Client,
    base_url: &str,
    api_key: &str,
    imdb_id: &str,
) -> Result<MovieDetails, SourceError> {
    let body = get_body(client, base_url, &[("apikey", api_key), ("i", imdb_id)]).await?;
    parse_details_response(&body, imdb_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_BATMAN: &str = r#"{
        "Search": [
            {"Title": "Batman Begins", "Year": "2005", "imdbID": "tt0372784", "Type": "movie", "Poster": "https://m.media-amazon.com/images/batman-begins.jpg"},
            {"Title": "The Batman", "Year": "2022", "imdbID": "tt1877830", "Type": "movie", "Poster": "N/A"}
        ],
        "totalResults": "2",
        "Response": "True"
    }"#;

    const DETAILS_INTERSTELLAR: &str = r#"{
        "Title": "Interstellar",
        "Year": "2014",
        "Rated": "PG-13",
        "Released": "07 Nov 2014",
        "Runtime": "169 min",
        "Genre": "Adventure, Drama, Sci-Fi",
        "Director": "Christopher Nolan",
        "Actors": "Matthew McConaughey, Anne Hathaway, Jessica Chastain",
        "Plot": "A team of explorers travel through a wormhole in space.",
        "Poster": "https://m.media-amazon.com/images/interstellar.jpg",
        "imdbRating": "8.7",
        "imdbID": "tt0816692",
        "Type": "movie",
        "Response": "True"
    }"#;

    #[test]
    fn test_parse_search_response() {
        let results = parse_search_response(SEARCH_BATMAN).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].imdb_id, "tt0372784");
        assert_eq!(results[0].title, "Batman Begins");
        assert_eq!(results[1].year, "2022");
        assert_eq!(results[1].poster, "N/A");
    }

    #[test]
    fn test_parse_search_response_not_found() {
        let body = r#"{"Response": "False", "Error": "Movie not found!"}"#;
        match parse_search_response(body) {
            Err(SourceError::NotFound(message)) => assert_eq!(message, "Movie not found!"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_response_not_found_without_reason() {
        let body = r#"{"Response": "False"}"#;
        match parse_search_response(body) {
            Err(SourceError::NotFound(message)) => assert_eq!(message, DEFAULT_NOT_FOUND_MESSAGE),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_response_malformed() {
        assert!(matches!(parse_search_response("<html>"), Err(SourceError::Decode(_))));
    }

    #[test]
    fn test_parse_details_response() {
        let details = parse_details_response(DETAILS_INTERSTELLAR, "tt0816692").unwrap();
        assert_eq!(details.imdb_id, "tt0816692");
        assert_eq!(details.title, "Interstellar");
        assert_eq!(details.runtime, Some(169));
        assert_eq!(details.imdb_rating, Some(8.7));
        assert_eq!(details.director, "Christopher Nolan");
        assert_eq!(details.released, "07 Nov 2014");
    }

    #[test]
    fn test_parse_details_response_na_values() {
        let body = r#"{"Title": "Obscure Short", "Year": "1999", "Runtime": "N/A", "imdbRating": "N/A", "Response": "True"}"#;
        let details = parse_details_response(body, "tt9999999").unwrap();
        assert_eq!(details.imdb_id, "tt9999999");
        assert_eq!(details.runtime, None);
        assert_eq!(details.imdb_rating, None);
    }

    #[test]
    fn test_parse_details_response_incorrect_id() {
        let body = r#"{"Response": "False", "Error": "Incorrect IMDb ID."}"#;
        let err = parse_details_response(body, "bogus").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Incorrect IMDb ID.");
    }
}
