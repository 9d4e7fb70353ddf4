use popcorn_models::{MovieDetail, SearchResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use crate::error::SourceError;

/// OMDb answers a search with no hits this way instead of an empty list
const NOT_FOUND: &str = "Movie not found!";

#[derive(Debug, Deserialize)]
struct OmdbSearchHit {
    #[serde(rename = "imdbID")]
    imdb_id: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Year", default)]
    year: String,
    #[serde(rename = "Poster", default)]
    poster: String,
}

#[derive(Debug, Deserialize)]
struct OmdbSearchResponse {
    #[serde(rename = "Response")]
    response: String,
    #[serde(rename = "Search", default)]
    search: Vec<OmdbSearchHit>,
    #[serde(rename = "Error")]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OmdbDetailResponse {
    #[serde(rename = "Response")]
    response: String,
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

fn is_success(response: &str) -> bool {
    response.eq_ignore_ascii_case("true")
}

/// Search the catalog by title
pub async fn search(
    client: &Client,
    base_url: &str,
    api_key: &str,
    term: &str,
) -> Result<Vec<SearchResult>, SourceError> {
    let body = get(client, base_url, &[("apikey", api_key), ("s", term)]).await?;
    parse_search_response(&body)
}

/// Fetch the full record for one id
pub async fn detail(
    client: &Client,
    base_url: &str,
    api_key: &str,
    id: &str,
) -> Result<MovieDetail, SourceError> {
    let body = get(client, base_url, &[("apikey", api_key), ("i", id), ("plot", "short")]).await?;
    parse_detail_response(&body, id)
}

async fn get(client: &Client, base_url: &str, query: &[(&str, &str)]) -> Result<String, SourceError> {
    let url = format!("{}/", base_url.trim_end_matches('/'));

    let response = client
        .get(&url)
        .query(query)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(SourceError::Status {
            status: status.as_u16(),
            body: error_text,
        });
    }

    Ok(response.text().await?)
}

pub(crate) fn parse_search_response(body: &str) -> Result<Vec<SearchResult>, SourceError> {
    let data: OmdbSearchResponse = serde_json::from_str(body)?;

    if !is_success(&data.response) {
        let message = data.error.unwrap_or_else(|| "Search failed".to_string());
        if message == NOT_FOUND {
            debug!("Catalog search returned no results");
            return Ok(Vec::new());
        }
        return Err(SourceError::Service(message));
    }

    let results = data
        .search
        .into_iter()
        .map(|hit| SearchResult {
            id: hit.imdb_id,
            title: hit.title,
            year: hit.year,
            poster_url: hit.poster,
        })
        .collect();

    Ok(results)
}

pub(crate) fn parse_detail_response(body: &str, requested_id: &str) -> Result<MovieDetail, SourceError> {
    let data: OmdbDetailResponse = serde_json::from_str(body)?;

    if !is_success(&data.response) {
        let message = data
            .error
            .unwrap_or_else(|| format!("No details available for {}", requested_id));
        return Err(SourceError::Service(message));
    }

    let id = if data.imdb_id.is_empty() {
        requested_id.to_string()
    } else {
        data.imdb_id
    };

    Ok(MovieDetail {
        id,
        title: data.title,
        year: data.year,
        poster_url: data.poster,
        runtime: data.runtime,
        imdb_rating: data.imdb_rating,
        plot: data.plot,
        released: data.released,
        actors: data.actors,
        director: data.director,
        genre: data.genre,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_hits() {
        let body = r#"{
            "Search": [
                {"Title": "Inception", "Year": "2010", "imdbID": "tt1375666", "Type": "movie", "Poster": "https://m.media-amazon.com/inception.jpg"},
                {"Title": "Inception: The Cobol Job", "Year": "2010", "imdbID": "tt5295894", "Type": "movie", "Poster": "N/A"}
            ],
            "totalResults": "2",
            "Response": "True"
        }"#;

        let results = parse_search_response(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "tt1375666");
        assert_eq!(results[0].title, "Inception");
        assert_eq!(results[0].poster_url, "https://m.media-amazon.com/inception.jpg");
        assert_eq!(results[1].poster_url, "N/A");
    }

    #[test]
    fn test_parse_search_not_found_is_empty() {
        let body = r#"{"Response":"False","Error":"Movie not found!"}"#;
        assert!(parse_search_response(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_search_service_error() {
        let body = r#"{"Response":"False","Error":"Invalid API key!"}"#;
        match parse_search_response(body) {
            Err(SourceError::Service(message)) => assert_eq!(message, "Invalid API key!"),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_malformed() {
        assert!(matches!(parse_search_response("<html>"), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn test_parse_detail() {
        let body = r#"{
            "Title": "Inception", "Year": "2010", "Rated": "PG-13", "Released": "16 Jul 2010",
            "Runtime": "148 min", "Genre": "Action, Adventure, Sci-Fi", "Director": "Christopher Nolan",
            "Actors": "Leonardo DiCaprio, Joseph Gordon-Levitt, Elliot Page",
            "Plot": "A thief who steals corporate secrets through dream-sharing technology...",
            "Poster": "https://m.media-amazon.com/inception.jpg", "imdbRating": "8.8",
            "imdbID": "tt1375666", "Type": "movie", "Response": "True"
        }"#;

        let detail = parse_detail_response(body, "tt1375666").unwrap();
        assert_eq!(detail.title, "Inception");
        assert_eq!(detail.runtime, "148 min");
        assert_eq!(detail.imdb_rating, "8.8");
        assert_eq!(detail.director, "Christopher Nolan");
        assert_eq!(detail.runtime_minutes(), Ok(148));
    }

    #[test]
    fn test_parse_detail_error() {
        let body = r#"{"Response":"False","Error":"Incorrect IMDb ID."}"#;
        assert!(matches!(
            parse_detail_response(body, "tt0"),
            Err(SourceError::Service(message)) if message == "Incorrect IMDb ID."
        ));
    }

    #[test]
    fn test_parse_detail_falls_back_to_requested_id() {
        let body = r#"{"Title":"Untitled","Response":"True"}"#;
        let detail = parse_detail_response(body, "tt9999999").unwrap();
        assert_eq!(detail.id, "tt9999999");
        assert_eq!(detail.runtime, "");
    }
}
