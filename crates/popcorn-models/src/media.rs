use serde::{Deserialize, Serialize};
use crate::error::ParseError;

/// One hit from a catalog search. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String, // Catalog key, e.g. "tt1375666"
    pub title: String,
    pub year: String,
    pub poster_url: String,
}

/// Full metadata for a single movie, fetched when it is selected.
///
/// `runtime` and `imdb_rating` are kept as the catalog reports them ("148 min",
/// "8.8", or "N/A"); use [`MovieDetail::runtime_minutes`] and
/// [`MovieDetail::imdb_rating_value`] for the numeric values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieDetail {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub runtime: String,
    pub imdb_rating: String,
    pub plot: String,
    pub released: String,
    pub actors: String,
    pub director: String,
    pub genre: String,
}

impl MovieDetail {
    /// Leading numeric token of the runtime text.
    pub fn runtime_minutes(&self) -> Result<u32, ParseError> {
        parse_runtime_minutes(&self.runtime)
    }

    /// IMDb rating as a number, `None` when the catalog has no rating.
    pub fn imdb_rating_value(&self) -> Option<f64> {
        self.imdb_rating
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }

    pub fn display_title(&self) -> String {
        format!("Movie | {}", self.title)
    }
}

/// Parse "148 min" into 148.
pub fn parse_runtime_minutes(text: &str) -> Result<u32, ParseError> {
    text.split_whitespace()
        .next()
        .and_then(|token| token.parse::<u32>().ok())
        .ok_or_else(|| ParseError { text: text.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(runtime: &str, imdb_rating: &str) -> MovieDetail {
        MovieDetail {
            id: "tt1375666".to_string(),
            title: "Inception".to_string(),
            year: "2010".to_string(),
            poster_url: String::new(),
            runtime: runtime.to_string(),
            imdb_rating: imdb_rating.to_string(),
            plot: String::new(),
            released: "16 Jul 2010".to_string(),
            actors: String::new(),
            director: "Christopher Nolan".to_string(),
            genre: "Action, Adventure, Sci-Fi".to_string(),
        }
    }

    #[test]
    fn test_runtime_minutes_takes_leading_token() {
        assert_eq!(detail("148 min", "8.8").runtime_minutes(), Ok(148));
        assert_eq!(parse_runtime_minutes("  90"), Ok(90));
    }

    #[test]
    fn test_runtime_minutes_rejects_missing_number() {
        let err = detail("N/A", "8.8").runtime_minutes().unwrap_err();
        assert_eq!(err.text, "N/A");
        assert!(parse_runtime_minutes("").is_err());
        assert!(parse_runtime_minutes("min 148").is_err());
    }

    #[test]
    fn test_imdb_rating_value() {
        assert_eq!(detail("148 min", "8.8").imdb_rating_value(), Some(8.8));
        assert_eq!(detail("148 min", "N/A").imdb_rating_value(), None);
    }

    #[test]
    fn test_display_title() {
        assert_eq!(detail("148 min", "8.8").display_title(), "Movie | Inception");
    }
}
