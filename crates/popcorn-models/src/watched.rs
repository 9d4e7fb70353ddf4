use serde::{Deserialize, Serialize};
use crate::rating::UserRating;

/// A movie the user has watched and rated.
///
/// Records are created once when the rating is committed and never edited
/// afterwards; the collection only ever appends or removes whole records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedRecord {
    pub id: String,
    pub title: String,
    pub year: String,
    pub poster_url: String,
    pub imdb_rating: Option<f64>, // null when the catalog had no rating
    pub runtime_minutes: u32,
    pub user_rating: UserRating,
    pub rating_revision_count: u32, // How many distinct ratings were picked before committing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let record = WatchedRecord {
            id: "tt1375666".to_string(),
            title: "Inception".to_string(),
            year: "2010".to_string(),
            poster_url: "https://example.com/inception.jpg".to_string(),
            imdb_rating: Some(8.8),
            runtime_minutes: 148,
            user_rating: UserRating::new(9).unwrap(),
            rating_revision_count: 1,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["posterUrl"], "https://example.com/inception.jpg");
        assert_eq!(value["imdbRating"], 8.8);
        assert_eq!(value["runtimeMinutes"], 148);
        assert_eq!(value["userRating"], 9);
        assert_eq!(value["ratingRevisionCount"], 1);
    }

    #[test]
    fn test_missing_imdb_rating_is_null() {
        let json = r#"{"id":"tt0000001","title":"Obscure","year":"1999","posterUrl":"N/A",
            "imdbRating":null,"runtimeMinutes":80,"userRating":4,"ratingRevisionCount":2}"#;
        let record: WatchedRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.imdb_rating, None);
        assert_eq!(record.user_rating.value(), 4);
    }
}
