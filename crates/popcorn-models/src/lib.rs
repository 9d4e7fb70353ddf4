pub mod error;
pub mod media;
pub mod rating;
pub mod watched;

pub use error::{ParseError, RatingError};
pub use media::{MovieDetail, SearchResult};
pub use rating::UserRating;
pub use watched::WatchedRecord;
