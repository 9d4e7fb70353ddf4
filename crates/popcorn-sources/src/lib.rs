pub mod traits;
pub mod omdb;
pub mod error;

pub use traits::CatalogSource;
pub use omdb::OmdbClient;
pub use error::SourceError;
