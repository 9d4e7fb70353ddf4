use async_trait::async_trait;
use popcorn_models::{MovieDetail, SearchResult};
use crate::error::SourceError;

/// Read-only movie lookup service.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Search by free-text title. Zero hits is `Ok(vec![])`.
    async fn search(&self, term: &str) -> Result<Vec<SearchResult>, SourceError>;

    /// Full record for one catalog id.
    async fn detail(&self, id: &str) -> Result<MovieDetail, SourceError>;
}
