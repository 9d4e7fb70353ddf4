use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::CatalogSource;
use async_trait::async_trait;
use popcorn_config::{Config, CredentialStore};
use popcorn_models::{MovieDetail, SearchResult};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
}

impl OmdbClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, SourceError> {
        if api_key.trim().is_empty() {
            return Err(SourceError::MissingApiKey);
        }

        let client = Client::builder()
            .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
            api_key,
        })
    }

    /// Build a client from the loaded config and stored API key
    pub fn from_config(config: &Config, credentials: &CredentialStore) -> Result<Self, SourceError> {
        let api_key = credentials
            .resolve_omdb_api_key()
            .ok_or(SourceError::MissingApiKey)?;
        let client = Self::new(
            api_key,
            config.omdb.base_url.clone(),
            Duration::from_secs(config.omdb.timeout_seconds),
        )?;
        info!("Using OMDb catalog at {}", client.base_url);
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CatalogSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, term: &str) -> Result<Vec<SearchResult>, SourceError> {
        debug!(term, "Searching OMDb");
        let results = api::search(&self.client, &self.base_url, &self.api_key, term).await?;
        debug!(term, count = results.len(), "OMDb search finished");
        Ok(results)
    }

    async fn detail(&self, id: &str) -> Result<MovieDetail, SourceError> {
        debug!(id, "Fetching OMDb detail");
        api::detail(&self.client, &self.base_url, &self.api_key, id).await
    }
}
