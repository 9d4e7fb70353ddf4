pub mod catalog;
pub mod config;
pub mod prompts;
pub mod session;
pub mod ui;
pub mod watched;

use color_eyre::Result;
use popcorn_config::{Config, CredentialStore, PathManager};
use popcorn_core::{App, AppOptions, CollectionStore, FileKeyValueStore, MemoryKeyHost, MemoryTitle};
use popcorn_sources::{OmdbClient, SourceError};
use std::path::PathBuf;
use std::sync::Arc;

/// Validated configuration together with the paths it came from.
pub struct Workspace {
    pub paths: PathManager,
    pub config: Config,
}

impl Workspace {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
        Ok(Self { paths, config })
    }

    pub fn data_dir(&self) -> PathBuf {
        self.config.data_dir(self.paths.data_dir())
    }

    pub fn collection(&self) -> CollectionStore<FileKeyValueStore> {
        CollectionStore::new(FileKeyValueStore::new(self.data_dir()))
    }

    pub fn credentials(&self) -> Result<CredentialStore> {
        let credentials_file = self.paths.credentials_file();
        let mut cred_store = CredentialStore::new(credentials_file.clone());
        cred_store
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
        Ok(cred_store)
    }

    pub fn catalog(&self) -> Result<OmdbClient> {
        let cred_store = self.credentials()?;
        OmdbClient::from_config(&self.config, &cred_store).map_err(|e| match e {
            SourceError::MissingApiKey => color_eyre::eyre::eyre!(
                "No OMDb API key configured. Run 'popcorn config set-key' or set OMDB_API_KEY."
            ),
            other => color_eyre::eyre::eyre!("Failed to create OMDb client: {}", other),
        })
    }

    pub fn app(&self, title: Arc<MemoryTitle>, keys: Arc<MemoryKeyHost>) -> Result<App<FileKeyValueStore>> {
        let catalog = Arc::new(self.catalog()?);
        Ok(App::new(
            catalog,
            FileKeyValueStore::new(self.data_dir()),
            title,
            keys,
            AppOptions {
                min_query_length: self.config.search.min_query_length,
            },
        ))
    }

    /// App for one-shot commands, with no terminal title or keyboard attached
    pub fn headless_app(&self) -> Result<App<FileKeyValueStore>> {
        self.app(Arc::new(MemoryTitle::new()), Arc::new(MemoryKeyHost::new()))
    }
}
