use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com";
pub const DEFAULT_MIN_QUERY_LENGTH: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Shorter terms never reach the catalog
    #[serde(default = "default_min_query_length")]
    pub min_query_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides the platform data directory for the watched collection
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_base_url() -> String {
    DEFAULT_OMDB_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_min_query_length() -> usize {
    DEFAULT_MIN_QUERY_LENGTH
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: default_min_query_length(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, or defaults when none has been written yet
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.omdb.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("omdb.base_url cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("omdb.base_url must be an http(s) URL: {}", base_url));
        }
        if self.omdb.timeout_seconds == 0 {
            return Err(anyhow::anyhow!("omdb.timeout_seconds must be greater than zero"));
        }
        if self.search.min_query_length == 0 {
            return Err(anyhow::anyhow!("search.min_query_length must be at least 1"));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!("Invalid logging.level: {}", self.logging.level));
        }

        Ok(())
    }

    /// Directory holding the watched collection
    pub fn data_dir(&self, default_dir: &Path) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(|| default_dir.to_path_buf())
    }
}
