use anyhow::Result;
use std::path::{Path, PathBuf};

/// Base directory from `POPCORN_BASE_PATH`, if set
pub fn base_path_override() -> Option<PathBuf> {
    std::env::var("POPCORN_BASE_PATH")
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("popcorn");

        Ok(Self::with_base(base_dir))
    }

    /// Config files at the base level, data and logs in subdirectories
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.config_dir.join("credentials.toml")
    }

    pub fn session_log_file(&self) -> PathBuf {
        self.log_dir.join("popcorn.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        if let Some(base) = base_path_override() {
            return Self::with_base(base);
        }

        // Platform-specific paths (e.g., ~/.config/popcorn on Linux)
        Self::new().unwrap_or_else(|_| Self::with_base(std::env::temp_dir().join("popcorn")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_under_base() {
        let paths = PathManager::with_base("/srv/popcorn");
        assert_eq!(paths.config_file(), PathBuf::from("/srv/popcorn/config.toml"));
        assert_eq!(paths.credentials_file(), PathBuf::from("/srv/popcorn/credentials.toml"));
        assert_eq!(paths.data_dir(), Path::new("/srv/popcorn/data"));
        assert_eq!(paths.session_log_file(), PathBuf::from("/srv/popcorn/logs/popcorn.log"));
    }

    #[test]
    fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PathManager::with_base(dir.path().join("popcorn"));
        paths.ensure_directories().unwrap();
        assert!(paths.data_dir().is_dir());
        assert!(paths.log_dir().is_dir());
    }
}
