use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com/";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
}

/// OMDb endpoint settings. The API key is a credential and lives in
/// credentials.toml, not here.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Storage key the watched list is persisted under
    #[serde(default = "default_watched_key")]
    pub watched_key: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BrowseConfig {
    #[serde(default = "default_max_results_shown")]
    pub max_results_shown: usize,
}

fn default_base_url() -> String {
    DEFAULT_OMDB_BASE_URL.to_string()
}

fn default_watched_key() -> String {
    "watched".to_string()
}

fn default_max_results_shown() -> usize {
    10
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { watched_key: default_watched_key() }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self { max_results_shown: default_max_results_shown() }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, or defaults when it does not exist yet
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
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "omdb.base_url must be an http(s) URL, got '{}'",
                self.omdb.base_url
            ));
        }

        let key = &self.storage.watched_key;
        if key.is_empty() {
            return Err(anyhow::anyhow!("storage.watched_key cannot be empty"));
        }
        // The key doubles as a file stem in the storage directory
        if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(anyhow::anyhow!(
                "storage.watched_key may only contain letters, digits, '_' and '-', got '{}'",
                key
            ));
        }

        if self.browse.max_results_shown == 0 {
            return Err(anyhow::anyhow!("browse.max_results_shown must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            omdb: OmdbConfig {
                base_url: "http://localhost:8080/".to_string(),
            },
            storage: StorageConfig {
                watched_key: "my_watched".to_string(),
            },
            browse: BrowseConfig { max_results_shown: 5 },
        };

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded.omdb.base_url, "http://localhost:8080/");
        assert_eq!(loaded.storage.watched_key, "my_watched");
        assert_eq!(loaded.browse.max_results_shown, 5);
    }

    #[test]
    fn test_config_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.omdb.base_url, DEFAULT_OMDB_BASE_URL);
        assert_eq!(config.storage.watched_key, "watched");
        assert_eq!(config.browse.max_results_shown, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.storage.watched_key, "watched");
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.omdb.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.omdb.base_url = DEFAULT_OMDB_BASE_URL.to_string();
        config.storage.watched_key = "../escape".to_string();
        assert!(config.validate().is_err());

        config.storage.watched_key = String::new();
        assert!(config.validate().is_err());

        config.storage.watched_key = "watched".to_string();
        config.browse.max_results_shown = 0;
        assert!(config.validate().is_err());
    }
}
