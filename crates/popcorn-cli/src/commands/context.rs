use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_config::{Config, PathManager};
use popcorn_core::{FileStorage, Storage, WatchedList};
use popcorn_sources::{MovieSource, OmdbClient};
use std::sync::Arc;
use tracing::debug;

/// Everything a command needs: paths, validated config, storage and the movie source
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub source: Arc<dyn MovieSource>,
    has_api_key: bool,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        paths
            .ensure_directories()
            .map_err(|e| eyre!("Failed to create directories under {}: {}", paths.config_dir().display(), e))?;

        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid config in {}: {}", config_file.display(), e))?;

        let client = OmdbClient::from_paths(&paths).map_err(|e| eyre!("Failed to set up OMDb client: {}", e))?;
        let has_api_key = client.has_api_key();
        debug!(base_url = client.base_url(), has_api_key, "OMDb client ready");

        Ok(Self {
            storage: Arc::new(FileStorage::from_paths(&paths)),
            source: Arc::new(client),
            paths,
            config,
            has_api_key,
        })
    }

    pub fn watched(&self) -> WatchedList {
        WatchedList::load(self.config.storage.watched_key.clone(), Arc::clone(&self.storage))
    }

    pub fn has_api_key(&self) -> bool {
        self.has_api_key
    }

    /// Fail early with setup instructions instead of letting every request fail
    pub fn require_api_key(&self) -> Result<()> {
        if self.has_api_key {
            return Ok(());
        }
        Err(eyre!(
            "No OMDb API key configured. Run 'popcorn config set-api-key' or set OMDB_API_KEY"
        ))
    }
}
