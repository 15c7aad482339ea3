use crate::error::SourceError;
use crate::omdb::api;
use crate::traits::MovieSource;
use anyhow::Result;
use async_trait::async_trait;
use popcorn_config::{resolve_api_key, Config, CredentialStore, PathManager};
use popcorn_models::{MovieDetails, SearchResult};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, info};

/// Create the shared reqwest client
pub fn create_omdb_client() -> Client {
    Client::builder()
        .user_agent(concat!("popcorn/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Clone)]
pub struct OmdbClient {
    client: Arc<Client>,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: Arc::new(create_omdb_client()),
            base_url: base_url.into(),
            api_key,
        }
    }

    /// Build a client from the config and credential files under `paths`
    pub fn from_paths(paths: &PathManager) -> Result<Self> {
        let config = Config::load_or_default(&paths.config_file())?;
        config.validate()?;

        let mut cred_store = CredentialStore::new(paths.credentials_file());
        cred_store.load()?;

        let api_key = resolve_api_key(&cred_store);
        if api_key.is_none() {
            info!("No OMDb API key configured; requests will fail until one is set");
        }

        Ok(Self::new(config.omdb.base_url, api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, SourceError> {
        self.api_key.as_deref().ok_or(SourceError::MissingApiKey)
    }
}

#[async_trait]
impl MovieSource for OmdbClient {
    fn source_name(&self) -> &str {
        "omdb"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SourceError> {
        debug!(query, "Searching OMDb");
        api::search(&self.client, &self.base_url, self.api_key()?, query).await
    }

    async fn details(&self, imdb_id: &str) -> Result<MovieDetails, SourceError> {
        debug!(imdb_id, "Fetching OMDb details");
        api::get_details(&self.client, &self.base_url, self.api_key()?, imdb_id).await
    }
}
