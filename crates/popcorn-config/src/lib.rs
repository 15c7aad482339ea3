pub mod config;
pub mod credentials;
pub mod paths;

pub use config::{BrowseConfig, Config, OmdbConfig, StorageConfig, DEFAULT_OMDB_BASE_URL};
pub use credentials::{resolve_api_key, resolve_api_key_with_source, ApiKeySource, CredentialStore, OMDB_API_KEY_ENV};
pub use paths::{PathManager, container_base_path};
