use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment variable that overrides the stored OMDb API key
pub const OMDB_API_KEY_ENV: &str = "OMDB_API_KEY";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn get_omdb_api_key(&self) -> Option<&String> {
        self.get("omdb_api_key").filter(|key| !key.is_empty())
    }

    /// Store the key and stamp when it was set
    pub fn set_omdb_api_key(&mut self, key: String) {
        self.set("omdb_api_key".to_string(), key);
        self.set("omdb_api_key_updated".to_string(), Utc::now().to_rfc3339());
    }

    /// Forget the stored key and its timestamp; returns whether a key was set
    pub fn clear_omdb_api_key(&mut self) -> bool {
        let had_key = self.get_omdb_api_key().is_some();
        self.remove("omdb_api_key");
        self.remove("omdb_api_key_updated");
        had_key
    }

    pub fn get_omdb_api_key_updated(&self) -> Option<DateTime<Utc>> {
        self.get("omdb_api_key_updated")
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Where the active API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment,
    CredentialsFile,
}

impl ApiKeySource {
    pub fn label(&self) -> &'static str {
        match self {
            ApiKeySource::Environment => OMDB_API_KEY_ENV,
            ApiKeySource::CredentialsFile => "credentials file",
        }
    }
}

fn resolve_from(env_key: Option<String>, store: &CredentialStore) -> Option<(String, ApiKeySource)> {
    env_key
        .filter(|key| !key.trim().is_empty())
        .map(|key| (key, ApiKeySource::Environment))
        .or_else(|| {
            store
                .get_omdb_api_key()
                .map(|key| (key.clone(), ApiKeySource::CredentialsFile))
        })
}

/// The API key to use for this run and its origin: `OMDB_API_KEY` first,
/// then the credential store.
pub fn resolve_api_key_with_source(store: &CredentialStore) -> Option<(String, ApiKeySource)> {
    resolve_from(std::env::var(OMDB_API_KEY_ENV).ok(), store)
}

pub fn resolve_api_key(store: &CredentialStore) -> Option<String> {
    resolve_api_key_with_source(store).map(|(key, _)| key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_omdb_api_key("abc123".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_omdb_api_key(), Some(&"abc123".to_string()));

        let updated = loaded_store.get_omdb_api_key_updated().unwrap();
        assert!((Utc::now() - updated).num_seconds().abs() < 5);
    }

    #[test]
    fn test_empty_api_key_is_unset() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/popcorn-test-credentials.toml"));
        store.set("omdb_api_key".to_string(), String::new());
        assert_eq!(store.get_omdb_api_key(), None);
    }

    #[test]
    fn test_credential_store_remove() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/test"));
        store.set("key1".to_string(), "value1".to_string());
        store.set("key2".to_string(), "value2".to_string());

        assert_eq!(store.get("key1"), Some(&"value1".to_string()));
        store.remove("key1");
        assert_eq!(store.get("key1"), None);
        assert_eq!(store.get("key2"), Some(&"value2".to_string()));
    }

    #[test]
    fn test_clear_omdb_api_key() {
        let file = NamedTempFile::new().unwrap();
        let mut store = CredentialStore::new(file.path().to_path_buf());
        store.set_omdb_api_key("abc123".to_string());
        store.set("other".to_string(), "kept".to_string());

        assert!(store.clear_omdb_api_key());
        assert_eq!(store.get_omdb_api_key(), None);
        assert_eq!(store.get_omdb_api_key_updated(), None);
        assert_eq!(store.get("other"), Some(&"kept".to_string()));
        assert!(!store.clear_omdb_api_key());

        store.save().unwrap();
        let mut reloaded = CredentialStore::new(file.path().to_path_buf());
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_omdb_api_key(), None);
    }

    #[test]
    fn test_environment_key_wins_over_stored_key() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/popcorn-test-credentials.toml"));
        store.set_omdb_api_key("stored".to_string());

        assert_eq!(
            resolve_from(Some("fromenv".to_string()), &store),
            Some(("fromenv".to_string(), ApiKeySource::Environment))
        );
        assert_eq!(
            resolve_from(None, &store),
            Some(("stored".to_string(), ApiKeySource::CredentialsFile))
        );
        // A blank variable does not shadow the stored key
        assert_eq!(
            resolve_from(Some("  ".to_string()), &store).map(|(_, source)| source),
            Some(ApiKeySource::CredentialsFile)
        );
        assert_eq!(resolve_from(None, &CredentialStore::new(PathBuf::from("/tmp/none"))), None);
        assert_eq!(ApiKeySource::Environment.label(), OMDB_API_KEY_ENV);
    }
}
