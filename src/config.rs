//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::persistence::DEFAULT_STORAGE_KEY;
use crate::{AppError, Result};

/// Keychain service holding remote credentials.
pub const KEYRING_SERVICE: &str = "estimate-desk";
/// Environment variable fallback for the remote endpoint URL.
pub const REMOTE_URL_ENV: &str = "ESTIMATE_DESK_REMOTE_URL";
/// Environment variable fallback for the remote access token.
pub const REMOTE_TOKEN_ENV: &str = "ESTIMATE_DESK_REMOTE_TOKEN";

/// Backend for the local mirror's blob store.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// `kv_blob` table in `<data_dir>/estimates.db`.
    #[default]
    Sqlite,
    /// One JSON file per key under `<data_dir>/mirror`.
    File,
    /// Process memory only.
    Memory,
}

/// Local mirror settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// Blob store backend.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Fixed key the full list is stored under.
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            key: default_storage_key(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.into()
}

/// Remote table settings. Credentials are loaded separately.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct RemoteConfig {
    /// Remote table name.
    #[serde(default = "default_table")]
    pub table: String,
    /// Seed an empty remote table from the local list at startup.
    #[serde(default)]
    pub seed_on_empty: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            table: default_table(),
            seed_on_empty: false,
        }
    }
}

fn default_table() -> String {
    "estimates".into()
}

/// Sync journal settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct AuditConfig {
    /// Whether sync events are journaled to `<data_dir>/logs`.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Journal only failures, skipping applied fetches and seeds.
    #[serde(default)]
    pub failures_only: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            failures_only: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Directory holding the database, mirror files, and journal.
    pub data_dir: PathBuf,
    /// Local mirror settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Remote table settings.
    #[serde(default)]
    pub remote: RemoteConfig,
    /// Sync journal settings.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl GlobalConfig {
    /// Default configuration rooted at `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `data_dir` is empty.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let config = Self {
            data_dir: data_dir.into(),
            storage: StorageConfig::default(),
            remote: RemoteConfig::default(),
            audit: AuditConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Path of the `SQLite` database used by the `sqlite` backend.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("estimates.db")
    }

    /// Directory used by the `file` backend.
    #[must_use]
    pub fn mirror_dir(&self) -> PathBuf {
        self.data_dir.join("mirror")
    }

    /// Directory the sync journal is written to.
    #[must_use]
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(AppError::Config("data_dir must not be empty".into()));
        }

        if self.storage.key.trim().is_empty() {
            return Err(AppError::Config("storage.key must not be empty".into()));
        }

        if !is_identifier(&self.remote.table) {
            return Err(AppError::Config(format!(
                "remote.table must be an identifier: {:?}",
                self.remote.table
            )));
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Remote endpoint and access token, read once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    /// Endpoint base URL without a trailing slash.
    pub url: String,
    /// Access token.
    pub token: String,
}

impl std::fmt::Debug for RemoteCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCredentials")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl RemoteCredentials {
    /// Build credentials from raw values; `None` if either is blank.
    #[must_use]
    pub fn new(url: &str, token: &str) -> Option<Self> {
        let url = url.trim().trim_end_matches('/');
        let token = token.trim();
        if url.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self {
            url: url.to_owned(),
            token: token.to_owned(),
        })
    }

    /// Load credentials from the OS keychain with env-var fallback.
    ///
    /// Returns `None` when either value is missing; that is the supported
    /// unconfigured mode, not an error.
    pub async fn load() -> Option<Self> {
        let url = load_credential("remote_url", REMOTE_URL_ENV).await?;
        let token = load_credential("remote_token", REMOTE_TOKEN_ENV).await?;
        Self::new(&url, &token)
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Option<String> {
    let key = keyring_key.to_owned();

    // keyring is synchronous I/O.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new(KEYRING_SERVICE, &key).and_then(|entry| entry.get_password())
    })
    .await;

    match keychain_result {
        Ok(Ok(value)) if !value.trim().is_empty() => return Some(value),
        Ok(Ok(_)) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Ok(Err(keyring::Error::NoEntry)) => {
            debug!(key = keyring_key, "no keychain entry, trying env var");
        }
        Ok(Err(err)) => {
            debug!(key = keyring_key, ?err, "keychain lookup failed, trying env var");
        }
        Err(err) => {
            warn!(key = keyring_key, %err, "keychain task panicked, trying env var");
        }
    }

    env::var(env_key).ok().filter(|value| !value.trim().is_empty())
}
