//! Local mirror of the full estimate list.
//!
//! The whole list is serialized under one fixed key on every save. Reads
//! and writes never fail towards the caller: an unreadable or corrupt blob
//! loads as an empty list, and a failed write is logged while the
//! in-memory list stays authoritative.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::Estimate;

use super::blob_store::BlobStore;

/// Storage key used when none is configured.
pub const DEFAULT_STORAGE_KEY: &str = "emd_estimates_v1";

/// Durable client-side cache of the estimate collection.
#[derive(Clone)]
pub struct LocalMirror {
    store: Arc<dyn BlobStore>,
    key: String,
}

impl LocalMirror {
    /// Create a mirror writing under `key` in `store`.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Storage key this mirror writes under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the stored list; empty if absent, corrupt, or unreadable.
    pub async fn load(&self) -> Vec<Estimate> {
        let raw = match self.store.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = %self.key, "no local mirror blob yet");
                return Vec::new();
            }
            Err(err) => {
                warn!(key = %self.key, %err, "local mirror read failed; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Estimate>>(&raw) {
            Ok(estimates) => estimates,
            Err(err) => {
                warn!(key = %self.key, %err, "local mirror blob is corrupt; starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize and write the full list.
    ///
    /// Returns `true` when the write landed. Failures are logged only.
    pub async fn save(&self, estimates: &[Estimate]) -> bool {
        let raw = match serde_json::to_string(estimates) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %self.key, %err, "failed to serialize estimates for local mirror");
                return false;
            }
        };

        match self.store.put(&self.key, &raw).await {
            Ok(()) => {
                debug!(key = %self.key, count = estimates.len(), "local mirror saved");
                true
            }
            Err(err) => {
                warn!(key = %self.key, %err, "local mirror write failed");
                false
            }
        }
    }
}
