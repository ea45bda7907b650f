//! Wiring from configuration to a ready [`EstimateStore`].

use std::sync::Arc;

use tracing::{info, warn};

use crate::audit::{AuditLogger, JsonlAuditWriter};
use crate::config::{GlobalConfig, RemoteCredentials, StorageBackend};
use crate::persistence::{db, BlobStore, FileBlobStore, LocalMirror, MemoryBlobStore, SqliteBlobStore};
use crate::remote::RemoteSync;
use crate::store::EstimateStore;
use crate::Result;

/// Build the local mirror for the configured backend.
///
/// # Errors
///
/// Returns `AppError::Storage` if the backing database or directory cannot
/// be opened.
pub async fn build_mirror(config: &GlobalConfig) -> Result<LocalMirror> {
    let store: Arc<dyn BlobStore> = match config.storage.backend {
        StorageBackend::Sqlite => {
            let pool = db::connect(config.db_path()).await?;
            info!(path = %config.db_path().display(), "sqlite mirror opened");
            Arc::new(SqliteBlobStore::new(Arc::new(pool)))
        }
        StorageBackend::File => {
            info!(dir = %config.mirror_dir().display(), "file mirror opened");
            Arc::new(FileBlobStore::new(config.mirror_dir())?)
        }
        StorageBackend::Memory => {
            warn!("memory mirror selected; estimates will not outlive this process");
            Arc::new(MemoryBlobStore::new())
        }
    };
    Ok(LocalMirror::new(store, config.storage.key.clone()))
}

/// Build the remote sync from credentials, attaching the journal if enabled.
///
/// A journal directory that cannot be created disables journaling with a
/// warning rather than failing startup.
///
/// # Errors
///
/// Returns an error if credentials are present but unusable.
pub fn build_remote(
    config: &GlobalConfig,
    credentials: Option<&RemoteCredentials>,
) -> Result<RemoteSync> {
    let remote = RemoteSync::from_credentials(credentials, &config.remote.table)?;
    if !config.audit.enabled {
        return Ok(remote);
    }
    match JsonlAuditWriter::new(config.log_dir()) {
        Ok(writer) => {
            let journal: Arc<dyn AuditLogger> =
                Arc::new(writer.failures_only(config.audit.failures_only));
            Ok(remote.with_journal(journal))
        }
        Err(err) => {
            warn!(%err, "sync journal disabled");
            Ok(remote)
        }
    }
}

/// Run the full startup sequence: local load, then remote fetch.
///
/// # Errors
///
/// Returns an error if the mirror or remote client cannot be built. Sync
/// failures after that point are logged, not returned.
pub async fn open_store(
    config: &GlobalConfig,
    credentials: Option<&RemoteCredentials>,
) -> Result<EstimateStore> {
    let mirror = build_mirror(config).await?;
    let remote = build_remote(config, credentials)?;
    Ok(EstimateStore::open(mirror, remote, config.remote.seed_on_empty).await)
}
