//! Key-value blob stores backing the local mirror.
//!
//! A [`BlobStore`] holds opaque string values under string keys. The local
//! mirror only ever uses one key, but the stores do not assume that.

use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tempfile::NamedTempFile;

use crate::{AppError, Result};

use super::db::Database;

/// Durable string storage addressed by key.
///
/// Implementations must be [`Send`] and [`Sync`] so the mirror can be
/// shared across async task boundaries via [`Arc`].
pub trait BlobStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the backing store cannot be read.
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the write does not complete.
    fn put<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// Blob store backed by the `kv_blob` table.
#[derive(Clone)]
pub struct SqliteBlobStore {
    db: Arc<Database>,
}

impl SqliteBlobStore {
    /// Create a store over an already-bootstrapped pool.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl BlobStore for SqliteBlobStore {
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>> {
        Box::pin(async move {
            let value: Option<String> =
                sqlx::query_scalar("SELECT value FROM kv_blob WHERE key = ?1")
                    .bind(key)
                    .fetch_optional(self.db.as_ref())
                    .await?;
            Ok(value)
        })
    }

    fn put<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let updated_at = Utc::now().to_rfc3339();
            sqlx::query(
                "INSERT INTO kv_blob (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )
            .bind(key)
            .bind(value)
            .bind(&updated_at)
            .execute(self.db.as_ref())
            .await?;
            Ok(())
        })
    }
}

/// Blob store keeping one `<key>.json` file per key in a directory.
///
/// Writes go to a temporary file in the same directory and are renamed into
/// place, so a reader never observes a partially written blob.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the directory cannot be created.
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir).map_err(|err| {
            AppError::Storage(format!(
                "failed to create blob directory {}: {err}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(AppError::Storage(format!("invalid blob key: {key}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            match tokio::fs::read_to_string(&path).await {
                Ok(raw) => Ok(Some(raw)),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(AppError::Storage(format!(
                    "failed to read {}: {err}",
                    path.display()
                ))),
            }
        })
    }

    fn put<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let path = self.path_for(key)?;
            let dir = self.dir.clone();
            let content = value.to_owned();
            tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &content))
                .await
                .map_err(|err| AppError::Storage(format!("blob write task panicked: {err}")))?
        })
    }
}

fn write_atomic(dir: &std::path::Path, path: &std::path::Path, content: &str) -> Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|err| AppError::Storage(format!("failed to create temporary file: {err}")))?;
    tmp.write_all(content.as_bytes())
        .map_err(|err| AppError::Storage(format!("failed to write temporary file: {err}")))?;
    tmp.persist(path).map_err(|err| {
        AppError::Storage(format!("failed to persist blob to {}: {err}", path.display()))
    })?;
    Ok(())
}

/// Process-local blob store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryBlobStore {
    fn get<'a>(
        &'a self,
        key: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>>> + Send + 'a>> {
        Box::pin(async move {
            let guard = self
                .entries
                .lock()
                .map_err(|_| AppError::Storage("memory blob store mutex poisoned".into()))?;
            Ok(guard.get(key).cloned())
        })
    }

    fn put<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            let mut guard = self
                .entries
                .lock()
                .map_err(|_| AppError::Storage("memory blob store mutex poisoned".into()))?;
            guard.insert(key.to_owned(), value.to_owned());
            Ok(())
        })
    }
}
