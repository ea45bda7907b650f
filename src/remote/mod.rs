//! Remote row-store mirror.
//!
//! The [`RemoteStore`] trait is the seam between [`sync::RemoteSync`] and
//! the table backend. [`rest::RestRemoteStore`] talks to a PostgREST-style
//! HTTP API; tests substitute their own implementations.

pub mod record;
pub mod rest;
pub mod sync;

use std::future::Future;
use std::pin::Pin;

use crate::Result;

pub use record::{normalize, RemoteEstimate};
pub use rest::RestRemoteStore;
pub use sync::{FetchOutcome, RemoteSync};

/// Table-like remote store holding one row per estimate.
pub trait RemoteStore: Send + Sync {
    /// Name of the remote table, used in logs and journal entries.
    fn table(&self) -> &str;

    /// Fetch every row ordered by `id` ascending.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the request fails or is rejected.
    fn select_all(&self) -> Pin<Box<dyn Future<Output = Result<Vec<RemoteEstimate>>> + Send + '_>>;

    /// Insert one or more rows.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the request fails or is rejected.
    fn insert<'a>(
        &'a self,
        rows: &'a [RemoteEstimate],
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Replace the row whose `id` matches `row.id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the request fails or is rejected.
    fn update<'a>(
        &'a self,
        row: &'a RemoteEstimate,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Delete the row with `id`; deleting a missing row is not an error.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` if the request fails or is rejected.
    fn delete(&self, id: i64) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
