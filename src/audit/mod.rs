//! Sync journal: structured records of remote sync outcomes.
//!
//! Provides the [`AuditLogger`] trait and associated types. The primary
//! implementation, [`JsonlAuditWriter`], appends JSONL records to
//! daily-rotating files under `<data_dir>/logs`.

pub mod writer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event type classification for sync journal entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    /// A non-empty remote fetch replaced the local list.
    FetchApplied,
    /// The startup fetch failed; local state kept.
    FetchFailed,
    /// Remote insert of a new estimate failed.
    InsertFailed,
    /// Remote update of an estimate failed.
    UpdateFailed,
    /// Remote delete of an estimate failed.
    DeleteFailed,
    /// The empty remote table was seeded from the local list.
    SeedApplied,
    /// Seeding the empty remote table failed.
    SeedFailed,
    /// Writing the local mirror failed.
    LocalWriteFailed,
}

impl AuditEventType {
    /// Whether this event records a failure.
    #[must_use]
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::FetchApplied | Self::SeedApplied)
    }
}

/// A structured record of one sync event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// ISO 8601 timestamp with timezone.
    pub timestamp: DateTime<Utc>,
    /// Event classification.
    pub event_type: AuditEventType,
    /// Estimate the event concerns, for single-record operations.
    pub estimate_id: Option<i64>,
    /// Number of records involved, for fetch and seed events.
    pub record_count: Option<usize>,
    /// Remote table name.
    pub table: Option<String>,
    /// Error text for failure events.
    pub error: Option<String>,
}

impl AuditEntry {
    /// Construct a minimal journal entry for the given event type.
    #[must_use]
    pub fn new(event_type: AuditEventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            estimate_id: None,
            record_count: None,
            table: None,
            error: None,
        }
    }

    /// Set the estimate identifier for this entry.
    #[must_use]
    pub fn with_estimate(mut self, id: i64) -> Self {
        self.estimate_id = Some(id);
        self
    }

    /// Set the record count for this entry.
    #[must_use]
    pub fn with_count(mut self, count: usize) -> Self {
        self.record_count = Some(count);
        self
    }

    /// Set the remote table for this entry.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the error text for this entry.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

/// Writes sync journal entries to a persistent store.
///
/// Implementations must be [`Send`] and [`Sync`] to allow sharing across
/// async task boundaries via [`std::sync::Arc`].
pub trait AuditLogger: Send + Sync {
    /// Record a single journal entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write operation fails.
    fn log_entry(&self, entry: AuditEntry) -> crate::Result<()>;
}

pub use writer::JsonlAuditWriter;
