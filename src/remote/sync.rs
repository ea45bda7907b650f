//! Best-effort mirroring of local mutations to the remote store.
//!
//! Every operation is a no-op when no remote is configured. Failures are
//! logged and journaled, never returned: the caller's local state is
//! already updated and stays authoritative. No retry, no outbox.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{normalize, RemoteEstimate, RemoteStore, RestRemoteStore};
use crate::audit::{AuditEntry, AuditEventType, AuditLogger};
use crate::config::RemoteCredentials;
use crate::mode::SyncMode;
use crate::models::Estimate;
use crate::Result;

/// Result of a startup fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// No remote configured; nothing was requested.
    Skipped,
    /// The request failed; local state must be kept.
    Failed,
    /// The remote table is empty; local state must be kept.
    Empty,
    /// Canonical remote rows, ordered by id.
    Rows(Vec<Estimate>),
}

/// Remote mirror of the estimate collection.
#[derive(Clone, Default)]
pub struct RemoteSync {
    remote: Option<Arc<dyn RemoteStore>>,
    journal: Option<Arc<dyn AuditLogger>>,
}

impl RemoteSync {
    /// A sync that never touches the network.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// A sync mirroring into `remote`.
    #[must_use]
    pub fn configured(remote: Arc<dyn RemoteStore>) -> Self {
        Self {
            remote: Some(remote),
            journal: None,
        }
    }

    /// Build from startup credentials: configured over HTTP when present,
    /// unconfigured otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are present but the HTTP client
    /// cannot be built from them.
    pub fn from_credentials(credentials: Option<&RemoteCredentials>, table: &str) -> Result<Self> {
        match credentials {
            Some(creds) => {
                let store = RestRemoteStore::new(creds, table)?;
                info!(table, url = %store.table_url(), "remote sync configured");
                Ok(Self::configured(Arc::new(store)))
            }
            None => {
                info!("remote sync not configured; running on the local mirror only");
                Ok(Self::unconfigured())
            }
        }
    }

    /// Record sync events to `journal`.
    #[must_use]
    pub fn with_journal(mut self, journal: Arc<dyn AuditLogger>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> SyncMode {
        if self.remote.is_some() {
            SyncMode::Configured
        } else {
            SyncMode::Unconfigured
        }
    }

    /// Fetch every remote row, ordered by id.
    pub async fn fetch_all(&self) -> FetchOutcome {
        let Some(remote) = &self.remote else {
            return FetchOutcome::Skipped;
        };

        match remote.select_all().await {
            Ok(rows) if rows.is_empty() => {
                debug!(table = remote.table(), "remote table is empty");
                FetchOutcome::Empty
            }
            Ok(rows) => {
                info!(table = remote.table(), count = rows.len(), "remote fetch complete");
                self.record(
                    AuditEntry::new(AuditEventType::FetchApplied)
                        .with_table(remote.table())
                        .with_count(rows.len()),
                );
                FetchOutcome::Rows(rows.into_iter().map(Estimate::from).collect())
            }
            Err(err) => {
                warn!(table = remote.table(), %err, "remote fetch failed");
                self.record(
                    AuditEntry::new(AuditEventType::FetchFailed)
                        .with_table(remote.table())
                        .with_error(err.to_string()),
                );
                FetchOutcome::Failed
            }
        }
    }

    /// Bulk-insert `estimates` into an empty remote table.
    pub async fn seed(&self, estimates: &[Estimate]) {
        let Some(remote) = &self.remote else {
            return;
        };
        if estimates.is_empty() {
            return;
        }

        let rows: Vec<RemoteEstimate> = estimates.iter().map(normalize).collect();
        match remote.insert(&rows).await {
            Ok(()) => {
                info!(table = remote.table(), count = rows.len(), "remote table seeded");
                self.record(
                    AuditEntry::new(AuditEventType::SeedApplied)
                        .with_table(remote.table())
                        .with_count(rows.len()),
                );
            }
            Err(err) => {
                warn!(table = remote.table(), %err, "remote seed insert failed");
                self.record(
                    AuditEntry::new(AuditEventType::SeedFailed)
                        .with_table(remote.table())
                        .with_count(rows.len())
                        .with_error(err.to_string()),
                );
            }
        }
    }

    /// Mirror a newly added estimate.
    pub async fn propagate_insert(&self, est: &Estimate) {
        let Some(remote) = &self.remote else {
            return;
        };
        let row = normalize(est);
        if let Err(err) = remote.insert(std::slice::from_ref(&row)).await {
            warn!(table = remote.table(), id = est.id, %err, "remote insert failed");
            self.record_failure(AuditEventType::InsertFailed, remote.table(), est.id, &err);
        }
    }

    /// Mirror an edited estimate as a whole-row replace.
    pub async fn propagate_update(&self, est: &Estimate) {
        let Some(remote) = &self.remote else {
            return;
        };
        let row = normalize(est);
        if let Err(err) = remote.update(&row).await {
            warn!(table = remote.table(), id = est.id, %err, "remote update failed");
            self.record_failure(AuditEventType::UpdateFailed, remote.table(), est.id, &err);
        }
    }

    /// Mirror a deletion.
    pub async fn propagate_delete(&self, id: i64) {
        let Some(remote) = &self.remote else {
            return;
        };
        if let Err(err) = remote.delete(id).await {
            warn!(table = remote.table(), id, %err, "remote delete failed");
            self.record_failure(AuditEventType::DeleteFailed, remote.table(), id, &err);
        }
    }

    /// Append an entry to the journal, if one is attached.
    pub fn record(&self, entry: AuditEntry) {
        if let Some(journal) = &self.journal {
            if let Err(err) = journal.log_entry(entry) {
                warn!(%err, "failed to write sync journal entry");
            }
        }
    }

    fn record_failure(
        &self,
        event_type: AuditEventType,
        table: &str,
        id: i64,
        err: &crate::AppError,
    ) {
        self.record(
            AuditEntry::new(event_type)
                .with_table(table)
                .with_estimate(id)
                .with_error(err.to_string()),
        );
    }
}
