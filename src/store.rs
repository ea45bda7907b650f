//! Estimate store: the single writer over the in-memory list.
//!
//! Each mutation is applied in memory first, then written to the local
//! mirror, then propagated to the remote store. The remote step is
//! awaited but cannot fail the call; only invalid input is rejected.
//!
//! Reconciliation has one rule: a non-empty remote fetch replaces the
//! local list wholesale, discarding local-only changes.

use tracing::{debug, info, warn};

use crate::audit::{AuditEntry, AuditEventType};
use crate::mode::SyncMode;
use crate::models::{Estimate, EstimateStatus, LooseNumber};
use crate::persistence::LocalMirror;
use crate::remote::{FetchOutcome, RemoteSync};
use crate::{AppError, Result};

/// Authoritative in-memory estimate list with its two mirrors.
pub struct EstimateStore {
    estimates: Vec<Estimate>,
    mirror: LocalMirror,
    remote: RemoteSync,
    seed_on_empty: bool,
}

impl EstimateStore {
    /// Seed from the local mirror without contacting the remote.
    pub async fn load(mirror: LocalMirror, remote: RemoteSync, seed_on_empty: bool) -> Self {
        let estimates = mirror.load().await;
        info!(count = estimates.len(), "loaded estimates from local mirror");
        Self {
            estimates,
            mirror,
            remote,
            seed_on_empty,
        }
    }

    /// Startup sequence: local seed followed by the remote fetch.
    pub async fn open(mirror: LocalMirror, remote: RemoteSync, seed_on_empty: bool) -> Self {
        let mut store = Self::load(mirror, remote, seed_on_empty).await;
        store.hydrate().await;
        store
    }

    /// Fetch remote state and apply the reconciliation rule.
    ///
    /// Empty or failed fetches leave the list untouched. When seeding is
    /// enabled, an empty remote table receives the current local list.
    pub async fn hydrate(&mut self) -> FetchOutcome {
        let outcome = self.remote.fetch_all().await;
        match &outcome {
            FetchOutcome::Rows(rows) => {
                let discarded = self
                    .estimates
                    .iter()
                    .filter(|local| !rows.iter().any(|r| r.id == local.id))
                    .count();
                if discarded > 0 {
                    warn!(discarded, "remote fetch replaced local-only estimates");
                }
                self.estimates.clone_from(rows);
                self.persist().await;
            }
            FetchOutcome::Empty if self.seed_on_empty && !self.estimates.is_empty() => {
                info!(count = self.estimates.len(), "seeding empty remote table");
                self.remote.seed(&self.estimates).await;
            }
            FetchOutcome::Empty | FetchOutcome::Failed | FetchOutcome::Skipped => {
                debug!(?outcome, "keeping local estimates");
            }
        }
        outcome
    }

    /// All estimates in insertion order.
    #[must_use]
    pub fn estimates(&self) -> &[Estimate] {
        &self.estimates
    }

    /// Look up an estimate by id.
    #[must_use]
    pub fn get(&self, id: i64) -> Option<&Estimate> {
        self.estimates.iter().find(|e| e.id == id)
    }

    /// Remote sync mode.
    #[must_use]
    pub fn mode(&self) -> SyncMode {
        self.remote.mode()
    }

    /// Timestamp-derived id that does not collide with a tracked estimate.
    #[must_use]
    pub fn next_id(&self) -> i64 {
        let now = Estimate::timestamp_id();
        let max = self.estimates.iter().map(|e| e.id).max().unwrap_or(i64::MIN);
        if now > max {
            now
        } else {
            max.saturating_add(1)
        }
    }

    /// Track a new estimate.
    ///
    /// Claim, client, and task must be non-blank, so a record carrying only
    /// an id and status is rejected.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if a required field is blank, or
    /// `AppError::AlreadyExists` if the id is taken. Remote failures are
    /// never returned.
    pub async fn add(&mut self, est: Estimate) -> Result<()> {
        est.validate_new()?;
        if self.get(est.id).is_some() {
            return Err(AppError::AlreadyExists(format!("estimate {}", est.id)));
        }

        self.estimates.push(est.clone());
        self.persist().await;
        self.remote.propagate_insert(&est).await;
        info!(id = est.id, "estimate added");
        Ok(())
    }

    /// Replace the estimate with the same id.
    ///
    /// An unknown id leaves the list unchanged; the remote update is still
    /// attempted. A billed estimate stays billed.
    pub async fn update(&mut self, mut est: Estimate) {
        match self.estimates.iter_mut().find(|e| e.id == est.id) {
            Some(current) => {
                if current.client_billed && !est.client_billed {
                    warn!(id = est.id, "ignoring attempt to un-bill an estimate");
                    est.client_billed = true;
                }
                current.clone_from(&est);
            }
            None => debug!(id = est.id, "update for untracked estimate"),
        }

        self.persist().await;
        self.remote.propagate_update(&est).await;
    }

    /// Remove the estimate with `id`; absent ids are not an error.
    pub async fn delete(&mut self, id: i64) {
        let before = self.estimates.len();
        self.estimates.retain(|e| e.id != id);
        if self.estimates.len() == before {
            debug!(id, "delete for untracked estimate");
        }

        self.persist().await;
        self.remote.propagate_delete(id).await;
    }

    /// Move an estimate to `status`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no estimate has `id`.
    pub async fn set_status(&mut self, id: i64, status: EstimateStatus) -> Result<Estimate> {
        self.edit(id, |est| est.status = status).await
    }

    /// Mark an estimate done, recording when it was returned.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no estimate has `id`.
    pub async fn complete(
        &mut self,
        id: i64,
        date_returned: String,
        time_returned: String,
        amount: Option<LooseNumber>,
    ) -> Result<Estimate> {
        self.edit(id, |est| {
            est.status = EstimateStatus::Done;
            est.date_returned = Some(date_returned);
            est.time_returned = Some(time_returned);
            if amount.is_some() {
                est.estimate_amount = amount;
            }
        })
        .await
    }

    /// Set the dollar amount of an estimate.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no estimate has `id`.
    pub async fn set_amount(&mut self, id: i64, amount: LooseNumber) -> Result<Estimate> {
        self.edit(id, |est| est.estimate_amount = Some(amount)).await
    }

    /// Flag an estimate as billed to the client.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if no estimate has `id`.
    pub async fn mark_billed(&mut self, id: i64) -> Result<Estimate> {
        self.edit(id, |est| est.client_billed = true).await
    }

    async fn edit(&mut self, id: i64, apply: impl FnOnce(&mut Estimate)) -> Result<Estimate> {
        let mut est = self
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("estimate {id}")))?;
        apply(&mut est);
        self.update(est.clone()).await;
        Ok(self.get(id).cloned().unwrap_or(est))
    }

    async fn persist(&self) {
        if !self.mirror.save(&self.estimates).await {
            self.remote.record(
                AuditEntry::new(AuditEventType::LocalWriteFailed)
                    .with_count(self.estimates.len()),
            );
        }
    }
}
