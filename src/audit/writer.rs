//! JSONL sync journal, one file per UTC day.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDate;
use tracing::{debug, trace};

use super::{AuditEntry, AuditLogger};
use crate::{AppError, Result};

/// Appends sync journal entries to `<log_dir>/sync-YYYY-MM-DD.jsonl`.
///
/// The file is chosen from each entry's own timestamp, so entries recorded
/// just before midnight land in the day they describe. Each line is written
/// with a single append while holding the writer lock.
pub struct JsonlAuditWriter {
    log_dir: PathBuf,
    failures_only: bool,
    lock: Mutex<()>,
}

impl JsonlAuditWriter {
    /// Journal into `log_dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if the directory cannot be created.
    pub fn new(log_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&log_dir).map_err(|e| {
            AppError::Io(format!(
                "failed to create sync journal directory {}: {e}",
                log_dir.display()
            ))
        })?;
        Ok(Self {
            log_dir,
            failures_only: false,
            lock: Mutex::new(()),
        })
    }

    /// Drop successful fetch and seed events, keeping only failures.
    #[must_use]
    pub fn failures_only(mut self, enabled: bool) -> Self {
        self.failures_only = enabled;
        self
    }

    /// Directory the journal files are written to.
    #[must_use]
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Journal file holding entries stamped on `date`.
    #[must_use]
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(format!("sync-{date}.jsonl"))
    }
}

impl AuditLogger for JsonlAuditWriter {
    fn log_entry(&self, entry: AuditEntry) -> Result<()> {
        if self.failures_only && !entry.event_type.is_failure() {
            trace!(event = ?entry.event_type, "skipping non-failure journal entry");
            return Ok(());
        }

        let mut line = serde_json::to_string(&entry)
            .map_err(|e| AppError::Io(format!("failed to serialize journal entry: {e}")))?;
        line.push('\n');
        let path = self.path_for(entry.timestamp.date_naive());

        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::Io("sync journal lock poisoned".into()))?;
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(line.as_bytes()))
            .map_err(|e| AppError::Io(format!("journal write to {} failed: {e}", path.display())))?;

        debug!(
            event = ?entry.event_type,
            table = entry.table.as_deref(),
            estimate_id = entry.estimate_id,
            "sync journal entry written"
        );
        Ok(())
    }
}
