//! Remote sync mode, decided once at startup.
//!
//! `SyncMode` follows from whether remote credentials were found. There
//! is no transition between modes within a running process.

use serde::{Deserialize, Serialize};

/// Whether remote sync performs any network operation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Credentials present; mutations are mirrored to the remote table.
    Configured,
    /// No credentials; the local mirror is the only persistence.
    #[default]
    Unconfigured,
}

impl SyncMode {
    /// Whether remote operations are attempted.
    #[must_use]
    pub fn is_configured(self) -> bool {
        matches!(self, Self::Configured)
    }
}
