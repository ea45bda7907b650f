//! Row shape written to the remote table and the normalization into it.

use serde::{Deserialize, Serialize};

use crate::models::{Estimate, EstimateStatus, EstimateType, LooseNumber};

/// An estimate as stored in the remote table.
///
/// Same column names as the local JSON; blank strings are `null`, numeric
/// columns are numbers, and `clientBilled` is always a boolean.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteEstimate {
    /// Row identifier.
    pub id: i64,
    /// Initial or final estimate.
    pub estimate_type: EstimateType,
    /// Insurance claim number.
    #[serde(default)]
    pub claim_number: String,
    /// Client name.
    #[serde(default)]
    pub client_name: String,
    /// Client-side task reference.
    #[serde(default)]
    pub task_number: String,
    /// Intake date.
    #[serde(default)]
    pub date_received: Option<String>,
    /// Intake time.
    #[serde(default)]
    pub time_received: Option<String>,
    /// Work status.
    pub status: EstimateStatus,
    /// Completion date.
    #[serde(default)]
    pub date_returned: Option<String>,
    /// Completion time.
    #[serde(default)]
    pub time_returned: Option<String>,
    /// Dollar amount.
    #[serde(default)]
    pub estimate_amount: Option<f64>,
    /// Advisory completion prediction in days.
    #[serde(default)]
    pub ai_predicted_days: Option<i64>,
    /// Whether the client has been invoiced.
    #[serde(default)]
    pub client_billed: bool,
}

/// Normalize a local estimate for a remote write.
///
/// Pure and idempotent: normalizing the estimate rebuilt from a
/// [`RemoteEstimate`] yields that same row.
#[must_use]
pub fn normalize(est: &Estimate) -> RemoteEstimate {
    RemoteEstimate {
        id: est.id,
        estimate_type: est.estimate_type,
        claim_number: est.claim_number.clone(),
        client_name: est.client_name.clone(),
        task_number: est.task_number.clone(),
        date_received: blank_to_none(est.date_received.as_deref()),
        time_received: blank_to_none(est.time_received.as_deref()),
        status: est.status,
        date_returned: blank_to_none(est.date_returned.as_deref()),
        time_returned: blank_to_none(est.time_returned.as_deref()),
        estimate_amount: est.amount(),
        ai_predicted_days: est
            .ai_predicted_days
            .as_ref()
            .and_then(LooseNumber::as_f64)
            .map(whole_days),
        client_billed: est.client_billed,
    }
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_owned)
}

#[allow(clippy::cast_possible_truncation)]
fn whole_days(value: f64) -> i64 {
    value.round() as i64
}

impl From<RemoteEstimate> for Estimate {
    #[allow(clippy::cast_precision_loss)]
    fn from(row: RemoteEstimate) -> Self {
        Self {
            id: row.id,
            estimate_type: row.estimate_type,
            claim_number: row.claim_number,
            client_name: row.client_name,
            task_number: row.task_number,
            date_received: row.date_received,
            time_received: row.time_received,
            status: row.status,
            date_returned: row.date_returned,
            time_returned: row.time_returned,
            estimate_amount: row.estimate_amount.map(LooseNumber::Number),
            ai_predicted_days: row
                .ai_predicted_days
                .map(|days| LooseNumber::Number(days as f64)),
            client_billed: row.client_billed,
        }
    }
}
