//! Estimate model: the single tracked work item.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{AppError, Result};

/// Kind of estimate requested by the client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EstimateType {
    /// First-pass estimate written when a claim arrives.
    Initial,
    /// Closing estimate; the only kind that is billed.
    Final,
}

impl EstimateType {
    /// Display label, identical to the persisted value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "Initial",
            Self::Final => "Final",
        }
    }
}

impl Display for EstimateType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EstimateType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "initial" => Ok(Self::Initial),
            "final" => Ok(Self::Final),
            other => Err(AppError::Validation(format!(
                "unknown estimate type: {other}"
            ))),
        }
    }
}

/// Work status of an estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EstimateStatus {
    /// Received but not yet picked up.
    #[serde(rename = "Not Started")]
    NotStarted,
    /// Being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Returned to the client.
    Done,
}

impl EstimateStatus {
    /// Display label, identical to the persisted value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl Display for EstimateStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EstimateStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let folded: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match folded.as_str() {
            "notstarted" => Ok(Self::NotStarted),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(AppError::Validation(format!("unknown status: {}", s.trim()))),
        }
    }
}

/// A numeric field that may still hold raw form text.
///
/// Amounts are typed into a text box and kept verbatim in the local mirror,
/// so a stored value can be a JSON number or a string such as `""` or
/// `"12.50"`. Remote writes go through [`LooseNumber::as_f64`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LooseNumber {
    /// Already numeric.
    Number(f64),
    /// Raw text as entered.
    Text(String),
}

impl LooseNumber {
    /// Numeric value, or `None` for blank or non-numeric text.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => value.is_finite().then_some(*value),
            Self::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
            }
        }
    }
}

impl From<f64> for LooseNumber {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for LooseNumber {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// A single insurance-estimate work item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    /// Unique identifier; millisecond timestamp or remote-assigned.
    pub id: i64,
    /// Initial or final estimate.
    pub estimate_type: EstimateType,
    /// Insurance claim number.
    #[serde(default)]
    pub claim_number: String,
    /// Client the estimate is written for.
    #[serde(default)]
    pub client_name: String,
    /// Client-side task reference.
    #[serde(default)]
    pub task_number: String,
    /// Intake date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_received: Option<String>,
    /// Intake time, 24h `HH:MM`.
    #[serde(default)]
    pub time_received: Option<String>,
    /// Work status.
    pub status: EstimateStatus,
    /// Completion date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_returned: Option<String>,
    /// Completion time, 24h `HH:MM`.
    #[serde(default)]
    pub time_returned: Option<String>,
    /// Dollar amount of the estimate.
    #[serde(default)]
    pub estimate_amount: Option<LooseNumber>,
    /// Advisory completion prediction recorded at intake.
    #[serde(default)]
    pub ai_predicted_days: Option<LooseNumber>,
    /// Whether the client has been invoiced.
    #[serde(default, deserialize_with = "deserialize_truthy")]
    pub client_billed: bool,
}

/// Fields captured by the intake form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeForm {
    /// Initial or final estimate.
    pub estimate_type: EstimateType,
    /// Insurance claim number.
    pub claim_number: String,
    /// Client name.
    pub client_name: String,
    /// Client-side task reference.
    pub task_number: String,
    /// Intake date, `YYYY-MM-DD`.
    pub date_received: String,
    /// Intake time, 24h `HH:MM`.
    pub time_received: String,
}

impl Estimate {
    /// Build a new, not-yet-started estimate from intake form data.
    #[must_use]
    pub fn from_intake(form: IntakeForm, id: i64, predicted_days: Option<u32>) -> Self {
        Self {
            id,
            estimate_type: form.estimate_type,
            claim_number: form.claim_number,
            client_name: form.client_name,
            task_number: form.task_number,
            date_received: Some(form.date_received),
            time_received: Some(form.time_received),
            status: EstimateStatus::NotStarted,
            date_returned: None,
            time_returned: None,
            estimate_amount: None,
            ai_predicted_days: predicted_days.map(|days| LooseNumber::Number(f64::from(days))),
            client_billed: false,
        }
    }

    /// Millisecond wall-clock identifier for a freshly created estimate.
    #[must_use]
    pub fn timestamp_id() -> i64 {
        Utc::now().timestamp_millis()
    }

    /// Numeric amount, treating blank or non-numeric text as absent.
    #[must_use]
    pub fn amount(&self) -> Option<f64> {
        self.estimate_amount.as_ref().and_then(LooseNumber::as_f64)
    }

    /// Whether the estimate has been returned.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.status == EstimateStatus::Done
    }

    /// Whether the estimate was returned on `date` (`YYYY-MM-DD`).
    #[must_use]
    pub fn returned_on(&self, date: &str) -> bool {
        self.is_done() && self.date_returned.as_deref() == Some(date)
    }

    /// Check the fields required at creation time.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` naming the first blank required field.
    pub fn validate_new(&self) -> Result<()> {
        let required = [
            ("claimNumber", &self.claim_number),
            ("clientName", &self.client_name),
            ("taskNumber", &self.task_number),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AppError::Validation(format!("{name} is required")));
            }
        }
        Ok(())
    }
}

/// Coerce any JSON value to a boolean the way a form checkbox would.
///
/// `null`, `false`, `0`, and `""` are false; everything else is true.
fn deserialize_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|v| v.abs() > 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
