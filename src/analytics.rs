//! Heuristic "insight" helpers shown alongside the queues.
//!
//! Stateless arithmetic with a random component. Callers pass the RNG so
//! results are reproducible under a seeded generator.

use std::cmp::Reverse;

use rand::Rng;
use serde::Serialize;

use crate::models::{Estimate, EstimateStatus, EstimateType};

/// Amount above which an estimate is flagged.
pub const HIGH_AMOUNT_THRESHOLD: f64 = 10_000.0;
/// Amount assumed for prioritization when none is recorded.
const DEFAULT_PRIORITY_AMOUNT: f64 = 1_000.0;

/// Predicted turnaround for a new estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionPrediction {
    /// Predicted working days.
    pub days: u32,
    /// Confidence percentage, 80 to 95.
    pub confidence: u32,
    /// Human-readable explanation.
    pub reasoning: String,
}

/// Predict turnaround from the estimate type and the open workload.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn predict_completion_time<R: Rng + ?Sized>(
    estimate_type: EstimateType,
    open_workload: usize,
    rng: &mut R,
) -> CompletionPrediction {
    let base_days = match estimate_type {
        EstimateType::Initial => 2.0,
        EstimateType::Final => 4.0,
    };
    let workload_factor = (open_workload as f64 / 5.0).max(1.0);
    let days = (base_days * workload_factor).round() as u32;
    let confidence = (80.0 + rng.random::<f64>() * 15.0).round() as u32;

    CompletionPrediction {
        days,
        confidence,
        reasoning: format!(
            "Considering current workload of {open_workload} items and historical {} estimate timelines",
            estimate_type.as_str().to_lowercase()
        ),
    }
}

/// Direction of daily output across a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Last day beat the first.
    Increasing,
    /// Last day did not beat the first.
    Decreasing,
}

/// Risk of falling behind, from the daily average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Average of five or more per day.
    Low,
    /// Average of three to five per day.
    Medium,
    /// Average under three per day.
    High,
}

/// Summary of a run of daily completion counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductivityAnalysis {
    /// Mean completions per day, rounded to one decimal.
    pub avg_daily: f64,
    /// Last day compared to the first.
    pub trend: Trend,
    /// Advice matching the trend.
    pub recommendation: &'static str,
    /// Risk bucket for the unrounded average.
    pub risk_level: RiskLevel,
}

/// Analyze daily completion counts in chronological order.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn analyze_productivity(daily_counts: &[usize]) -> ProductivityAnalysis {
    let total: usize = daily_counts.iter().sum();
    let avg = total as f64 / daily_counts.len().max(1) as f64;
    let trend = match (daily_counts.first(), daily_counts.last()) {
        (Some(first), Some(last)) if last > first => Trend::Increasing,
        _ => Trend::Decreasing,
    };
    let recommendation = match trend {
        Trend::Increasing => "Great momentum! Consider taking on additional projects.",
        Trend::Decreasing => "Productivity declining. Consider reviewing task prioritization.",
    };
    let risk_level = if avg < 3.0 {
        RiskLevel::High
    } else if avg < 5.0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    ProductivityAnalysis {
        avg_daily: (avg * 10.0).round() / 10.0,
        trend,
        recommendation,
        risk_level,
    }
}

/// Priority bucket assigned to a work-queue item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Score of 40 or less.
    Low,
    /// Score above 40.
    Medium,
    /// Score above 70.
    High,
}

impl Priority {
    /// Lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A work-queue item with its assigned priority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrioritizedEstimate {
    /// The queued estimate.
    pub estimate: Estimate,
    /// Assigned priority.
    pub priority: Priority,
    /// Short explanation.
    pub reasoning: &'static str,
}

/// Score and order work-queue items, highest priority first.
///
/// The score is a random urgency in `[0, 100)` plus the amount divided by
/// 100 (1000 when no amount is recorded). Ties keep their input order.
pub fn prioritize_work_queue<R: Rng + ?Sized>(
    items: &[Estimate],
    rng: &mut R,
) -> Vec<PrioritizedEstimate> {
    let mut scored: Vec<PrioritizedEstimate> = items
        .iter()
        .map(|est| {
            let urgency = rng.random::<f64>() * 100.0;
            let value = est
                .amount()
                .filter(|amount| amount.abs() > f64::EPSILON)
                .unwrap_or(DEFAULT_PRIORITY_AMOUNT)
                / 100.0;
            let score = urgency + value;
            let priority = if score > 70.0 {
                Priority::High
            } else if score > 40.0 {
                Priority::Medium
            } else {
                Priority::Low
            };
            PrioritizedEstimate {
                estimate: est.clone(),
                priority,
                reasoning: if priority == Priority::High {
                    "High value + Urgent deadline"
                } else {
                    "Standard priority"
                },
            }
        })
        .collect();
    scored.sort_by_key(|item| Reverse(item.priority));
    scored
}

/// Kind of anomaly detected on an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Amount above [`HIGH_AMOUNT_THRESHOLD`].
    HighAmount,
    /// In progress for longer than expected.
    Delayed,
}

/// How urgently an anomaly needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth a look.
    Warning,
    /// Needs attention.
    High,
}

/// An anomaly flagged on one estimate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    /// Affected estimate.
    pub id: i64,
    /// Anomaly classification.
    pub kind: AnomalyKind,
    /// Human-readable description.
    pub message: String,
    /// Severity.
    pub severity: Severity,
}

/// Flag unusually large amounts and in-progress work that looks stuck.
///
/// Days since start are not tracked, so in-progress items draw a random
/// day count in `0..10` and are flagged above five.
pub fn detect_anomalies<R: Rng + ?Sized>(items: &[Estimate], rng: &mut R) -> Vec<Anomaly> {
    let mut anomalies = Vec::new();
    for est in items {
        if est.amount().is_some_and(|amount| amount > HIGH_AMOUNT_THRESHOLD) {
            anomalies.push(Anomaly {
                id: est.id,
                kind: AnomalyKind::HighAmount,
                message: "Unusually high estimate amount detected".into(),
                severity: Severity::Warning,
            });
        }

        if est.status == EstimateStatus::InProgress {
            let days_since_start: u32 = rng.random_range(0..10);
            if days_since_start > 5 {
                anomalies.push(Anomaly {
                    id: est.id,
                    kind: AnomalyKind::Delayed,
                    message: format!("Estimate has been in progress for {days_since_start} days"),
                    severity: Severity::High,
                });
            }
        }
    }
    anomalies
}
