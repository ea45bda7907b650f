//! Daily, weekly, and insight summaries.

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;

use crate::analytics::{self, ProductivityAnalysis};
use crate::models::{Estimate, EstimateType};

use super::queues::work_queue;

/// Date format used by the stored date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Days the long-run daily average is spread over.
const AVERAGE_WINDOW_DAYS: f64 = 30.0;
/// Standard working hours per week.
const STANDARD_WEEK_HOURS: f64 = 40.0;

fn returned_date(est: &Estimate) -> Option<NaiveDate> {
    if !est.is_done() {
        return None;
    }
    est.date_returned
        .as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
}

/// Completions on one day against the long-run average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    /// Day summarized.
    pub date: NaiveDate,
    /// Estimates returned that day.
    pub total: usize,
    /// Initial estimates returned that day.
    pub initial: usize,
    /// Final estimates returned that day.
    pub final_count: usize,
    /// All dated completions divided by 30.
    pub average: f64,
    /// `total - average`.
    pub vs_average: f64,
    /// `"+X.X above average"` or `"X.X below average"`.
    pub message: String,
}

/// Summarize completions on `date`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn daily_summary(estimates: &[Estimate], date: NaiveDate) -> DailySummary {
    let day = date.format(DATE_FORMAT).to_string();
    let completed: Vec<&Estimate> = estimates.iter().filter(|e| e.returned_on(&day)).collect();
    let initial = completed
        .iter()
        .filter(|e| e.estimate_type == EstimateType::Initial)
        .count();
    let final_count = completed
        .iter()
        .filter(|e| e.estimate_type == EstimateType::Final)
        .count();

    let dated = estimates
        .iter()
        .filter(|e| e.is_done() && e.date_returned.as_deref().is_some_and(|d| !d.is_empty()))
        .count();
    let average = dated as f64 / AVERAGE_WINDOW_DAYS;
    let vs_average = completed.len() as f64 - average;
    let message = if vs_average > 0.0 {
        format!("+{vs_average:.1} above average")
    } else {
        format!("{vs_average:.1} below average")
    };

    DailySummary {
        date,
        total: completed.len(),
        initial,
        final_count,
        average,
        vs_average,
        message,
    }
}

/// Completions on one day of a week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    /// Calendar day.
    pub date: NaiveDate,
    /// Short weekday name, e.g. `Mon`.
    pub weekday: String,
    /// Estimates returned that day.
    pub count: usize,
}

/// Productivity over a Monday-to-Sunday week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    /// Monday of the week.
    pub week_start: NaiveDate,
    /// Sunday of the week.
    pub week_end: NaiveDate,
    /// Seven entries, Monday first.
    pub days: Vec<DayCount>,
    /// Estimates returned during the week.
    pub total: usize,
    /// `40 - pto + ot`.
    pub available_hours: f64,
    /// Estimates per 100 available hours, one decimal; zero without hours.
    pub productivity_rate: f64,
    /// Sum of amounts returned during the week.
    pub revenue: f64,
    /// `revenue / max(total, 1)`.
    pub average_value: f64,
    /// Trend and risk over the daily counts.
    pub analysis: ProductivityAnalysis,
}

/// Monday of the week containing `date`.
#[must_use]
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Build the weekly report for the week containing `date`.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn weekly_report(
    estimates: &[Estimate],
    date: NaiveDate,
    pto_hours: f64,
    ot_hours: f64,
) -> WeeklyReport {
    let start = week_start(date);
    let end = start + Duration::days(6);

    let in_week: Vec<(&Estimate, NaiveDate)> = estimates
        .iter()
        .filter_map(|e| returned_date(e).map(|d| (e, d)))
        .filter(|(_, d)| *d >= start && *d <= end)
        .collect();

    let days: Vec<DayCount> = start
        .iter_days()
        .take(7)
        .map(|day| DayCount {
            date: day,
            weekday: day.format("%a").to_string(),
            count: in_week.iter().filter(|(_, d)| *d == day).count(),
        })
        .collect();

    let total = in_week.len();
    let available_hours = STANDARD_WEEK_HOURS - pto_hours + ot_hours;
    let productivity_rate = if available_hours > 0.0 {
        ((total as f64 / available_hours) * 1000.0).round() / 10.0
    } else {
        0.0
    };
    let revenue: f64 = in_week.iter().filter_map(|(e, _)| e.amount()).sum();
    let average_value = revenue / total.max(1) as f64;
    let counts: Vec<usize> = days.iter().map(|d| d.count).collect();

    WeeklyReport {
        week_start: start,
        week_end: end,
        days,
        total,
        available_hours,
        productivity_rate,
        revenue,
        average_value,
        analysis: analytics::analyze_productivity(&counts),
    }
}

/// Headline numbers for the insight panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Insights {
    /// Estimates returned today.
    pub completed_today: usize,
    /// Open work-queue size.
    pub queue_size: usize,
    /// Anomalies across all estimates.
    pub anomaly_count: usize,
    /// Pace feedback for today's completions.
    pub pace_message: &'static str,
}

/// Compute the insight panel for `today`.
pub fn insights<R: Rng + ?Sized>(estimates: &[Estimate], today: NaiveDate, rng: &mut R) -> Insights {
    let day = today.format(DATE_FORMAT).to_string();
    let completed_today = estimates.iter().filter(|e| e.returned_on(&day)).count();
    Insights {
        completed_today,
        queue_size: work_queue(estimates).len(),
        anomaly_count: analytics::detect_anomalies(estimates, rng).len(),
        pace_message: if completed_today >= 3 {
            "Great pace!"
        } else {
            "Consider focusing on completion."
        },
    }
}
