//! Read-only views derived from the estimate list.

pub mod queues;
pub mod reports;

pub use queues::{billing_queue, work_queue, BillingQueue};
pub use reports::{daily_summary, insights, weekly_report, DailySummary, Insights, WeeklyReport};
