//! Work and billing queues.

use crate::models::{Estimate, EstimateType};

/// Estimates still open: everything not yet done.
#[must_use]
pub fn work_queue(estimates: &[Estimate]) -> Vec<&Estimate> {
    estimates.iter().filter(|e| !e.is_done()).collect()
}

/// Final estimates that are done and not yet billed.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingQueue<'a> {
    /// Estimates awaiting an invoice.
    pub items: Vec<&'a Estimate>,
    /// Sum of their amounts; missing or non-numeric amounts count as zero.
    pub total: f64,
}

/// Collect the billing queue and its total.
#[must_use]
pub fn billing_queue(estimates: &[Estimate]) -> BillingQueue<'_> {
    let items: Vec<&Estimate> = estimates
        .iter()
        .filter(|e| e.estimate_type == EstimateType::Final && e.is_done() && !e.client_billed)
        .collect();
    let total = items.iter().filter_map(|e| e.amount()).sum();
    BillingQueue { items, total }
}
