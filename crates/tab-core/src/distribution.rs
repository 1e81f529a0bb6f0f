//! Tax, tip and unclaimed-item distribution.
//!
//! # Algorithm Summary
//!
//! 1. `count = max(1, distinct claimants)`
//! 2. Unclaimed item value is split equally: `unclaimed_total / count` each
//! 3. `proportion = items_total / subtotal`, or 0 when the subtotal is 0
//! 4. Tax and tip are each either `amount / count` (equal) or
//!    `amount * proportion` (proportional)
//! 5. `total_owed = items_total + unclaimed share + tax + tip`
//!
//! The claimant count deliberately ignores invitees who have claimed nothing:
//! they carry no share of unclaimed items or of equal-split charges.
//!
//! With a zero subtotal every proportional portion is 0. There is no fallback
//! to an equal split, so the tax or tip is left unassigned in that case.

use std::collections::HashSet;

use serde::Serialize;

use crate::receipt::ReceiptTotals;
use crate::types::{DistributionOptions, DistributionType, UserId};

/// What one claimant spent on claimed items, before any distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Spend {
    pub user_id: UserId,
    pub items_total: f64,
}

/// A claimant's computed share of the bill.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub user_id: UserId,
    /// Claimed items plus this claimant's slice of the unclaimed items.
    pub items_total: f64,
    pub tax_portion: f64,
    pub tip_portion: f64,
    /// Exactly `items_total + tax_portion + tip_portion`.
    pub total_owed: f64,
}

/// Distributes tax, tip and unclaimed items over the claimants.
///
/// Returns one share per input spend, in input order. An empty `spends`
/// yields an empty result; nothing is divided and the tax, tip and unclaimed
/// total stay unassigned.
#[expect(clippy::cast_precision_loss, reason = "claimant counts are small")]
pub fn distribute(
    spends: &[Spend],
    totals: &ReceiptTotals,
    unclaimed_total: f64,
    options: DistributionOptions,
) -> Vec<Share> {
    let distinct: HashSet<&UserId> = spends.iter().map(|s| &s.user_id).collect();
    let count = distinct.len().max(1) as f64;
    let unclaimed_per_person = unclaimed_total / count;

    tracing::debug!(
        claimants = distinct.len(),
        unclaimed_per_person,
        tax = %options.tax,
        tip = %options.tip,
        "distributing bill"
    );

    spends
        .iter()
        .map(|spend| {
            let proportion = if totals.subtotal > 0.0 {
                spend.items_total / totals.subtotal
            } else {
                0.0
            };
            let tax_portion = portion(totals.tax, options.tax, proportion, count);
            let tip_portion = portion(totals.tip, options.tip, proportion, count);
            let items_total = spend.items_total + unclaimed_per_person;

            Share {
                user_id: spend.user_id.clone(),
                items_total,
                tax_portion,
                tip_portion,
                total_owed: items_total + tax_portion + tip_portion,
            }
        })
        .collect()
}

fn portion(amount: f64, policy: DistributionType, proportion: f64, count: f64) -> f64 {
    match policy {
        DistributionType::Equal => amount / count,
        DistributionType::Proportional => amount * proportion,
    }
}
