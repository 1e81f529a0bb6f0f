//! Settlement report assembly.

use serde::Serialize;

use crate::aggregate::{ClaimAggregation, ClaimedItem, aggregate_claims};
use crate::distribution::{Share, distribute};
use crate::receipt::{ItemClaim, ReceiptItem, ReceiptTotals};
use crate::types::{DistributionOptions, DistributionType, UserId};

/// Placeholder username for claimants without a resolvable profile.
pub const UNKNOWN_USERNAME: &str = "Unknown";

/// What one participant owes, with identity fields for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantTotal {
    pub user_id: UserId,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    /// Claimed items plus the participant's share of unclaimed items.
    pub items_total: f64,
    pub tax_portion: f64,
    pub tip_portion: f64,
    pub total_owed: f64,
    pub claimed_items: Vec<ClaimedItem>,
}

impl ParticipantTotal {
    /// Name to show: display name if set, otherwise username.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

/// The full settlement view for one receipt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillBreakdown {
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
    /// Sorted by `total_owed`, largest first.
    pub participants: Vec<ParticipantTotal>,
    pub unclaimed_total: f64,
    pub tax_distribution: DistributionType,
    pub tip_distribution: DistributionType,
}

impl BillBreakdown {
    pub fn participant(&self, user_id: &UserId) -> Option<&ParticipantTotal> {
        self.participants.iter().find(|p| &p.user_id == user_id)
    }

    /// Sum of everything assigned to participants.
    pub fn assigned_total(&self) -> f64 {
        self.participants.iter().map(|p| p.total_owed).sum()
    }
}

/// Joins distributed shares with claimant identity and sorts the result.
///
/// Shares whose user is missing from `aggregation` are dropped. Ties on
/// `total_owed` keep share order.
pub fn assemble(
    mut aggregation: ClaimAggregation,
    shares: Vec<Share>,
    totals: &ReceiptTotals,
    options: DistributionOptions,
) -> BillBreakdown {
    let mut participants: Vec<ParticipantTotal> = shares
        .into_iter()
        .filter_map(|share| {
            let claimant = aggregation.claimants.shift_remove(&share.user_id)?;
            let (username, display_name, avatar_url) = claimant
                .profile
                .map_or((None, None, None), |p| (p.username, p.display_name, p.avatar_url));
            Some(ParticipantTotal {
                user_id: share.user_id,
                username: non_empty(username).unwrap_or_else(|| UNKNOWN_USERNAME.to_string()),
                display_name: non_empty(display_name),
                avatar_url: non_empty(avatar_url),
                items_total: share.items_total,
                tax_portion: share.tax_portion,
                tip_portion: share.tip_portion,
                total_owed: share.total_owed,
                claimed_items: claimant.claimed_items,
            })
        })
        .collect();

    participants.sort_by(|a, b| b.total_owed.total_cmp(&a.total_owed));

    BillBreakdown {
        subtotal: totals.subtotal,
        tax: totals.tax,
        tip: totals.tip,
        total: totals.total,
        participants,
        unclaimed_total: aggregation.unclaimed_total,
        tax_distribution: options.tax,
        tip_distribution: options.tip,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Computes the settlement for one receipt from in-memory rows.
///
/// Pure and re-entrant: the same inputs always give the same breakdown, so
/// callers simply recompute whenever claims or options change.
pub fn compute_bill_breakdown(
    items: &[ReceiptItem],
    claims: &[ItemClaim],
    totals: &ReceiptTotals,
    options: DistributionOptions,
) -> BillBreakdown {
    let aggregation = aggregate_claims(items, claims);
    let shares = distribute(
        &aggregation.spends(),
        totals,
        aggregation.unclaimed_total,
        options,
    );
    assemble(aggregation, shares, totals, options)
}
