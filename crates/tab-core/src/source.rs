//! Data providers for the settlement engine.
//!
//! The engine never talks to a store. Callers implement [`BillSource`] over
//! whatever holds the rows (a hosted database client, a snapshot file, test
//! fixtures) and the engine reads everything it needs through it up front.

use crate::breakdown::{BillBreakdown, ParticipantTotal, compute_bill_breakdown};
use crate::receipt::{ItemClaim, ReceiptItem, ReceiptRecord, ReceiptTotals};
use crate::types::{DistributionOptions, ItemId, ReceiptId, UserId};

/// Supplies the rows one settlement needs.
pub trait BillSource {
    /// Error raised by the underlying store.
    type Error;

    /// Returns the receipt record.
    fn receipt(&self, receipt_id: &ReceiptId) -> Result<ReceiptRecord, Self::Error>;

    /// Returns all items on the receipt in creation order.
    fn items(&self, receipt_id: &ReceiptId) -> Result<Vec<ReceiptItem>, Self::Error>;

    /// Returns all claims on the given items, with profiles joined where known.
    fn claims(&self, item_ids: &[ItemId]) -> Result<Vec<ItemClaim>, Self::Error>;
}

/// Fetches a receipt's rows through `source` and computes its breakdown.
///
/// Any error comes from the source; the computation itself cannot fail.
pub fn calculate_bill_breakdown<S: BillSource>(
    source: &S,
    receipt_id: &ReceiptId,
    options: DistributionOptions,
) -> Result<BillBreakdown, S::Error> {
    let receipt = source.receipt(receipt_id)?;
    let items = source.items(receipt_id)?;
    let item_ids: Vec<ItemId> = items.iter().map(|i| i.id.clone()).collect();
    let claims = if item_ids.is_empty() {
        Vec::new()
    } else {
        source.claims(&item_ids)?
    };

    tracing::debug!(
        receipt = %receipt_id,
        items = items.len(),
        claims = claims.len(),
        "computing bill breakdown"
    );

    let totals = ReceiptTotals::from_record(&receipt);
    Ok(compute_bill_breakdown(&items, &claims, &totals, options))
}

/// Returns `user_id`'s line of the breakdown, if they have claimed anything.
pub fn my_total<S: BillSource>(
    source: &S,
    receipt_id: &ReceiptId,
    user_id: &UserId,
    options: DistributionOptions,
) -> Result<Option<ParticipantTotal>, S::Error> {
    let breakdown = calculate_bill_breakdown(source, receipt_id, options)?;
    Ok(breakdown
        .participants
        .into_iter()
        .find(|p| &p.user_id == user_id))
}
