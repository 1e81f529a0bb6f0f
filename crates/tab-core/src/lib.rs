//! Bill settlement engine.
//!
//! This crate contains the pure logic for splitting a restaurant receipt:
//! - Aggregation: collapsing item claims into per-user spend and unclaimed value
//! - Distribution: sharing tax, tip and unclaimed items among claimants
//! - Breakdown: the sorted per-participant settlement report
//! - Claim planning: what a claim, split or "claim the rest" should write
//!
//! Nothing here performs I/O. Data comes in through [`BillSource`] or as
//! plain slices.

mod aggregate;
mod breakdown;
pub mod claims;
mod distribution;
pub mod receipt;
mod source;
pub mod types;

pub use aggregate::{ClaimAggregation, ClaimantItems, ClaimedItem, ItemTally, aggregate_claims};
pub use breakdown::{
    BillBreakdown, ParticipantTotal, UNKNOWN_USERNAME, assemble, compute_bill_breakdown,
};
pub use claims::{ClaimChange, ClaimError};
pub use distribution::{Share, Spend, distribute};
pub use receipt::{
    ItemClaim, ParsedItem, ParsedReceipt, Profile, ReceiptItem, ReceiptRecord, ReceiptTotals,
};
pub use source::{BillSource, calculate_bill_breakdown, my_total};
pub use types::{
    DistributionOptions, DistributionType, ItemId, ReceiptId, ReceiptStatus, UserId,
    ValidationError,
};
