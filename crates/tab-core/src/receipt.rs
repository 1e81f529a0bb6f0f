//! Receipt, line item and claim records.
//!
//! These mirror the rows the hosted store hands back. The settlement engine
//! only ever reads them; edits go through the claim planning helpers in
//! [`crate::claims`] and are written back by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ItemId, ReceiptId, ReceiptStatus, UserId};

/// A receipt row as stored.
///
/// Monetary fields are optional because the parser may not find them and the
/// user may not fill them in. Use [`ReceiptTotals::from_record`] to get the
/// coalesced values the engine works with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub id: ReceiptId,
    pub owner_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_date: Option<String>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub tip_amount: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub status: ReceiptStatus,
    pub created_at: DateTime<Utc>,
}

/// Receipt-level amounts after coalescing.
///
/// These are authoritative: the engine never recomputes them from the items
/// and does not reconcile drift between item totals and `subtotal`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReceiptTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub tip: f64,
    pub total: f64,
}

impl ReceiptTotals {
    /// Builds totals from possibly-missing amounts.
    ///
    /// Missing, negative and non-finite amounts become 0. A missing or zero
    /// `total` falls back to `subtotal + tax + tip`.
    pub fn from_parts(
        subtotal: Option<f64>,
        tax: Option<f64>,
        tip: Option<f64>,
        total: Option<f64>,
    ) -> Self {
        let subtotal = coalesce(subtotal);
        let tax = coalesce(tax);
        let tip = coalesce(tip);
        let total = match coalesce(total) {
            t if t > 0.0 => t,
            _ => subtotal + tax + tip,
        };
        Self {
            subtotal,
            tax,
            tip,
            total,
        }
    }

    pub fn from_record(record: &ReceiptRecord) -> Self {
        Self::from_parts(
            record.subtotal,
            record.tax,
            record.tip_amount,
            record.total,
        )
    }
}

fn coalesce(value: Option<f64>) -> f64 {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .unwrap_or(0.0)
}

/// A single line on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub id: ItemId,
    pub name: String,
    /// Number of units, at least 1.
    pub quantity: u32,
    pub unit_price: f64,
    /// As printed on the receipt; normally `quantity * unit_price`.
    pub total_price: f64,
}

impl ReceiptItem {
    /// Value of `quantity` units at this item's unit price.
    pub fn value_of(&self, quantity: f64) -> f64 {
        self.unit_price * quantity
    }

    pub fn quantity_f64(&self) -> f64 {
        f64::from(self.quantity)
    }
}

/// Minimal public profile joined onto claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// One user's claim on one item.
///
/// There is at most one claim per (item, user); the claimed amount is the
/// `quantity` field, which may be fractional when an item is split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemClaim {
    pub item_id: ItemId,
    pub user_id: UserId,
    pub quantity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
}

impl ItemClaim {
    pub const fn new(item_id: ItemId, user_id: UserId, quantity: f64) -> Self {
        Self {
            item_id,
            user_id,
            quantity,
            profile: None,
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }
}

/// Structured output of the receipt image parser.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedReceipt {
    #[serde(default)]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub items: Vec<ParsedItem>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub tip: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

/// A line item as reported by the parser, before coercion.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParsedItem {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub total_price: Option<f64>,
}

impl ParsedItem {
    /// Coerces parser output into a receipt item.
    ///
    /// Quantity defaults to 1, unit price to 0, and total price to the unit
    /// price when the parser left them out or reported zero.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "quantity is rounded, at least 1 and clamped to u32::MAX"
    )]
    pub fn normalize(self, id: ItemId) -> ReceiptItem {
        let quantity = self
            .quantity
            .filter(|q| q.is_finite() && *q >= 1.0)
            .map_or(1, |q| q.round().min(f64::from(u32::MAX)) as u32);
        let unit_price = coalesce(self.unit_price);
        let total_price = match coalesce(self.total_price) {
            t if t > 0.0 => t,
            _ => unit_price,
        };
        ReceiptItem {
            id,
            name: self.name.trim().to_string(),
            quantity,
            unit_price,
            total_price,
        }
    }
}
