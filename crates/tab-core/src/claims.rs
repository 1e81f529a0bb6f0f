//! Claim planning.
//!
//! Works out what a claim edit should be before anything is written. The
//! aggregator tolerates over-claiming; these helpers are where it is
//! prevented, by never planning more than the "available to claim" amount.

use std::collections::HashSet;

use thiserror::Error;

use crate::receipt::{ItemClaim, ReceiptItem};
use crate::types::{ItemId, UserId};

/// Reasons a claim edit cannot be planned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClaimError {
    /// Other users already hold every unit of the item.
    #[error("{item} has been fully claimed by others")]
    FullyClaimed { item: String },

    /// No item on the receipt has anything left to claim.
    #[error("all items have already been claimed")]
    NothingUnclaimed,

    /// A split needs at least two distinct people.
    #[error("select at least 2 people to split {item} with")]
    SplitNeedsTwo { item: String },
}

/// A planned edit to one user's claim on one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClaimChange {
    /// Create or update the claim with this quantity.
    Set(f64),
    /// Delete the claim.
    Remove,
}

/// Total quantity claimed on an item by everyone.
pub fn claimed_quantity(claims: &[ItemClaim], item_id: &ItemId) -> f64 {
    claims
        .iter()
        .filter(|c| &c.item_id == item_id)
        .map(|c| c.quantity)
        .sum()
}

/// The user's own claim on an item, if any.
pub fn own_claim<'a>(
    claims: &'a [ItemClaim],
    item_id: &ItemId,
    user_id: &UserId,
) -> Option<&'a ItemClaim> {
    claims
        .iter()
        .find(|c| &c.item_id == item_id && &c.user_id == user_id)
}

/// How much of `item` the user could hold: what is unclaimed plus what they
/// already have.
pub fn available_for(item: &ReceiptItem, claims: &[ItemClaim], user_id: &UserId) -> f64 {
    let mine = own_claim(claims, &item.id, user_id).map_or(0.0, |c| c.quantity);
    item.quantity_f64() - claimed_quantity(claims, &item.id) + mine
}

/// Plans a tap on an item: claim one more unit, or drop the claim once the
/// user already holds everything available to them.
pub fn toggle_claim(
    item: &ReceiptItem,
    claims: &[ItemClaim],
    user_id: &UserId,
) -> Result<ClaimChange, ClaimError> {
    let available = available_for(item, claims, user_id);
    match own_claim(claims, &item.id, user_id) {
        None if available <= 0.0 => Err(ClaimError::FullyClaimed {
            item: item.name.clone(),
        }),
        None => Ok(ClaimChange::Set(available.min(1.0))),
        Some(mine) if mine.quantity >= available => Ok(ClaimChange::Remove),
        Some(mine) => Ok(ClaimChange::Set((mine.quantity + 1.0).min(available))),
    }
}

/// Plans giving back one unit of the user's claim.
///
/// Returns `None` when the user holds no claim on the item.
pub fn release_one(
    claims: &[ItemClaim],
    item_id: &ItemId,
    user_id: &UserId,
) -> Option<ClaimChange> {
    let mine = own_claim(claims, item_id, user_id)?;
    if mine.quantity > 1.0 {
        Some(ClaimChange::Set(mine.quantity - 1.0))
    } else {
        Some(ClaimChange::Remove)
    }
}

/// Plans claiming everything nobody has claimed yet.
pub fn claim_remaining(
    items: &[ReceiptItem],
    claims: &[ItemClaim],
    user_id: &UserId,
) -> Result<Vec<(ItemId, ClaimChange)>, ClaimError> {
    let changes: Vec<(ItemId, ClaimChange)> = items
        .iter()
        .filter_map(|item| {
            let remaining = item.quantity_f64() - claimed_quantity(claims, &item.id);
            if remaining <= 0.0 {
                return None;
            }
            let mine = own_claim(claims, &item.id, user_id).map_or(0.0, |c| c.quantity);
            Some((item.id.clone(), ClaimChange::Set(mine + remaining)))
        })
        .collect();

    if changes.is_empty() {
        return Err(ClaimError::NothingUnclaimed);
    }
    Ok(changes)
}

/// Plans an equal split of the whole item between `users`.
///
/// Duplicate users are collapsed. The returned claims replace every existing
/// claim on the item; each user gets `item.quantity / n`.
#[expect(clippy::cast_precision_loss, reason = "split party sizes are small")]
pub fn split_item(item: &ReceiptItem, users: &[UserId]) -> Result<Vec<ItemClaim>, ClaimError> {
    let mut seen = HashSet::new();
    let users: Vec<&UserId> = users.iter().filter(|u| seen.insert(*u)).collect();
    if users.len() < 2 {
        return Err(ClaimError::SplitNeedsTwo {
            item: item.name.clone(),
        });
    }

    let each = item.quantity_f64() / users.len() as f64;
    Ok(users
        .into_iter()
        .map(|user_id| ItemClaim::new(item.id.clone(), user_id.clone(), each))
        .collect())
}

/// Applies a planned change with upsert semantics.
///
/// Keeps at most one claim per (item, user). Setting a non-positive quantity
/// removes the claim.
pub fn apply_change(
    claims: &mut Vec<ItemClaim>,
    item_id: &ItemId,
    user_id: &UserId,
    change: ClaimChange,
) {
    let existing = claims
        .iter()
        .position(|c| &c.item_id == item_id && &c.user_id == user_id);

    match (change, existing) {
        (ClaimChange::Set(quantity), Some(idx)) if quantity > 0.0 => {
            claims[idx].quantity = quantity;
        }
        (ClaimChange::Set(quantity), None) if quantity > 0.0 => {
            claims.push(ItemClaim::new(item_id.clone(), user_id.clone(), quantity));
        }
        (_, Some(idx)) => {
            claims.remove(idx);
        }
        (_, None) => {}
    }
}

/// Replaces every claim on `item_id` with `replacement`.
pub fn replace_item_claims(
    claims: &mut Vec<ItemClaim>,
    item_id: &ItemId,
    replacement: Vec<ItemClaim>,
) {
    claims.retain(|c| &c.item_id != item_id);
    claims.extend(replacement);
}
