//! Claim aggregation.
//!
//! Collapses the flat claim list of one receipt into per-user spend and
//! per-item claimed/unclaimed quantities.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

use crate::distribution::Spend;
use crate::receipt::{ItemClaim, Profile, ReceiptItem};
use crate::types::{ItemId, UserId};

/// One claim as shown on a participant's settlement card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimedItem {
    pub name: String,
    pub quantity: f64,
    /// `quantity * unit_price`, unrounded.
    pub amount: f64,
}

/// Everything one user has claimed on the receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimantItems {
    pub user_id: UserId,
    /// Profile joined onto the user's first claim, if any.
    pub profile: Option<Profile>,
    pub items_total: f64,
    pub claimed_items: Vec<ClaimedItem>,
}

/// Claimed and unclaimed quantity of one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemTally {
    pub item_id: ItemId,
    pub claimed_quantity: f64,
    pub unclaimed_quantity: f64,
}

/// Result of aggregating one receipt's claims.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClaimAggregation {
    /// Claimants in order of their first claim.
    pub claimants: IndexMap<UserId, ClaimantItems>,
    /// One tally per item, in item order.
    pub items: Vec<ItemTally>,
    /// Value of all unclaimed units.
    pub unclaimed_total: f64,
}

impl ClaimAggregation {
    /// Per-claimant spend, in claimant order.
    pub fn spends(&self) -> Vec<Spend> {
        self.claimants
            .values()
            .map(|c| Spend {
                user_id: c.user_id.clone(),
                items_total: c.items_total,
            })
            .collect()
    }
}

/// Aggregates claims against the receipt's items.
///
/// Claims that reference an item not in `items` are skipped; a user whose
/// only claims are such misses does not become a claimant. Over-claiming is
/// not rejected here: an item's unclaimed quantity simply bottoms out at 0.
pub fn aggregate_claims(items: &[ReceiptItem], claims: &[ItemClaim]) -> ClaimAggregation {
    let item_map: HashMap<&ItemId, &ReceiptItem> = items.iter().map(|i| (&i.id, i)).collect();
    let mut claimants: IndexMap<UserId, ClaimantItems> = IndexMap::new();
    let mut claimed_by_item: HashMap<&ItemId, f64> = HashMap::new();
    let mut skipped = 0usize;

    for claim in claims {
        let Some(&item) = item_map.get(&claim.item_id) else {
            skipped += 1;
            continue;
        };

        *claimed_by_item.entry(&item.id).or_insert(0.0) += claim.quantity;

        let amount = item.value_of(claim.quantity);
        let entry = claimants
            .entry(claim.user_id.clone())
            .or_insert_with(|| ClaimantItems {
                user_id: claim.user_id.clone(),
                profile: claim.profile.clone(),
                items_total: 0.0,
                claimed_items: Vec::new(),
            });
        entry.items_total += amount;
        entry.claimed_items.push(ClaimedItem {
            name: item.name.clone(),
            quantity: claim.quantity,
            amount,
        });
    }

    if skipped > 0 {
        tracing::debug!(skipped, "ignored claims referencing unknown items");
    }

    let mut unclaimed_total = 0.0;
    let tallies = items
        .iter()
        .map(|item| {
            let claimed = claimed_by_item.get(&item.id).copied().unwrap_or(0.0);
            let unclaimed = (item.quantity_f64() - claimed).max(0.0);
            if unclaimed > 0.0 {
                unclaimed_total += item.value_of(unclaimed);
            }
            ItemTally {
                item_id: item.id.clone(),
                claimed_quantity: claimed,
                unclaimed_quantity: unclaimed,
            }
        })
        .collect();

    ClaimAggregation {
        claimants,
        items: tallies,
        unclaimed_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, name: &str, quantity: u32, unit_price: f64) -> ReceiptItem {
        ReceiptItem {
            id: ItemId::new(id).unwrap(),
            name: name.to_string(),
            quantity,
            unit_price,
            total_price: f64::from(quantity) * unit_price,
        }
    }

    fn claim(item_id: &str, user_id: &str, quantity: f64) -> ItemClaim {
        ItemClaim::new(
            ItemId::new(item_id).unwrap(),
            UserId::new(user_id).unwrap(),
            quantity,
        )
    }

    fn uid(s: &str) -> UserId {
        UserId::new(s).unwrap()
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "small binary-exact amounts")]
    fn sums_claims_per_user() {
        let items = vec![item("burger", "Burger", 2, 12.0), item("beer", "Beer", 3, 6.0)];
        let claims = vec![
            claim("burger", "alice", 1.0),
            claim("beer", "alice", 2.0),
            claim("burger", "bob", 1.0),
            claim("beer", "bob", 1.0),
        ];

        let agg = aggregate_claims(&items, &claims);

        assert_eq!(agg.claimants.len(), 2);
        let alice = &agg.claimants[&uid("alice")];
        assert_eq!(alice.items_total, 24.0);
        assert_eq!(alice.claimed_items.len(), 2);
        assert_eq!(alice.claimed_items[1].name, "Beer");
        assert_eq!(alice.claimed_items[1].amount, 12.0);
        assert_eq!(agg.claimants[&uid("bob")].items_total, 18.0);
        assert_eq!(agg.unclaimed_total, 0.0);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "small binary-exact amounts")]
    fn computes_unclaimed_remainder() {
        let items = vec![item("nachos", "Nachos", 2, 8.0), item("wings", "Wings", 1, 10.0)];
        let claims = vec![claim("nachos", "alice", 1.0)];

        let agg = aggregate_claims(&items, &claims);

        assert_eq!(agg.unclaimed_total, 18.0);
        assert_eq!(agg.items[0].claimed_quantity, 1.0);
        assert_eq!(agg.items[0].unclaimed_quantity, 1.0);
        assert_eq!(agg.items[1].unclaimed_quantity, 1.0);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "small binary-exact amounts")]
    fn fractional_split_claims() {
        let items = vec![item("pizza", "Pizza", 1, 20.0)];
        let claims = vec![claim("pizza", "alice", 0.5), claim("pizza", "bob", 0.5)];

        let agg = aggregate_claims(&items, &claims);

        assert_eq!(agg.claimants[&uid("alice")].items_total, 10.0);
        assert_eq!(agg.claimants[&uid("bob")].items_total, 10.0);
        assert_eq!(agg.unclaimed_total, 0.0);
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "small binary-exact amounts")]
    fn over_claiming_leaves_no_negative_remainder() {
        let items = vec![item("soda", "Soda", 1, 3.0)];
        let claims = vec![claim("soda", "alice", 1.0), claim("soda", "bob", 1.0)];

        let agg = aggregate_claims(&items, &claims);

        assert_eq!(agg.items[0].claimed_quantity, 2.0);
        assert_eq!(agg.items[0].unclaimed_quantity, 0.0);
        assert_eq!(agg.unclaimed_total, 0.0);
        assert_eq!(agg.claimants[&uid("bob")].items_total, 3.0);
    }

    #[test]
    fn skips_claims_for_unknown_items() {
        let items = vec![item("salad", "Salad", 1, 9.0)];
        let claims = vec![claim("ghost", "carol", 1.0), claim("salad", "alice", 1.0)];

        let agg = aggregate_claims(&items, &claims);

        assert_eq!(agg.claimants.len(), 1);
        assert!(!agg.claimants.contains_key(&uid("carol")));
    }

    #[test]
    #[expect(clippy::float_cmp, reason = "small binary-exact amounts")]
    fn no_claims_leaves_everything_unclaimed() {
        let items = vec![item("a", "A", 2, 5.0), item("b", "B", 1, 7.5)];

        let agg = aggregate_claims(&items, &[]);

        assert!(agg.claimants.is_empty());
        assert_eq!(agg.unclaimed_total, 17.5);
    }

    #[test]
    fn claimants_keep_first_claim_order_and_profile() {
        let items = vec![item("a", "A", 3, 1.0)];
        let profile = Profile {
            id: uid("bob"),
            username: Some("bobby".to_string()),
            display_name: None,
            avatar_url: None,
        };
        let claims = vec![
            claim("a", "bob", 1.0).with_profile(profile.clone()),
            claim("a", "alice", 1.0),
        ];

        let agg = aggregate_claims(&items, &claims);

        let order: Vec<&str> = agg.claimants.keys().map(UserId::as_str).collect();
        assert_eq!(order, vec!["bob", "alice"]);
        assert_eq!(agg.claimants[&uid("bob")].profile, Some(profile));
        assert_eq!(agg.spends()[0].user_id, uid("bob"));
    }
}
