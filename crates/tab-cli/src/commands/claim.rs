//! Claim editing commands: `claim`, `unclaim`, `claim-rest` and `split`.
//!
//! Each command plans its edit with [`tab_core::claims`], applies it to the
//! snapshot and writes the snapshot back. Only active receipts accept edits.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;

use tab_core::claims::{
    apply_change, claim_remaining, release_one, replace_item_claims, split_item, toggle_claim,
};
use tab_core::{ClaimChange, ReceiptItem, ReceiptStatus, UserId};

use super::util::{item_label, resolve_user};
use crate::Config;
use crate::snapshot::Snapshot;

#[derive(Debug, Args)]
pub struct ClaimArgs {
    /// Receipt snapshot file.
    pub snapshot: PathBuf,

    /// Item ID or name.
    pub item: String,

    /// Acting user (defaults to `user_id` from the config).
    #[arg(long)]
    pub user: Option<UserId>,
}

#[derive(Debug, Args)]
pub struct ClaimRestArgs {
    /// Receipt snapshot file.
    pub snapshot: PathBuf,

    /// Acting user (defaults to `user_id` from the config).
    #[arg(long)]
    pub user: Option<UserId>,
}

#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Receipt snapshot file.
    pub snapshot: PathBuf,

    /// Item ID or name.
    pub item: String,

    /// Users to split the item between.
    #[arg(required = true, num_args = 2..)]
    pub users: Vec<UserId>,
}

/// Claims one more unit of an item, or drops the claim once the user holds
/// everything available to them.
pub fn claim<W: Write>(writer: &mut W, args: &ClaimArgs, config: &Config) -> Result<()> {
    let user_id = resolve_user(args.user.as_ref(), config)?;
    let mut snapshot = load_active(&args.snapshot)?;
    let item = snapshot.find_item(&args.item)?.clone();

    let change = toggle_claim(&item, &snapshot.claims, &user_id)?;
    apply_change(&mut snapshot.claims, &item.id, &user_id, change);
    snapshot.ensure_profile(&user_id);
    snapshot.save(&args.snapshot)?;

    tracing::debug!(item = %item.id, user = %user_id, ?change, "claim toggled");
    report_change(writer, &item, change)
}

/// Gives back one unit of the user's claim on an item.
pub fn unclaim<W: Write>(writer: &mut W, args: &ClaimArgs, config: &Config) -> Result<()> {
    let user_id = resolve_user(args.user.as_ref(), config)?;
    let mut snapshot = load_active(&args.snapshot)?;
    let item = snapshot.find_item(&args.item)?.clone();

    let Some(change) = release_one(&snapshot.claims, &item.id, &user_id) else {
        bail!("you have not claimed {}", item.name);
    };
    apply_change(&mut snapshot.claims, &item.id, &user_id, change);
    snapshot.save(&args.snapshot)?;

    tracing::debug!(item = %item.id, user = %user_id, ?change, "claim released");
    report_change(writer, &item, change)
}

/// Claims everything nobody has claimed yet.
pub fn claim_rest<W: Write>(writer: &mut W, args: &ClaimRestArgs, config: &Config) -> Result<()> {
    let user_id = resolve_user(args.user.as_ref(), config)?;
    let mut snapshot = load_active(&args.snapshot)?;

    let changes = claim_remaining(&snapshot.items, &snapshot.claims, &user_id)?;
    for (item_id, change) in &changes {
        apply_change(&mut snapshot.claims, item_id, &user_id, *change);
    }
    snapshot.ensure_profile(&user_id);
    snapshot.save(&args.snapshot)?;

    tracing::debug!(user = %user_id, items = changes.len(), "claimed remaining items");
    writeln!(writer, "Claimed the rest of {} item(s)", changes.len())?;
    for (item_id, change) in &changes {
        let (Some(item), ClaimChange::Set(quantity)) =
            (snapshot.items.iter().find(|i| &i.id == item_id), change)
        else {
            continue;
        };
        writeln!(writer, "  {}", item_label(&item.name, *quantity))?;
    }
    Ok(())
}

/// Splits an item evenly, replacing whatever claims it had.
pub fn split<W: Write>(writer: &mut W, args: &SplitArgs) -> Result<()> {
    let mut snapshot = load_active(&args.snapshot)?;
    let item = snapshot.find_item(&args.item)?.clone();

    let replacement = split_item(&item, &args.users)?;
    for user_id in &args.users {
        snapshot.ensure_profile(user_id);
    }
    let shares: Vec<(String, f64)> = replacement
        .iter()
        .map(|c| (snapshot.display_name(&c.user_id).to_string(), c.quantity))
        .collect();
    replace_item_claims(&mut snapshot.claims, &item.id, replacement);
    snapshot.save(&args.snapshot)?;

    tracing::debug!(item = %item.id, ways = shares.len(), "item split");
    writeln!(writer, "Split {} between {} people", item.name, shares.len())?;
    for (name, quantity) in &shares {
        writeln!(writer, "  {}", item_label(name, *quantity))?;
    }
    Ok(())
}

fn load_active(path: &Path) -> Result<Snapshot> {
    let snapshot = Snapshot::load(path)?;
    match snapshot.receipt.status {
        ReceiptStatus::Active => Ok(snapshot),
        ReceiptStatus::Draft => bail!("receipt is still a draft: run `tab activate` first"),
        ReceiptStatus::Settled => bail!("receipt is settled and can no longer be edited"),
    }
}

fn report_change<W: Write>(writer: &mut W, item: &ReceiptItem, change: ClaimChange) -> Result<()> {
    match change {
        ClaimChange::Set(quantity) => {
            writeln!(writer, "Claimed {}", item_label(&item.name, quantity))?;
        }
        ClaimChange::Remove => writeln!(writer, "Unclaimed {}", item.name)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tab_core::{DistributionOptions, ItemId, calculate_bill_breakdown};

    use crate::snapshot::tests::sample_snapshot;

    fn write_sample(snapshot: &Snapshot) -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("receipt.json");
        snapshot.save(&path).unwrap();
        (temp, path)
    }

    fn claim_args(path: &Path, item: &str, user: &str) -> ClaimArgs {
        ClaimArgs {
            snapshot: path.to_path_buf(),
            item: item.to_string(),
            user: Some(UserId::new(user).unwrap()),
        }
    }

    fn quantity_of(path: &Path, item: &str, user: &str) -> Option<f64> {
        let snapshot = Snapshot::load(path).unwrap();
        snapshot
            .claims
            .iter()
            .find(|c| c.item_id.as_str() == item && c.user_id.as_str() == user)
            .map(|c| c.quantity)
    }

    #[test]
    fn claim_then_toggle_off() {
        let (_temp, path) = write_sample(&sample_snapshot());
        let mut output = Vec::new();

        claim(&mut output, &claim_args(&path, "bread", "carol"), &Config::default()).unwrap();
        assert_eq!(quantity_of(&path, "bread", "carol"), Some(1.0));

        claim(&mut output, &claim_args(&path, "Bread", "carol"), &Config::default()).unwrap();
        assert_eq!(quantity_of(&path, "bread", "carol"), Some(2.0));

        claim(&mut output, &claim_args(&path, "bread", "carol"), &Config::default()).unwrap();
        assert_eq!(quantity_of(&path, "bread", "carol"), None);

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Claimed Bread\nClaimed Bread (2)\nUnclaimed Bread\n"
        );
    }

    #[test]
    fn claimants_get_named_in_breakdown() {
        let mut snapshot = sample_snapshot();
        snapshot.claims.clear();
        snapshot.profiles.clear();
        let (_temp, path) = write_sample(&snapshot);
        let config = Config::default();

        claim(&mut std::io::sink(), &claim_args(&path, "steak", "alice"), &config).unwrap();
        let rest = ClaimRestArgs {
            snapshot: path.clone(),
            user: Some(UserId::new("bob").unwrap()),
        };
        claim_rest(&mut std::io::sink(), &rest, &config).unwrap();
        let args = SplitArgs {
            snapshot: path.clone(),
            item: "pasta".to_string(),
            users: vec![UserId::new("bob").unwrap(), UserId::new("carol").unwrap()],
        };
        split(&mut std::io::sink(), &args).unwrap();

        let snapshot = Snapshot::load(&path).unwrap();
        assert_eq!(snapshot.profiles.len(), 3);
        let breakdown = calculate_bill_breakdown(
            &snapshot,
            &snapshot.receipt.id,
            DistributionOptions::default(),
        )
        .unwrap();
        let mut names: Vec<&str> = breakdown.participants.iter().map(|p| p.name()).collect();
        names.sort_unstable();

        assert_eq!(names, ["alice", "bob", "carol"]);
    }

    #[test]
    fn claim_fully_claimed_item_fails() {
        let (_temp, path) = write_sample(&sample_snapshot());
        let err = claim(
            &mut std::io::sink(),
            &claim_args(&path, "steak", "bob"),
            &Config::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Steak has been fully claimed by others");
    }

    #[test]
    fn unclaim_steps_down() {
        let mut snapshot = sample_snapshot();
        snapshot.claims.push(tab_core::ItemClaim::new(
            ItemId::new("bread").unwrap(),
            UserId::new("bob").unwrap(),
            2.0,
        ));
        let (_temp, path) = write_sample(&snapshot);

        let args = claim_args(&path, "bread", "bob");
        let config = Config::default();

        unclaim(&mut std::io::sink(), &args, &config).unwrap();
        assert_eq!(quantity_of(&path, "bread", "bob"), Some(1.0));

        unclaim(&mut std::io::sink(), &args, &config).unwrap();
        assert_eq!(quantity_of(&path, "bread", "bob"), None);

        let err = unclaim(&mut std::io::sink(), &args, &config).unwrap_err();
        assert_eq!(err.to_string(), "you have not claimed Bread");
    }

    #[test]
    fn claim_rest_takes_remainders() {
        let (_temp, path) = write_sample(&sample_snapshot());
        let args = ClaimRestArgs {
            snapshot: path.clone(),
            user: Some(UserId::new("bob").unwrap()),
        };
        let mut output = Vec::new();
        claim_rest(&mut output, &args, &Config::default()).unwrap();

        assert_eq!(quantity_of(&path, "bread", "bob"), Some(2.0));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Claimed the rest of 1 item(s)\n  Bread (2)\n"
        );

        let err = claim_rest(&mut std::io::sink(), &args, &Config::default()).unwrap_err();
        assert_eq!(err.to_string(), "all items have already been claimed");
    }

    #[test]
    fn split_replaces_claims() {
        let (_temp, path) = write_sample(&sample_snapshot());
        let args = SplitArgs {
            snapshot: path.clone(),
            item: "steak".to_string(),
            users: vec![UserId::new("alice").unwrap(), UserId::new("bob").unwrap()],
        };
        let mut output = Vec::new();
        split(&mut output, &args).unwrap();

        assert_eq!(quantity_of(&path, "steak", "alice"), Some(0.5));
        assert_eq!(quantity_of(&path, "steak", "bob"), Some(0.5));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Split Steak between 2 people\n  Alice ½\n  bob ½\n"
        );
    }

    #[test]
    fn split_with_one_person_fails() {
        let (_temp, path) = write_sample(&sample_snapshot());
        let args = SplitArgs {
            snapshot: path,
            item: "steak".to_string(),
            users: vec![UserId::new("alice").unwrap(), UserId::new("alice").unwrap()],
        };
        let err = split(&mut std::io::sink(), &args).unwrap_err();
        assert_eq!(err.to_string(), "select at least 2 people to split Steak with");
    }

    #[test]
    fn draft_receipts_reject_edits() {
        let mut snapshot = sample_snapshot();
        snapshot.receipt.status = ReceiptStatus::Draft;
        let (_temp, path) = write_sample(&snapshot);

        let args = claim_args(&path, "bread", "bob");
        let err = claim(&mut std::io::sink(), &args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("tab activate"));
        assert_eq!(quantity_of(&path, "bread", "bob"), None);
    }
}
