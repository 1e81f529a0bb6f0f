//! Items command: what is left to claim.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use tab_core::{ItemId, UserId, aggregate_claims};

use super::util::{format_currency, format_fraction, item_label};
use crate::Config;
use crate::snapshot::Snapshot;

#[derive(Debug, Args)]
pub struct ItemsArgs {
    /// Receipt snapshot file.
    pub snapshot: PathBuf,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One claimer of an item.
#[derive(Debug, Serialize)]
struct Claimer<'a> {
    user_id: &'a UserId,
    name: &'a str,
    quantity: f64,
}

/// Claim status of one item.
#[derive(Debug, Serialize)]
struct ItemStatus<'a> {
    item_id: &'a ItemId,
    name: &'a str,
    quantity: u32,
    total_price: f64,
    claimed_quantity: f64,
    unclaimed_quantity: f64,
    claimers: Vec<Claimer<'a>>,
}

pub fn run<W: Write>(writer: &mut W, args: &ItemsArgs, config: &Config) -> Result<()> {
    let snapshot = Snapshot::load(&args.snapshot)?;
    let statuses = item_statuses(&snapshot);

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &statuses)?;
        writeln!(writer)?;
        return Ok(());
    }

    if statuses.is_empty() {
        writeln!(writer, "No items on this receipt.")?;
        return Ok(());
    }

    for status in &statuses {
        writeln!(
            writer,
            "{:<24}{:>8}{:>10}",
            status.name,
            format_fraction(status.claimed_quantity, status.quantity),
            format_currency(status.total_price, &config.currency_symbol)
        )?;
        for claimer in &status.claimers {
            writeln!(writer, "  {}", item_label(claimer.name, claimer.quantity))?;
        }
    }
    Ok(())
}

fn item_statuses(snapshot: &Snapshot) -> Vec<ItemStatus<'_>> {
    let aggregation = aggregate_claims(&snapshot.items, &snapshot.claims);

    snapshot
        .items
        .iter()
        .zip(&aggregation.items)
        .map(|(item, tally)| ItemStatus {
            item_id: &item.id,
            name: &item.name,
            quantity: item.quantity,
            total_price: item.total_price,
            claimed_quantity: tally.claimed_quantity,
            unclaimed_quantity: tally.unclaimed_quantity,
            claimers: snapshot
                .claims
                .iter()
                .filter(|c| c.item_id == item.id)
                .map(|c| Claimer {
                    user_id: &c.user_id,
                    name: snapshot.display_name(&c.user_id),
                    quantity: c.quantity,
                })
                .collect(),
        })
        .collect()
}
