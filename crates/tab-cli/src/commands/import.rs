//! Import command: turns receipt parser output into a draft snapshot.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Args;
use uuid::Uuid;

use tab_core::{ItemId, ParsedReceipt, ReceiptId, ReceiptRecord, ReceiptStatus, UserId};

use crate::snapshot::Snapshot;

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Parser output JSON (`-` for stdin).
    pub parsed: PathBuf,

    /// User who uploaded the receipt.
    #[arg(long)]
    pub owner: UserId,

    /// Snapshot file to create.
    #[arg(long)]
    pub out: PathBuf,

    /// Overwrite an existing snapshot.
    #[arg(long)]
    pub force: bool,
}

pub fn run<W: Write>(writer: &mut W, args: &ImportArgs) -> Result<()> {
    if args.out.exists() && !args.force {
        bail!(
            "{} already exists (use --force to overwrite)",
            args.out.display()
        );
    }

    let parsed = if args.parsed == Path::new("-") {
        parse_receipt(io::stdin().lock())?
    } else {
        let file = std::fs::File::open(&args.parsed)
            .with_context(|| format!("failed to open {}", args.parsed.display()))?;
        parse_receipt(file)?
    };

    let snapshot = build_snapshot(parsed, args.owner.clone())?;
    snapshot.save(&args.out)?;

    tracing::debug!(
        receipt = %snapshot.receipt.id,
        items = snapshot.items.len(),
        "imported receipt"
    );
    writeln!(
        writer,
        "Imported {} item(s) into {} (receipt {})",
        snapshot.items.len(),
        args.out.display(),
        snapshot.receipt.id
    )?;
    Ok(())
}

fn parse_receipt<R: Read>(reader: R) -> Result<ParsedReceipt> {
    serde_json::from_reader(reader).context("invalid parser output")
}

/// Builds a draft receipt with fresh IDs.
///
/// Items without a name are dropped; the rest are coerced the way the parser
/// output is stored.
fn build_snapshot(parsed: ParsedReceipt, owner_id: UserId) -> Result<Snapshot> {
    let receipt = ReceiptRecord {
        id: ReceiptId::new(Uuid::new_v4().to_string())?,
        owner_id: owner_id.clone(),
        restaurant_name: parsed.restaurant_name.filter(|n| !n.trim().is_empty()),
        receipt_date: parsed.date,
        subtotal: parsed.subtotal,
        tax: parsed.tax,
        tip_amount: parsed.tip,
        total: parsed.total,
        status: ReceiptStatus::Draft,
        created_at: Utc::now(),
    };

    let mut items = Vec::with_capacity(parsed.items.len());
    for item in parsed.items {
        if item.name.trim().is_empty() {
            tracing::debug!("skipping unnamed item");
            continue;
        }
        items.push(item.normalize(ItemId::new(Uuid::new_v4().to_string())?));
    }

    let mut snapshot = Snapshot {
        receipt,
        items,
        claims: Vec::new(),
        profiles: Vec::new(),
    };
    snapshot.ensure_profile(&owner_id);
    Ok(snapshot)
}
