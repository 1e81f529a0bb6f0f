//! Mine command: the acting user's own total.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use tab_core::{DistributionType, UserId, my_total};

use super::util::{format_currency, item_label, resolve_user};
use crate::Config;
use crate::snapshot::Snapshot;

#[derive(Debug, Args)]
pub struct MineArgs {
    /// Receipt snapshot file.
    pub snapshot: PathBuf,

    /// User to show (defaults to `user_id` from the config).
    #[arg(long)]
    pub user: Option<UserId>,

    /// How to share tax (proportional or equal).
    #[arg(long)]
    pub tax: Option<DistributionType>,

    /// How to share tip (proportional or equal).
    #[arg(long)]
    pub tip: Option<DistributionType>,
}

pub fn run<W: Write>(writer: &mut W, args: &MineArgs, config: &Config) -> Result<()> {
    let user_id = resolve_user(args.user.as_ref(), config)?;
    let snapshot = Snapshot::load(&args.snapshot)?;
    let options = config.distribution(args.tax, args.tip);
    let money = |amount: f64| format_currency(amount, &config.currency_symbol);

    let Some(mine) = my_total(&snapshot, &snapshot.receipt.id, &user_id, options)
        .context("failed to load bill breakdown")?
    else {
        writeln!(writer, "You haven't claimed any items yet.")?;
        return Ok(());
    };

    writeln!(writer, "You owe {}", money(mine.total_owed))?;
    for item in &mine.claimed_items {
        writeln!(
            writer,
            "  {}: {}",
            item_label(&item.name, item.quantity),
            money(item.amount)
        )?;
    }
    writeln!(writer, "  Items incl. unclaimed share: {}", money(mine.items_total))?;
    writeln!(writer, "  Tax: {}", money(mine.tax_portion))?;
    writeln!(writer, "  Tip: {}", money(mine.tip_portion))?;
    Ok(())
}
