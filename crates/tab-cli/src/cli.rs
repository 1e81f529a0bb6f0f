//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::activate::ActivateArgs;
use crate::commands::breakdown::BreakdownArgs;
use crate::commands::claim::{ClaimArgs, ClaimRestArgs, SplitArgs};
use crate::commands::import::ImportArgs;
use crate::commands::items::ItemsArgs;
use crate::commands::mine::MineArgs;

/// Split a restaurant bill.
///
/// Works on receipt snapshots: claim what you ate, then see who owes what,
/// with tax, tip and unclaimed items shared out.
#[derive(Debug, Parser)]
#[command(name = "tab", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a draft receipt from parser output.
    Import(ImportArgs),

    /// Open a draft receipt for claiming.
    Activate(ActivateArgs),

    /// Show what is claimed and what is left.
    Items(ItemsArgs),

    /// Claim one more of an item, or drop the claim when you hold it all.
    Claim(ClaimArgs),

    /// Give back one of an item.
    Unclaim(ClaimArgs),

    /// Claim everything nobody has claimed yet.
    ClaimRest(ClaimRestArgs),

    /// Split an item evenly between people.
    Split(SplitArgs),

    /// Show who owes what.
    Breakdown(BreakdownArgs),

    /// Show what you owe.
    Mine(MineArgs),
}
