//! CLI subcommand implementations.

pub mod activate;
pub mod breakdown;
pub mod claim;
pub mod import;
pub mod items;
pub mod mine;
mod util;
