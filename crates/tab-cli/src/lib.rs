//! Bill splitting CLI library.
//!
//! This crate provides the CLI interface for the settlement engine in
//! `tab-core`, working on receipt snapshot files.

mod cli;
pub mod commands;
mod config;
pub mod snapshot;

pub use cli::{Cli, Commands};
pub use config::Config;
