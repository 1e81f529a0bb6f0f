use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tab_cli::commands::{activate, breakdown, claim, import, items, mine};
use tab_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Import(args)) => import::run(&mut out, args)?,
        Some(Commands::Activate(args)) => activate::run(&mut out, args)?,
        Some(Commands::Items(args)) => items::run(&mut out, args, &config)?,
        Some(Commands::Claim(args)) => claim::claim(&mut out, args, &config)?,
        Some(Commands::Unclaim(args)) => claim::unclaim(&mut out, args, &config)?,
        Some(Commands::ClaimRest(args)) => claim::claim_rest(&mut out, args, &config)?,
        Some(Commands::Split(args)) => claim::split(&mut out, args)?,
        Some(Commands::Breakdown(args)) => breakdown::run(&mut out, args, &config)?,
        Some(Commands::Mine(args)) => mine::run(&mut out, args, &config)?,
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    out.flush()?;
    Ok(())
}
