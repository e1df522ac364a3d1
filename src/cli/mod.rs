//! Command-line interface for expcompose
//!
//! Provides `compose`, `sweep`, `summary` and `list` subcommands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use expcompose::config::{load_settings, merge_cli_with_settings, CliOverrides};

mod compose;
mod list;
mod summary;
mod sweep;
mod utils;

/// Compose layered experiment configurations
#[derive(Parser)]
#[command(name = "expcompose")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (expcompose.toml or .expcompose.yml)
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Configuration directory holding bases and group variants
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose and print a resolved configuration
    Compose(compose::ComposeArgs),

    /// Compose every combination of comma-separated choices ('-o data=mnist,cifar -s seed=1,2')
    Sweep(sweep::SweepArgs),

    /// Print the keys a training driver reads from the resolved configuration
    Summary(summary::SummaryArgs),

    /// List bases, groups and variants
    List(list::ListArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let work_dir = std::env::current_dir().context("Cannot determine working directory")?;
    let settings = load_settings(&work_dir, cli.settings.as_deref())?;
    let settings = merge_cli_with_settings(
        settings,
        CliOverrides { config_dir: cli.config_dir, ..CliOverrides::default() },
    );
    tracing::debug!("Using configuration directory {}", settings.config_dir.display());

    match cli.command {
        Commands::Compose(args) => compose::run(args, settings),
        Commands::Sweep(args) => sweep::run(args, settings),
        Commands::Summary(args) => summary::run(args, settings),
        Commands::List(args) => list::run(args, settings),
    }
}
