//! Command-line tooling for deploygate
//!
//! Explains access decisions offline against a JSON snapshot of deployments
//! and validates policy files before they are deployed.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod config;

use commands::{
    check_config,
    predicate::{self, PredicateArgs},
    resolve::{self, ResolveArgs},
    visible::{self, VisibleArgs},
};

#[derive(Parser)]
#[command(name = "deploygate")]
#[command(about = "Deploygate - deployment-scoped access control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Policy file path
    #[arg(short, long, global = true, default_value = ".deploygate/policy.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the policy file and print the effective policy table
    CheckConfig,

    /// Resolve a caller's level on a deployment
    Resolve(ResolveArgs),

    /// Print the visibility predicate for a listing
    Predicate(PredicateArgs),

    /// Decide whether a single resource is visible
    Visible(VisibleArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    let engine_config = config::load(&cli.config)?;

    match cli.command {
        Commands::CheckConfig => check_config::run(&engine_config)?,
        Commands::Resolve(args) => resolve::run(args, &engine_config).await?,
        Commands::Predicate(args) => predicate::run(args, &engine_config).await?,
        Commands::Visible(args) => visible::run(args, &engine_config).await?,
    }

    Ok(())
}
