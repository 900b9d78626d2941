//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod backfill;
pub mod config;
pub mod import;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Retail siting backend
#[derive(Parser)]
#[command(name = "retail-siting")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Load the bulk address file into the database
    Import(import::ImportArgs),

    /// Geocode every address still missing coordinates
    Backfill(backfill::BackfillArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show backfill status of a running server
    Status(status::StatusArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Import(args) => import::run(args).await,
        Commands::Backfill(args) => backfill::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
    }
}

/// Initialize logging, honoring `RUST_LOG` and defaulting to `info`
pub(crate) fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
