//! Import command handler
//!
//! Loads the bulk address CSV into the database.

use crate::config::Config;
use crate::error::Result;
use crate::store::import::{import_file, import_if_empty, CoordinateColumns};
use crate::store::AddressStore;
use clap::Args;
use std::path::PathBuf;

/// Import command arguments
#[derive(Args)]
pub struct ImportArgs {
    /// CSV file to load (defaults to database.csv_path)
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Import even if the table already has rows
    #[arg(long)]
    pub force: bool,

    /// Treat x/y columns as longitude/latitude instead of projected meters
    #[arg(long)]
    pub geographic: bool,
}

/// Run the import command
pub async fn run(args: ImportArgs) -> Result<()> {
    super::init_logging();

    let mut config = Config::load()?;
    if args.geographic {
        config.database.csv_projected = false;
    }

    let path = args
        .file
        .unwrap_or_else(|| PathBuf::from(&config.database.csv_path));
    let columns = CoordinateColumns::from_config(&config);
    let store = AddressStore::connect(&config.database.url).await?;

    let summary = if args.force {
        Some(import_file(&store, &path, &columns).await?)
    } else {
        import_if_empty(&store, &path, &columns).await?
    };
    store.close().await;

    match summary {
        Some(summary) => {
            println!("Read:                {}", summary.read);
            println!("Inserted:            {}", summary.inserted);
            println!("Without coordinates: {}", summary.without_coordinates);
        }
        None => println!("Nothing imported (table already populated or file missing; use --force)"),
    }

    Ok(())
}
