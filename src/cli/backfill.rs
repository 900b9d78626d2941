//! Backfill command handler
//!
//! Runs one coordinate backfill in the foreground and prints its summary.

use crate::backfill::run_once;
use crate::config::Config;
use crate::error::Result;
use crate::provider::ncp::NcpMapsClient;
use crate::store::AddressStore;
use clap::Args;
use std::time::Duration;

/// Backfill command arguments
#[derive(Args)]
pub struct BackfillArgs {
    /// Delay between geocoder calls in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

/// Run the backfill command
pub async fn run(args: BackfillArgs) -> Result<()> {
    super::init_logging();

    let config = Config::load()?;
    let delay = Duration::from_millis(args.delay_ms.unwrap_or(config.backfill.delay_ms));

    let store = AddressStore::connect(&config.database.url).await?;
    let geocoder = NcpMapsClient::new(&config.providers)?;

    let result = run_once(&store, &geocoder, delay).await;
    store.close().await;
    let summary = result?;

    println!("Scanned: {}", summary.scanned);
    println!("Updated: {}", summary.updated);
    println!("Failed:  {}", summary.failed);

    Ok(())
}
