//! Status command handler
//!
//! Asks a running server for its backfill status.

use crate::backfill::JobStatus;
use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Server address (defaults to server.host:server.port)
    #[arg(long)]
    pub server: Option<String>,

    /// Start a backfill run instead of only reporting
    #[arg(long)]
    pub trigger: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;
    let addr = args.server.unwrap_or_else(|| config.server_addr());
    let url = format!("http://{}/admin/backfill", addr);

    println!("retail-siting v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let client = reqwest::Client::new();
    let request = if args.trigger {
        client.post(&url)
    } else {
        client.get(&url)
    };

    let response = match request.send().await {
        Ok(response) => response,
        Err(_) => {
            println!("Server: NOT RUNNING on {}", addr);
            return Ok(());
        }
    };

    let code = response.status();
    println!("Server: RUNNING on {}", addr);
    if code == reqwest::StatusCode::CONFLICT {
        println!("  A backfill run is already in progress");
        return Ok(());
    }
    if !code.is_success() {
        println!("  Error: status {}", code);
        return Ok(());
    }

    let status: JobStatus = response.json().await?;
    print_status(&status);
    Ok(())
}

fn print_status(status: &JobStatus) {
    println!();
    println!("Backfill: {}", status.state);
    println!("  Runs: {}", status.runs);
    if let Some(run_id) = status.run_id {
        println!("  Run id: {}", run_id);
    }
    if let Some(started) = status.started_at {
        println!("  Started:  {}", started.to_rfc3339());
    }
    if let Some(finished) = status.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(summary) = status.last_summary {
        println!(
            "  Last run: {} scanned, {} updated, {} failed",
            summary.scanned, summary.updated, summary.failed
        );
    }
    if let Some(error) = &status.last_error {
        println!("  Last error: {}", error);
    }
}
