//! retail-siting CLI entry point
//!
//! Retail siting backend - CLI + web API

use retail_siting::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
