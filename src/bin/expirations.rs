//! List option expirations for a ticker

use std::process::ExitCode;

use american_options::prelude::*;
use clap::Parser;

/// List the expiration dates with listed options
#[derive(Parser)]
#[command(name = "expirations")]
#[command(version)]
struct Cli {
    /// Underlying ticker, e.g. AAPL
    ticker: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let ticker = cli.ticker.trim().to_uppercase();
    let result = LiveMarketData::new().and_then(|source| source.expirations(&ticker));

    match result {
        Ok(expiries) => {
            for (i, expiry) in expiries.iter().enumerate() {
                println!("{:>3}: {}", i + 1, expiry.format("%Y-%m-%d"));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
