//! Price an option chain as American options
//!
//! Fetches the chain from Nasdaq, spot and treasury yields from Yahoo, and
//! prints one row per strike.

use std::path::PathBuf;
use std::process::ExitCode;

use american_options::prelude::*;
use chrono::Local;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Value every strike of an option chain with a CRR lattice
#[derive(Parser)]
#[command(name = "price_chain")]
#[command(version)]
#[command(about = "Value listed options as American options and compare with last trades")]
struct Cli {
    /// Underlying ticker, e.g. AAPL
    ticker: String,

    /// call or put
    option_type: String,

    /// Expiration date (YYYY-MM-DD)
    expiration: String,

    /// TOML pricing config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Price strikes in parallel
    #[arg(long)]
    parallel: bool,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn init_logging(&self) {
        let level = match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Failed to set tracing subscriber: {}", e);
        }
    }
}

fn run(cli: &Cli) -> PricerResult<()> {
    let mut config = match &cli.config {
        Some(path) => PricingConfig::from_file(path)?,
        None => PricingConfig::default(),
    };
    if cli.parallel {
        config.chain.parallel = true;
    }

    let option_type: OptionType = cli.option_type.parse()?;
    let request = ChainRequest::new(&cli.ticker, &cli.expiration, option_type)?;
    let source = LiveMarketData::new()?;
    let today = Local::now().date_naive();

    let chain = price_request(&source, &request, today, &config)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&chain)
            .map_err(|e| PricerError::Serialization(e.to_string()))?;
        println!("{}", json);
    } else {
        print_table(&request.ticker, &chain);
    }
    Ok(())
}

fn print_table(ticker: &str, chain: &ChainResult) {
    println!("{} {} expiring {}", ticker, chain.option_type, chain.expiration);
    println!("  Spot:  ${:.2}", chain.current_price);
    println!("  T:     {:.4} years", chain.time_to_maturity);
    println!("  Rate:  {:.3}%\n", chain.risk_free_rate * 100.0);

    println!(
        "{:>10} {:>9} {:>9} {:>9} {:>8} {:>9} {:>10} {:>9}",
        "Strike", "Bid", "Ask", "Mid", "IV", "Last", "American", "% Diff"
    );
    for row in &chain.results {
        let last = row.last_price.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".into());
        let diff = row
            .percent_difference
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "-".into());
        let iv_flag = match row.vol_source {
            VolSource::Provider => "*",
            VolSource::Solved => "",
        };

        println!(
            "{:>10.2} {:>9.2} {:>9.2} {:>9.3} {:>7.2}%{} {:>9} {:>10.4} {:>9}",
            row.strike,
            row.bid,
            row.ask,
            row.mid_price,
            row.implied_vol * 100.0,
            iv_flag,
            last,
            row.american_value,
            diff
        );
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.init_logging();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
