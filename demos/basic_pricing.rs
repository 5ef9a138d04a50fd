//! Example: price an in-memory option chain
//!
//! Run with: cargo run --example basic_pricing

use american_options::prelude::*;

fn main() {
    let spot = 100.0;
    let time = 0.5; // 6 months

    // Treasury anchors as a provider would return them; 30y is missing
    let anchors = [
        RateAnchor::new(10.0, 0.042),
        RateAnchor::new(0.25, 0.052),
        RateAnchor::new(5.0, 0.040),
    ];
    let rate = interpolate_rate(time, &anchors);

    println!("=== Inputs ===\n");
    println!("Spot:     ${:.2}", spot);
    println!("Time:     {:.2} years ({:.0} days)", time, time * 365.0);
    println!("Rate:     {:.3}%\n", rate * 100.0);

    // Closed form vs lattice for an ATM put
    let european = bs_price(spot, 100.0, rate, 0.25, time, OptionType::Put);
    let american = american_value(spot, 100.0, rate, 0.25, time, OptionType::Put, &LatticeConfig::default())
        .expect("valid lattice inputs");
    println!("=== ATM Put, 25% vol ===\n");
    println!("European: ${:.4}", european);
    println!("American: ${:.4}", american);
    println!("Early exercise premium: ${:.4}\n", american - european);

    let quotes = vec![
        RawQuote::new("90.00").with_bid("0.95").with_ask("1.05").with_last("1.00"),
        RawQuote::new("95.00").with_bid("2.10").with_ask("2.30").with_last("2.25"),
        RawQuote::new("100.00").with_bid("$4.40").with_ask("4.60").with_implied_vol(0.24),
        RawQuote::new("105.00").with_bid("7.60").with_ask("--").with_last("7.70"),
        RawQuote::new("110.00").with_bid("--").with_ask("--"),
    ];

    println!("=== Put Chain ===\n");
    match price_chain(spot, time, rate, OptionType::Put, "2025-06-20", &quotes) {
        Ok(chain) => {
            for row in &chain.results {
                println!(
                    "K={:>6.2}  mid={:>6.3}  iv={:>6.2}% ({:?})  american={:>7.4}  diff={}",
                    row.strike,
                    row.mid_price,
                    row.implied_vol * 100.0,
                    row.vol_source,
                    row.american_value,
                    row.percent_difference
                        .map(|d| format!("{:.2}%", d))
                        .unwrap_or_else(|| "-".into()),
                );
            }
        }
        Err(e) => println!("Could not price chain: {}", e),
    }
}
