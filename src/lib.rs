//! # American Options - Chain Valuation
//!
//! Values every strike of a listed option chain as an American option and
//! compares the model value against the last traded price.
//!
//! ## Overview
//!
//! For each strike of one (ticker, expiration, side):
//! - **Quote normalization**: provider strings to a canonical bid/ask/mid
//! - **Implied volatility**: provider value if plausible, else solved from the
//!   mid price with the closed-form Black-Scholes model
//! - **American value**: Cox-Ross-Rubinstein lattice with early exercise
//!
//! The risk-free rate is linearly interpolated over treasury yields at
//! 13 weeks, 5, 10 and 30 years, falling back to 3% when none are available.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use american_options::prelude::*;
//!
//! let quotes = vec![
//!     RawQuote::new("100.00").with_bid("4.10").with_ask("4.30").with_last("4.25"),
//!     RawQuote::new("105.00").with_bid("2.05").with_ask("--"),
//! ];
//!
//! let rate = interpolate_rate(0.5, &[RateAnchor::new(0.25, 0.05), RateAnchor::new(5.0, 0.04)]);
//! let chain = price_chain(100.0, 0.5, rate, OptionType::Call, "2025-06-20", &quotes).unwrap();
//!
//! for row in &chain.results {
//!     println!("{} {:.4} {:.2}", row.strike, row.implied_vol, row.american_value);
//! }
//! ```
//!
//! ## What This Crate Does NOT Do
//!
//! - Model dividends
//! - Fit volatility smiles (one implied volatility per strike)
//! - Cache or persist anything between requests

pub mod core;
pub mod data;
pub mod models;
pub mod pricing;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        interpolate_rate, normalize, parse_expiration, parse_number, time_to_maturity,
        ChainResult, ExerciseStyle, NormalizedQuote, OptionType, PricerError, PricerResult,
        PricingContext, QuoteRejection, RateAnchor, RateCurve, RawField, RawQuote, StrikeResult,
        VolSource, DEFAULT_RISK_FREE,
    };

    // Data fetching
    pub use crate::data::{
        fetch_rate_anchors, load_inputs, price_request, ChainListing, ChainRequest,
        LiveMarketData, MarketData, NasdaqClient, PricingInputs, YahooClient,
    };

    // Models
    pub use crate::models::{
        american_value, implied_volatility, implied_volatility_with, lattice_value, norm_cdf,
        price as bs_price, LatticeConfig, LatticeParams, SolverConfig,
    };

    // Pricing
    pub use crate::pricing::{price_chain, ChainConfig, ChainPricer, PricingConfig};
}

// Re-export main types at crate root
pub use crate::core::{PricerError, PricerResult};
pub use crate::pricing::{price_chain, ChainPricer, PricingConfig};
