//! Market data retrieval
//!
//! Handles:
//! - Nasdaq option chains (strikes, bid/ask/last, underlying last trade)
//! - Yahoo Finance spot fallback and treasury yields
//! - Assembling the inputs of one chain pricing request
//!
//! Everything here runs before the pricer and is the only place doing I/O.

pub mod nasdaq;
pub mod yahoo;

pub use nasdaq::*;
pub use yahoo::*;

use chrono::NaiveDate;

use crate::core::{
    parse_expiration, time_to_maturity, ChainResult, OptionType, PricerError, PricerResult,
    PricingContext, RateAnchor, RateCurve, RawQuote,
};
use crate::pricing::{ChainPricer, PricingConfig};

/// Treasury yield indices and their maturities in years
pub const TREASURY_TENORS: [(f64, &str); 4] = [
    (0.25, "^IRX"), // 13-week
    (5.0, "^FVX"),  // 5-year
    (10.0, "^TNX"), // 10-year
    (30.0, "^TYX"), // 30-year
];

/// Raw quotes for one (ticker, expiration, side)
#[derive(Debug, Clone, Default)]
pub struct ChainListing {
    pub quotes: Vec<RawQuote>,
    /// Underlying price reported alongside the chain, if any
    pub underlying_price: Option<f64>,
}

/// Source of everything a chain pricing request needs
pub trait MarketData {
    /// Available expirations for a ticker
    fn expirations(&self, ticker: &str) -> PricerResult<Vec<NaiveDate>>;

    fn option_chain(
        &self,
        ticker: &str,
        expiry: NaiveDate,
        option_type: OptionType,
    ) -> PricerResult<ChainListing>;

    /// Spot price when the chain listing carries none
    fn spot_price(&self, ticker: &str) -> PricerResult<f64>;

    /// Treasury yield as a decimal
    fn treasury_yield(&self, symbol: &str) -> PricerResult<f64>;
}

/// Live Nasdaq + Yahoo market data
pub struct LiveMarketData {
    nasdaq: NasdaqClient,
    yahoo: YahooClient,
}

impl LiveMarketData {
    pub fn new() -> PricerResult<Self> {
        Ok(Self {
            nasdaq: NasdaqClient::new()?,
            yahoo: YahooClient::new()?,
        })
    }
}

impl MarketData for LiveMarketData {
    fn expirations(&self, ticker: &str) -> PricerResult<Vec<NaiveDate>> {
        let data = self.nasdaq.option_data(ticker)?;
        let expiries = expirations_from_rows(data.rows());
        if expiries.is_empty() {
            return Err(PricerError::data(format!(
                "No option expiration dates found for ticker {}. This ticker may not have options available.",
                ticker
            )));
        }
        Ok(expiries)
    }

    fn option_chain(
        &self,
        ticker: &str,
        expiry: NaiveDate,
        option_type: OptionType,
    ) -> PricerResult<ChainListing> {
        let data = self.nasdaq.option_data(ticker)?;
        let quotes = rows_for_expiration(data.rows(), expiry)
            .into_iter()
            .map(|row| row.to_raw_quote(option_type))
            .collect();

        Ok(ChainListing {
            quotes,
            underlying_price: data.last_trade_price(),
        })
    }

    fn spot_price(&self, ticker: &str) -> PricerResult<f64> {
        self.yahoo.spot_price(ticker)
    }

    fn treasury_yield(&self, symbol: &str) -> PricerResult<f64> {
        self.yahoo.treasury_yield(symbol)
    }
}

/// Fetch every treasury anchor independently; failures drop the anchor
pub fn fetch_rate_anchors<M: MarketData + ?Sized>(source: &M) -> Vec<RateAnchor> {
    TREASURY_TENORS
        .iter()
        .filter_map(|&(maturity, symbol)| match source.treasury_yield(symbol) {
            Ok(rate) => Some(RateAnchor::new(maturity, rate)),
            Err(e) => {
                tracing::warn!("Dropping {} rate anchor ({}y): {}", symbol, maturity, e);
                None
            }
        })
        .collect()
}

/// What to price
#[derive(Debug, Clone)]
pub struct ChainRequest {
    pub ticker: String,
    /// `YYYY-MM-DD`
    pub expiration: String,
    pub option_type: OptionType,
}

impl ChainRequest {
    pub fn new(ticker: &str, expiration: &str, option_type: OptionType) -> PricerResult<Self> {
        let ticker = ticker.trim().to_uppercase();
        if ticker.is_empty() {
            return Err(PricerError::invalid_input("Ticker is required"));
        }
        Ok(Self {
            ticker,
            expiration: expiration.trim().to_string(),
            option_type,
        })
    }
}

/// Fully resolved inputs for the chain pricer
#[derive(Debug, Clone)]
pub struct PricingInputs {
    pub context: PricingContext,
    pub expiration: String,
    pub quotes: Vec<RawQuote>,
    pub anchors: Vec<RateAnchor>,
}

/// Gather spot, maturity, rate and quotes for a request.
///
/// Maturity is checked before any fetching. The rate falls back to
/// `config.chain.default_rate` when no treasury anchor is available.
pub fn load_inputs<M: MarketData + ?Sized>(
    source: &M,
    request: &ChainRequest,
    today: NaiveDate,
    config: &PricingConfig,
) -> PricerResult<PricingInputs> {
    let expiry = parse_expiration(&request.expiration)?;
    let time = time_to_maturity(expiry, today)?;

    let listing = source.option_chain(&request.ticker, expiry, request.option_type)?;
    if listing.quotes.is_empty() {
        return Err(PricerError::no_usable_data(format!(
            "No option contracts found for {} on {}.",
            request.ticker, request.expiration
        )));
    }

    let spot = match listing.underlying_price {
        Some(price) if price > 0.0 => price,
        _ => source.spot_price(&request.ticker)?,
    };

    let anchors = fetch_rate_anchors(source);
    let curve = RateCurve::with_fallback(anchors.iter().copied(), config.chain.default_rate);
    let rate = curve.rate(time);
    if curve.is_empty() {
        tracing::warn!("No treasury yields available, using default rate {}", rate);
    }

    let context = PricingContext::new(spot, time, rate, request.option_type)?;
    tracing::info!(
        ticker = %request.ticker,
        spot,
        time,
        rate,
        anchors = anchors.len(),
        "loaded pricing inputs"
    );

    Ok(PricingInputs {
        context,
        expiration: expiry.format("%Y-%m-%d").to_string(),
        quotes: listing.quotes,
        anchors,
    })
}

/// Load inputs for a request and price the chain
pub fn price_request<M: MarketData + ?Sized>(
    source: &M,
    request: &ChainRequest,
    today: NaiveDate,
    config: &PricingConfig,
) -> PricerResult<ChainResult> {
    let inputs = load_inputs(source, request, today, config)?;
    ChainPricer::new(config.clone()).price_chain(&inputs.context, &inputs.expiration, &inputs.quotes)
}
