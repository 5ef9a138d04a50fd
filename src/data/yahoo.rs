//! Yahoo Finance data fetcher
//!
//! Uses the chart endpoint's metadata for two things:
//! - the underlying's spot price, when the option-chain source has none
//! - treasury yield indices (^IRX, ^FVX, ^TNX, ^TYX), quoted in percent
//!
//! Note: This is for educational/research purposes. Yahoo Finance
//! data is delayed ~15 minutes and intended for personal use.

use serde::Deserialize;

use crate::core::{PricerError, PricerResult};

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Yahoo Finance API client
pub struct YahooClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new() -> PricerResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| PricerError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: YAHOO_CHART_URL.to_string(),
        })
    }

    /// Chart metadata for a symbol
    pub fn chart_meta(&self, symbol: &str) -> PricerResult<ChartMeta> {
        let url = format!("{}/{}", self.base_url, encode_symbol(symbol));

        let response = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .header("Accept", "application/json, text/plain, */*")
            .send()
            .map_err(|e| PricerError::network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(PricerError::network(
                "Yahoo Finance rate limit reached. Please wait a minute before trying again.",
            ));
        }
        if !status.is_success() {
            return Err(PricerError::network(format!(
                "Yahoo Finance request failed ({})",
                status.as_u16()
            )));
        }

        let body: YahooChartResponse = response.json().map_err(|e| {
            PricerError::data(format!("Yahoo Finance returned invalid JSON: {}", e))
        })?;

        body.chart
            .result
            .and_then(|r| r.into_iter().next())
            .map(|r| r.meta)
            .ok_or_else(|| PricerError::data(format!("Unable to fetch chart data for {}", symbol)))
    }

    /// Current price of the underlying
    pub fn spot_price(&self, symbol: &str) -> PricerResult<f64> {
        self.chart_meta(symbol)?
            .regular_market_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| PricerError::data(format!("Could not find current price for {}", symbol)))
    }

    /// Treasury yield index as a decimal (4.5 -> 0.045)
    pub fn treasury_yield(&self, symbol: &str) -> PricerResult<f64> {
        self.chart_meta(symbol)?
            .regular_market_price
            .filter(|p| p.is_finite())
            .map(|p| p / 100.0)
            .ok_or_else(|| PricerError::data(format!("No yield quoted for {}", symbol)))
    }
}

/// Percent-encode a ticker for use as a path segment (`^IRX` -> `%5EIRX`)
pub fn encode_symbol(symbol: &str) -> String {
    urlencoding::encode(symbol.trim()).into_owned()
}

// Yahoo Finance API response structures

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooChartResult>>,
}

#[derive(Debug, Deserialize)]
struct YahooChartResult {
    meta: ChartMeta,
}

/// Subset of the chart metadata
#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    pub symbol: Option<String>,
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
    pub currency: Option<String>,
}
