//! Chain pricing results

use serde::{Deserialize, Serialize};

use super::option::OptionType;

/// Where a strike's volatility came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolSource {
    /// Published by the market-data provider
    Provider,
    /// Solved from the mid price with the closed-form model
    Solved,
}

/// Priced row for one strike
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeResult {
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    pub mid_price: f64,
    pub implied_vol: f64,
    pub vol_source: VolSource,
    /// Last traded price, used as the reference for `percent_difference`
    pub last_price: Option<f64>,
    pub american_value: f64,
    /// (american - last) * 100 / american
    pub percent_difference: Option<f64>,
}

/// Percentage deviation of the model value from a reference price.
///
/// Normalised by the model value, not the reference. Defined only when both
/// are strictly positive.
pub fn percent_difference(american_value: f64, reference: Option<f64>) -> Option<f64> {
    match reference {
        Some(last) if last > 0.0 && american_value > 0.0 => {
            Some((american_value - last) * 100.0 / american_value)
        }
        _ => None,
    }
}

/// Priced chain for one (expiration, side)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResult {
    pub current_price: f64,
    pub time_to_maturity: f64,
    pub risk_free_rate: f64,
    pub expiration: String,
    pub option_type: OptionType,
    /// Input strike order, one row per surviving quote
    pub results: Vec<StrikeResult>,
}

impl ChainResult {
    pub fn strikes(&self) -> Vec<f64> {
        self.results.iter().map(|r| r.strike).collect()
    }

    /// Row for a strike, first match wins when strikes repeat
    pub fn at_strike(&self, strike: f64) -> Option<&StrikeResult> {
        self.results.iter().find(|r| (r.strike - strike).abs() < 1e-9)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
