//! Option side, exercise style and the per-chain pricing context
//!
//! The context holds the inputs shared read-only by every strike of one chain:
//! spot, time to maturity, risk-free rate and option side.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::{PricerError, PricerResult};

/// Calendar days per year used for time to maturity
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Option type (Call or Put)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Payoff direction: +1 for call, -1 for put
    pub fn phi(&self) -> f64 {
        match self {
            OptionType::Call => 1.0,
            OptionType::Put => -1.0,
        }
    }

    /// Intrinsic value at given spot
    pub fn intrinsic(&self, spot: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (spot - strike).max(0.0),
            OptionType::Put => (strike - spot).max(0.0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::Call => "call",
            OptionType::Put => "put",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = PricerError;

    fn from_str(s: &str) -> PricerResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionType::Call),
            "put" => Ok(OptionType::Put),
            other => Err(PricerError::invalid_input(format!(
                "optionType must be \"call\" or \"put\", got \"{}\"",
                other
            ))),
        }
    }
}

/// Exercise style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExerciseStyle {
    European,
    American,
}

/// Inputs shared by every strike of one chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingContext {
    /// Underlying spot price
    pub spot: f64,
    /// Time to maturity in years
    pub time: f64,
    /// Continuously compounded risk-free rate (may be negative)
    pub rate: f64,
    /// Call or put
    pub option_type: OptionType,
}

impl PricingContext {
    /// Build a context, rejecting non-positive spot or maturity.
    ///
    /// The rate is only required to be finite; interpolated curves can go
    /// negative and are not clamped.
    pub fn new(spot: f64, time: f64, rate: f64, option_type: OptionType) -> PricerResult<Self> {
        if !spot.is_finite() || spot <= 0.0 {
            return Err(PricerError::invalid_input(format!(
                "spot price must be positive, got {}",
                spot
            )));
        }
        if !time.is_finite() || time <= 0.0 {
            return Err(PricerError::invalid_input(format!(
                "time to maturity must be positive, got {}",
                time
            )));
        }
        if !rate.is_finite() {
            return Err(PricerError::invalid_input("risk-free rate must be finite"));
        }

        Ok(Self {
            spot,
            time,
            rate,
            option_type,
        })
    }
}

/// Parse an expiration identifier in `YYYY-MM-DD` form
pub fn parse_expiration(expiration: &str) -> PricerResult<NaiveDate> {
    NaiveDate::parse_from_str(expiration.trim(), "%Y-%m-%d").map_err(|e| {
        PricerError::invalid_input(format!(
            "expiration \"{}\" is not a YYYY-MM-DD date: {}",
            expiration, e
        ))
    })
}

/// Time to maturity in years: calendar days / 365.
///
/// Fails when the expiry is today or in the past.
pub fn time_to_maturity(expiry: NaiveDate, today: NaiveDate) -> PricerResult<f64> {
    let days = (expiry - today).num_days();
    if days <= 0 {
        return Err(PricerError::invalid_input(
            "Expiration date must be in the future.",
        ));
    }
    Ok(days as f64 / DAYS_PER_YEAR)
}
