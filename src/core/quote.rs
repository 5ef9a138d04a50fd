//! Option quote data
//!
//! Raw per-strike quotes as delivered by market-data providers, and the
//! canonical normalized form the pricer works on.
//!
//! Provider numbers frequently arrive as display text (`"$1,234.50"`, `"--"`),
//! so every raw field is string-or-number and goes through [`parse_number`].
//! Unparseable text is treated as a missing field, never as an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tokens providers emit in place of a number
const PLACEHOLDERS: &[&str] = &["--", "-", "\u{2014}", "\u{2013}", "N/A", "n/a"];

/// Minimum provider implied volatility accepted by default
pub const DEFAULT_IV_FLOOR: f64 = 0.001;

/// A provider field that may be numeric or free-form text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
}

impl From<f64> for RawField {
    fn from(value: f64) -> Self {
        RawField::Number(value)
    }
}

impl From<&str> for RawField {
    fn from(value: &str) -> Self {
        RawField::Text(value.to_string())
    }
}

impl From<String> for RawField {
    fn from(value: String) -> Self {
        RawField::Text(value)
    }
}

/// Safe-parse a provider field.
///
/// Strips thousands separators and dollar signs; empty strings, placeholder
/// tokens, garbage and non-finite values all come back as `None`.
pub fn parse_number(field: Option<&RawField>) -> Option<f64> {
    let value = match field? {
        RawField::Number(x) => *x,
        RawField::Text(text) => {
            let text = text.trim();
            if text.is_empty() || PLACEHOLDERS.contains(&text) {
                return None;
            }
            let cleaned: String = text.chars().filter(|c| *c != ',' && *c != '$').collect();
            cleaned.trim().parse::<f64>().ok()?
        }
    };

    value.is_finite().then_some(value)
}

/// Per-strike quote exactly as received from a provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub strike: Option<RawField>,
    pub bid: Option<RawField>,
    pub ask: Option<RawField>,
    /// Last traded price
    pub last: Option<RawField>,
    /// Implied volatility published by the provider, if any
    pub implied_vol: Option<RawField>,
}

impl RawQuote {
    pub fn new(strike: impl Into<RawField>) -> Self {
        Self {
            strike: Some(strike.into()),
            ..Default::default()
        }
    }

    pub fn with_bid(mut self, bid: impl Into<RawField>) -> Self {
        self.bid = Some(bid.into());
        self
    }

    pub fn with_ask(mut self, ask: impl Into<RawField>) -> Self {
        self.ask = Some(ask.into());
        self
    }

    pub fn with_last(mut self, last: impl Into<RawField>) -> Self {
        self.last = Some(last.into());
        self
    }

    pub fn with_implied_vol(mut self, iv: impl Into<RawField>) -> Self {
        self.implied_vol = Some(iv.into());
        self
    }

    /// Normalize using the default provider-IV floor
    pub fn normalize(&self) -> Result<NormalizedQuote, QuoteRejection> {
        normalize(self, DEFAULT_IV_FLOOR)
    }
}

/// Why a raw quote could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuoteRejection {
    #[error("strike missing or not a positive number")]
    MissingStrike,
    #[error("neither bid nor ask present")]
    MissingBidAsk,
}

/// Canonical quote with a well-defined mid price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedQuote {
    pub strike: f64,
    pub bid: f64,
    pub ask: f64,
    /// (bid + ask) / 2
    pub mid: f64,
    pub last: Option<f64>,
    pub provider_iv: Option<f64>,
}

impl NormalizedQuote {
    /// Bid-ask spread
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

/// Prices must be non-negative; anything else counts as missing
fn parse_price(field: Option<&RawField>) -> Option<f64> {
    parse_number(field).filter(|p| *p >= 0.0)
}

/// Convert a raw quote into its canonical form.
///
/// A missing bid or ask is synthesized from the other side (zero-width
/// market). Provider volatility is kept only when it exceeds `iv_floor`.
pub fn normalize(raw: &RawQuote, iv_floor: f64) -> Result<NormalizedQuote, QuoteRejection> {
    let strike = parse_number(raw.strike.as_ref())
        .filter(|k| *k > 0.0)
        .ok_or(QuoteRejection::MissingStrike)?;

    let (bid, ask) = match (parse_price(raw.bid.as_ref()), parse_price(raw.ask.as_ref())) {
        (Some(bid), Some(ask)) => (bid, ask),
        (Some(bid), None) => (bid, bid),
        (None, Some(ask)) => (ask, ask),
        (None, None) => return Err(QuoteRejection::MissingBidAsk),
    };

    let provider_iv = parse_number(raw.implied_vol.as_ref()).filter(|iv| *iv > iv_floor);

    Ok(NormalizedQuote {
        strike,
        bid,
        ask,
        mid: (bid + ask) / 2.0,
        last: parse_price(raw.last.as_ref()),
        provider_iv,
    })
}
