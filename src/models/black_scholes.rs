//! Black-Scholes Model
//!
//! Provides:
//! - European option pricing (no dividends)
//! - Implied volatility solver (Brent on a bounded volatility bracket)
//!
//! The closed form is only used to turn market mid prices into volatilities
//! and as the European benchmark for the lattice; American values come from
//! [`crate::models::binomial`].

use statrs::distribution::{ContinuousCDF, Normal};
use statrs::function::erf::erfc;

use super::root::{brent, SolverConfig};
use crate::core::{OptionType, PricerError, PricerResult};

/// Standard normal CDF
pub fn norm_cdf(x: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(x),
        Err(_) => 0.5 * erfc(-x / std::f64::consts::SQRT_2),
    }
}

/// Black-Scholes d1 parameter
pub fn d1(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter
pub fn d2(spot: f64, strike: f64, rate: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, vol, time) - vol * time.sqrt()
}

/// Black-Scholes European option price
pub fn price(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    if time <= 0.0 {
        return option_type.intrinsic(spot, strike);
    }

    let df = (-rate * time).exp();

    if vol <= 0.0 {
        // Zero vol: discounted intrinsic on the forward
        let forward = spot / df;
        return df * option_type.intrinsic(forward, strike);
    }

    let d1 = d1(spot, strike, rate, vol, time);
    let d2 = d1 - vol * time.sqrt();

    match option_type {
        OptionType::Call => spot * norm_cdf(d1) - strike * df * norm_cdf(d2),
        OptionType::Put => strike * df * norm_cdf(-d2) - spot * norm_cdf(-d1),
    }
}

/// Implied volatility with the default solver settings
pub fn implied_volatility(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
) -> PricerResult<f64> {
    implied_volatility_with(
        market_price,
        spot,
        strike,
        rate,
        time,
        option_type,
        &SolverConfig::default(),
    )
}

/// Volatility at which the closed-form price equals `market_price`.
///
/// Fails for non-positive spot, strike, time or price, and when the price
/// lies outside what the model can produce over the configured bracket
/// (below discounted intrinsic, or above the price at the upper bound).
pub fn implied_volatility_with(
    market_price: f64,
    spot: f64,
    strike: f64,
    rate: f64,
    time: f64,
    option_type: OptionType,
    config: &SolverConfig,
) -> PricerResult<f64> {
    // Sanity checks
    if !(market_price.is_finite() && market_price > 0.0) {
        return Err(PricerError::solver("Non-positive option price"));
    }
    if !(time.is_finite() && time > 0.0) {
        return Err(PricerError::solver("Non-positive time to expiry"));
    }
    if !(spot > 0.0 && strike > 0.0) {
        return Err(PricerError::solver("Non-positive spot or strike"));
    }

    let objective = |vol: f64| price(spot, strike, rate, vol, time, option_type) - market_price;

    brent(
        objective,
        config.vol_lower,
        config.vol_upper,
        config.vol_tolerance,
        config.price_tolerance,
        config.max_iterations,
    )
    .map_err(|e| {
        PricerError::solver(format!(
            "no implied vol for {} K={} price={}: {}",
            option_type, strike, market_price, e
        ))
    })
}
