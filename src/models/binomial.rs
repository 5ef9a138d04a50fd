//! Cox-Ross-Rubinstein binomial lattice
//!
//! American values by backward induction with an early-exercise check at
//! every node. The step count grows with maturity (roughly one step per
//! calendar day) above a fixed floor.
//!
//! Per step: `u = exp(σ√dt)`, `d = 1/u`, `R = exp(r·dt)`, `p = (R - d)/(u - d)`.
//! For extreme σ, T or r combinations `p` can fall outside `[0, 1]`; the
//! lattice is then not arbitrage-free. This is reported with a warning and the
//! value is still computed with the unclamped `p`.

use serde::{Deserialize, Serialize};

use crate::core::{ExerciseStyle, OptionType, PricerError, PricerResult};

/// Lattice discretisation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeConfig {
    /// Step floor, applied to short maturities
    /// Default: 100
    pub min_steps: usize,

    /// Steps per year of maturity above the floor
    /// Default: 365 (one per calendar day)
    pub steps_per_year: f64,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            min_steps: 100,
            steps_per_year: 365.0,
        }
    }
}

impl LatticeConfig {
    /// N = max(min_steps, round(T * steps_per_year))
    pub fn steps_for_maturity(&self, time: f64) -> usize {
        let scaled = (time * self.steps_per_year).round();
        let scaled = if scaled.is_finite() && scaled > 0.0 {
            scaled as usize
        } else {
            0
        };
        scaled.max(self.min_steps)
    }

    pub fn validate(&self) -> PricerResult<()> {
        if self.min_steps == 0 {
            return Err(PricerError::config("lattice needs at least one step"));
        }
        if !(self.steps_per_year.is_finite() && self.steps_per_year >= 0.0) {
            return Err(PricerError::config(format!(
                "steps_per_year must be non-negative, got {}",
                self.steps_per_year
            )));
        }
        Ok(())
    }
}

/// Per-step lattice parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatticeParams {
    pub steps: usize,
    pub dt: f64,
    /// Up factor
    pub u: f64,
    /// Down factor, 1/u
    pub d: f64,
    /// Per-step gross risk-free growth
    pub growth: f64,
    /// Risk-neutral up probability
    pub p: f64,
}

impl LatticeParams {
    pub fn new(vol: f64, time: f64, rate: f64, steps: usize) -> Self {
        let dt = time / steps as f64;
        let u = (vol * dt.sqrt()).exp();
        let d = 1.0 / u;
        let growth = (rate * dt).exp();
        let p = (growth - d) / (u - d);

        Self {
            steps,
            dt,
            u,
            d,
            growth,
            p,
        }
    }

    /// `p` is a proper probability
    pub fn is_risk_neutral(&self) -> bool {
        self.p.is_finite() && (0.0..=1.0).contains(&self.p)
    }
}

/// American value with the step count chosen from maturity
pub fn american_value(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
    config: &LatticeConfig,
) -> PricerResult<f64> {
    let steps = config.steps_for_maturity(time);
    lattice_value(
        spot,
        strike,
        rate,
        vol,
        time,
        option_type,
        ExerciseStyle::American,
        steps,
    )
}

/// Value an option on a CRR lattice with an explicit step count.
///
/// The buffer holds `steps + 1` node values and shrinks in place by one
/// node per step back from maturity.
#[allow(clippy::too_many_arguments)]
pub fn lattice_value(
    spot: f64,
    strike: f64,
    rate: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
    exercise: ExerciseStyle,
    steps: usize,
) -> PricerResult<f64> {
    if !(spot > 0.0 && strike > 0.0) {
        return Err(PricerError::invalid_input("Non-positive spot or strike"));
    }
    if !(time.is_finite() && time > 0.0) {
        return Err(PricerError::invalid_input("Non-positive time to expiry"));
    }
    if !(vol.is_finite() && vol > 0.0) {
        return Err(PricerError::invalid_input(format!(
            "volatility must be positive, got {}",
            vol
        )));
    }
    if steps == 0 {
        return Err(PricerError::invalid_input("lattice needs at least one step"));
    }

    let params = LatticeParams::new(vol, time, rate, steps);
    if !params.is_risk_neutral() {
        tracing::warn!(
            p = params.p,
            vol,
            time,
            rate,
            steps,
            "risk-neutral probability outside [0, 1], lattice is not arbitrage-free"
        );
    }

    let ln_spot = spot.ln();
    let ln_u = params.u.ln();
    let ln_d = params.d.ln();
    let node_spot = |i: usize, j: usize| (ln_spot + j as f64 * ln_u + (i - j) as f64 * ln_d).exp();

    let p = params.p;
    let q = 1.0 - p;
    let growth = params.growth;
    let early_exercise = exercise == ExerciseStyle::American;

    // Terminal layer, j up-moves
    let mut values: Vec<f64> = (0..=steps)
        .map(|j| option_type.intrinsic(node_spot(steps, j), strike))
        .collect();

    for i in (0..steps).rev() {
        for j in 0..=i {
            let continuation = (p * values[j + 1] + q * values[j]) / growth;
            values[j] = if early_exercise {
                continuation.max(option_type.intrinsic(node_spot(i, j), strike))
            } else {
                continuation
            };
        }
    }

    let value = values[0];
    if !value.is_finite() {
        return Err(PricerError::numerical(format!(
            "lattice produced a non-finite value (p = {})",
            p
        )));
    }
    Ok(value)
}
