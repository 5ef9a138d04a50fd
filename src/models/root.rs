//! Bracketed root finding
//!
//! Brent's method: inverse quadratic interpolation and secant steps, falling
//! back to bisection whenever the fast step would leave the bracket or
//! converge too slowly. Only requires a sign change across `[lo, hi]`.

use serde::{Deserialize, Serialize};

use crate::core::{PricerError, PricerResult};

/// Root-finder settings used by the implied volatility solver
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Lower end of the volatility bracket
    /// Default: 1e-6
    pub vol_lower: f64,

    /// Upper end of the volatility bracket
    /// Default: 5.0 (500%)
    pub vol_upper: f64,

    /// Stop once |model price - market price| is below this
    /// Default: 1e-8
    pub price_tolerance: f64,

    /// Stop once the bracket is narrower than this
    /// Default: 1e-12
    pub vol_tolerance: f64,

    /// Default: 200
    pub max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            vol_lower: 1e-6,
            vol_upper: 5.0,
            price_tolerance: 1e-8,
            vol_tolerance: 1e-12,
            max_iterations: 200,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> PricerResult<()> {
        if !(self.vol_lower > 0.0 && self.vol_upper > self.vol_lower && self.vol_upper.is_finite()) {
            return Err(PricerError::config(format!(
                "volatility bracket must satisfy 0 < lower < upper, got [{}, {}]",
                self.vol_lower, self.vol_upper
            )));
        }
        if !(self.price_tolerance > 0.0 && self.vol_tolerance > 0.0) {
            return Err(PricerError::config("solver tolerances must be positive"));
        }
        if self.max_iterations == 0 {
            return Err(PricerError::config("solver needs at least one iteration"));
        }
        Ok(())
    }
}

/// Find `x` in `[lo, hi]` with `f(x) = 0`.
///
/// Fails when `f(lo)` and `f(hi)` have the same sign, when `f` goes
/// non-finite, or when the iteration budget runs out.
pub fn brent<F>(f: F, lo: f64, hi: f64, x_tol: f64, f_tol: f64, max_iter: usize) -> PricerResult<f64>
where
    F: Fn(f64) -> f64,
{
    let (mut a, mut b) = (lo, hi);
    let (mut fa, mut fb) = (f(a), f(b));

    if !fa.is_finite() || !fb.is_finite() {
        return Err(PricerError::solver("objective is not finite at the bracket ends"));
    }
    if fa == 0.0 {
        return Ok(a);
    }
    if fb == 0.0 {
        return Ok(b);
    }
    if fa.signum() == fb.signum() {
        return Err(PricerError::solver(format!(
            "no sign change on [{}, {}]: f(lo) = {:.6e}, f(hi) = {:.6e}",
            lo, hi, fa, fb
        )));
    }

    let (mut c, mut fc) = (b, fb);
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iter {
        if fb.signum() == fc.signum() {
            // Re-establish the bracket [b, c]
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol = 2.0 * f64::EPSILON * b.abs() + 0.5 * x_tol;
        let xm = 0.5 * (c - b);

        if xm.abs() <= tol || fb.abs() <= f_tol {
            return Ok(b);
        }

        if e.abs() >= tol && fa.abs() > fb.abs() {
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                // Secant
                (2.0 * xm * s, 1.0 - s)
            } else {
                // Inverse quadratic
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();

            let min1 = 3.0 * xm * q - (tol * q).abs();
            let min2 = (e * q).abs();
            if 2.0 * p < min1.min(min2) {
                e = d;
                d = p / q;
            } else {
                d = xm;
                e = d;
            }
        } else {
            d = xm;
            e = d;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol { d } else { tol.copysign(xm) };
        fb = f(b);

        if !fb.is_finite() {
            return Err(PricerError::solver(format!("objective is not finite at {}", b)));
        }
    }

    Err(PricerError::solver(format!(
        "root finder did not converge in {} iterations",
        max_iter
    )))
}
