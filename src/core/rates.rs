//! Risk-free rate term structure
//!
//! A handful of (maturity, yield) anchors, linearly interpolated and clamped
//! flat beyond the first and last anchor. With no anchors at all the curve
//! returns [`DEFAULT_RISK_FREE`].

use serde::{Deserialize, Serialize};

/// Fallback rate (3%) when no treasury yields could be obtained
pub const DEFAULT_RISK_FREE: f64 = 0.03;

/// One point of the yield curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateAnchor {
    /// Maturity in years
    pub maturity: f64,
    /// Yield as a decimal (0.045 = 4.5%)
    pub rate: f64,
}

impl RateAnchor {
    pub fn new(maturity: f64, rate: f64) -> Self {
        Self { maturity, rate }
    }
}

/// Piecewise-linear rate curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateCurve {
    anchors: Vec<RateAnchor>,
    fallback: f64,
}

impl RateCurve {
    /// Build from anchors in any order. Anchors with a non-positive or
    /// non-finite maturity, or a non-finite yield, are discarded.
    pub fn new(anchors: impl IntoIterator<Item = RateAnchor>) -> Self {
        Self::with_fallback(anchors, DEFAULT_RISK_FREE)
    }

    pub fn with_fallback(anchors: impl IntoIterator<Item = RateAnchor>, fallback: f64) -> Self {
        let mut anchors: Vec<RateAnchor> = anchors
            .into_iter()
            .filter(|a| a.maturity.is_finite() && a.maturity > 0.0 && a.rate.is_finite())
            .collect();
        anchors.sort_by(|a, b| a.maturity.total_cmp(&b.maturity));

        Self { anchors, fallback }
    }

    /// Anchors sorted by maturity
    pub fn anchors(&self) -> &[RateAnchor] {
        &self.anchors
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Interpolated rate for maturity `t` (years)
    pub fn rate(&self, t: f64) -> f64 {
        if t.is_nan() {
            return self.fallback;
        }
        let (first, last) = match (self.anchors.first(), self.anchors.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.fallback,
        };

        if t <= first.maturity {
            return first.rate;
        }
        if t >= last.maturity {
            return last.rate;
        }

        // First anchor with maturity >= t; guaranteed to be in 1..len
        let hi = self.anchors.partition_point(|a| a.maturity < t);
        let (a, b) = (self.anchors[hi - 1], self.anchors[hi]);
        let span = b.maturity - a.maturity;
        if span <= 0.0 {
            return b.rate;
        }
        let w = (t - a.maturity) / span;
        a.rate + w * (b.rate - a.rate)
    }
}

/// Interpolated risk-free rate for maturity `t` over an arbitrary anchor set
pub fn interpolate_rate(t: f64, anchors: &[RateAnchor]) -> f64 {
    RateCurve::new(anchors.iter().copied()).rate(t)
}
