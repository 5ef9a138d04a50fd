//! Configuration for chain pricing
//!
//! Loadable from TOML; every section and field is optional and falls back to
//! its default.
//!
//! ```toml
//! [lattice]
//! min_steps = 200
//!
//! [chain]
//! parallel = true
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{PricerError, PricerResult, DEFAULT_IV_FLOOR, DEFAULT_RISK_FREE};
use crate::models::{LatticeConfig, SolverConfig};

/// Configuration for chain pricing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Binomial lattice discretisation
    pub lattice: LatticeConfig,
    /// Implied volatility solver
    pub solver: SolverConfig,
    /// Chain-level policy
    pub chain: ChainConfig,
}

impl PricingConfig {
    /// Fewer lattice steps, for quick scans
    pub fn fast() -> Self {
        Self {
            lattice: LatticeConfig {
                min_steps: 50,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Finer lattice and tighter solver
    pub fn precise() -> Self {
        Self {
            lattice: LatticeConfig {
                min_steps: 500,
                ..Default::default()
            },
            solver: SolverConfig {
                price_tolerance: 1e-10,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_toml_str(text: &str) -> PricerResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| PricerError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> PricerResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded pricing config from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> PricerResult<()> {
        self.lattice.validate()?;
        self.solver.validate()?;
        self.chain.validate()
    }
}

/// Chain-level policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Provider implied vols at or below this are treated as missing
    /// Default: 0.001
    pub provider_iv_floor: f64,

    /// Rate used when no treasury anchor is available
    /// Default: 0.03
    pub default_rate: f64,

    /// Price strikes on the rayon pool
    /// Default: false
    pub parallel: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            provider_iv_floor: DEFAULT_IV_FLOOR,
            default_rate: DEFAULT_RISK_FREE,
            parallel: false,
        }
    }
}

impl ChainConfig {
    pub fn validate(&self) -> PricerResult<()> {
        if !(self.provider_iv_floor.is_finite() && self.provider_iv_floor >= 0.0) {
            return Err(PricerError::config(format!(
                "provider_iv_floor must be non-negative, got {}",
                self.provider_iv_floor
            )));
        }
        if !self.default_rate.is_finite() {
            return Err(PricerError::config("default_rate must be finite"));
        }
        Ok(())
    }
}
