//! Chain pricing
//!
//! Composes quote normalization, implied volatility and lattice valuation
//! over every strike of a chain.

pub mod chain;
pub mod config;

pub use chain::*;
pub use config::*;
