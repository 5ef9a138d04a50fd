//! Pricing Models
//!
//! Implements:
//! - Black-Scholes (closed-form European price, implied volatility)
//! - Cox-Ross-Rubinstein binomial lattice (American valuation)
//! - Brent root finder shared by the solver

pub mod binomial;
pub mod black_scholes;
pub mod root;

pub use binomial::*;
pub use black_scholes::*;
pub use root::*;
