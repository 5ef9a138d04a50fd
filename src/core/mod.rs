//! Core data types
//!
//! Defines fundamental types:
//! - OptionType / PricingContext: side and shared per-chain inputs
//! - RawQuote / NormalizedQuote: provider quotes and their canonical form
//! - RateCurve: treasury term structure
//! - ChainResult: priced output rows

pub mod chain;
pub mod error;
pub mod option;
pub mod quote;
pub mod rates;

pub use chain::*;
pub use error::*;
pub use option::*;
pub use quote::*;
pub use rates::*;
