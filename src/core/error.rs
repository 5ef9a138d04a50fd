//! Error types for American option pricing

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No usable data: {0}")]
    NoUsableData(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type PricerResult<T> = Result<T, PricerError>;

impl PricerError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn no_usable_data(msg: impl Into<String>) -> Self {
        Self::NoUsableData(msg.into())
    }

    pub fn solver(msg: impl Into<String>) -> Self {
        Self::Solver(msg.into())
    }

    pub fn numerical(msg: impl Into<String>) -> Self {
        Self::Numerical(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Errors the chain pricer recovers from by dropping a single strike
    pub fn is_per_strike(&self) -> bool {
        matches!(self, Self::Solver(_) | Self::Numerical(_))
    }
}
