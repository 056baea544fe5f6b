//! # Series Math
//!
//! Numeric building blocks for additive time series models.
//! This crate provides the least squares solver, Fourier seasonality terms,
//! summary statistics and the point error functions used to score forecasts.

use thiserror::Error;

pub mod errors;
pub mod fourier;
pub mod linalg;
pub mod stats;

pub use errors::PointError;
pub use fourier::fourier_series;
pub use linalg::ridge_solve;

/// Errors that can occur in numeric routines
#[derive(Error, Debug)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric routines
pub type Result<T> = std::result::Result<T, MathError>;
