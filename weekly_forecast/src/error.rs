//! Error types for the weekly_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the weekly_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Inconsistent setup: a missing regressor column, an unknown country
    /// calendar, an unrecognised model option or a test period longer than
    /// the data
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed input tables or results
    #[error("Validation error: {0}")]
    Validation(String),

    /// An operation was invoked before the step it depends on
    #[error("State error: {0}")]
    State(String),

    /// An argument that does not address anything valid
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The model could not be fitted or evaluated
    #[error("Model error: {0}")]
    Model(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reading CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error decoding JSON configuration
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from numeric routines
    #[error("Math error: {0}")]
    Math(#[from] series_math::MathError),

    /// Error from chart construction or rendering
    #[error("Plot error: {0}")]
    Plot(#[from] series_plot::PlotError),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}
