//! Error types for the series_plot crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while building or rendering a chart
#[derive(Debug, Error)]
pub enum PlotError {
    /// Malformed plotting input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The drawing backend failed
    #[error("Render error: {0}")]
    Render(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type for plotting operations
pub type Result<T> = std::result::Result<T, PlotError>;

impl From<PolarsError> for PlotError {
    fn from(err: PolarsError) -> Self {
        PlotError::Polars(err.to_string())
    }
}
