//! # Weekly Forecast Workspace
//!
//! Umbrella crate for the workspace members:
//!
//! - [`series_math`]: least squares, Fourier terms and error statistics
//! - [`series_plot`]: chart presentation, time series charts and tick formatters
//! - [`weekly_forecast`]: the weekly forecasting wrapper, cross-validation and metrics
//!
//! ## Example
//!
//! ```
//! use weekly_forecast_workspace::plot::{thousand_formatter, percent_formatter};
//!
//! assert_eq!(thousand_formatter(1500.0, 0), "1.50 Mil");
//! assert_eq!(percent_formatter(0.25, 0), "25%");
//! ```

pub use series_math as math;
pub use series_plot as plot;
pub use weekly_forecast as forecast;

pub use weekly_forecast::prelude;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
