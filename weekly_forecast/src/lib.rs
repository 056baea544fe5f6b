//! # Weekly Forecast
//!
//! Forecasting of weekly time series with an additive model.
//!
//! ## Features
//!
//! - Time series tables with `ds`/`y` conventions, loaded from polars frames or CSV
//! - Additive model: piecewise-linear trend, Fourier seasonality, national
//!   holidays and extra regressors, with simulated uncertainty intervals
//! - Rolling-origin cross-validation and per-horizon performance metrics
//! - A wrapper that splits train and test rows, fits, forecasts and charts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chrono::Duration;
//! use weekly_forecast::prelude::*;
//!
//! # fn main() -> weekly_forecast::Result<()> {
//! let table = TimeSeriesTable::from_csv("casos.csv")?;
//! let config = ForecasterConfig::default().with_test_period(4).with_holidays("BR");
//! let mut forecaster = WeeklyForecaster::new(table.into_dataframe(), config)?;
//!
//! forecaster.run_cross_validation(&CrossValidationOptions::new(Duration::weeks(4)))?;
//! let metrics = forecaster.compute_metrics(&MetricsRequest::default())?;
//! println!("{:?}", metrics.column("rmse"));
//!
//! let ax = forecaster.render_forecast(&ForecastPlot::titled("Casos", "", "data", "casos"), None)?;
//! if let Some(ax) = ax {
//!     ax.render_svg("casos.svg")?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod forecaster;
pub mod holidays;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use crate::config::{ForecasterConfig, ModelOptions, Seasonality};
pub use crate::data::{TimeSeriesTable, DATE_COLUMN, TARGET_COLUMN};
pub use crate::diagnostics::{cross_validation, CrossValidationFrame, CrossValidationOptions};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{ForecastPlot, MetricsRequest, WeeklyForecaster};
pub use crate::metrics::{performance_metrics, Metric, MetricsTable};
pub use crate::models::additive::{AdditiveModel, FittedAdditiveModel};
pub use crate::models::{ForecastFrame, ForecastModel, TrainedForecastModel};

/// Commonly used items
pub mod prelude {
    pub use crate::config::{ForecasterConfig, ModelOptions, Seasonality};
    pub use crate::data::TimeSeriesTable;
    pub use crate::diagnostics::CrossValidationOptions;
    pub use crate::error::{ForecastError, Result};
    pub use crate::forecaster::{ForecastPlot, MetricsRequest, WeeklyForecaster};
    pub use crate::metrics::Metric;
    pub use crate::models::{ForecastModel, TrainedForecastModel};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
