//! Weekly forecast wrapper
//!
//! [`WeeklyForecaster`] splits a series into a training prefix and a test
//! suffix, fits an [`AdditiveModel`] on the training rows and forecasts the
//! whole range. Cross-validation, metrics and charts are produced on demand
//! and kept on the instance.

use crate::config::ForecasterConfig;
use crate::data::{TimeSeriesTable, DATE_COLUMN, TARGET_COLUMN};
use crate::diagnostics::{cross_validation, plot_cross_validation_metric, CrossValidationFrame, CrossValidationOptions};
use crate::error::{ForecastError, Result};
use crate::metrics::{performance_metrics, Metric, MetricsTable};
use crate::models::additive::{AdditiveModel, FittedAdditiveModel};
use crate::models::plot::ModelPlotOptions;
use crate::models::{ForecastFrame, ForecastModel, TrainedForecastModel};
use polars::prelude::DataFrame;
use series_plot::{
    apply_presentation, draw_time_series, month_ticks, Axes, Color, MonthLocale, Presentation, SeriesStyle,
    TextStyle, TimeSeriesPlot,
};
use tracing::{debug, info};

/// Column of row-wise metric means
pub const MEAN_METRICS_COLUMN: &str = "mean_metrics";

/// Column of `|rmse - mae|`
pub const DIFF_COLUMN: &str = "diff_rmse_mae";

/// Rolling window share used by the cross-validation metric chart
const CHART_ROLLING_WINDOW: f64 = 0.1;

/// Parameters of [`WeeklyForecaster::compute_metrics`]
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRequest {
    pub metrics: Vec<Metric>,
    /// Append `diff_rmse_mae` when both RMSE and MAE are requested
    pub include_diff: bool,
    /// Append the `mean_metrics` column and a `mean` summary row
    pub include_aggregates: bool,
    /// Share of rows in each horizon's window; negative for per-row values
    pub rolling_window: f64,
}

impl Default for MetricsRequest {
    fn default() -> Self {
        Self {
            metrics: vec![Metric::Rmse, Metric::Mae],
            include_diff: true,
            include_aggregates: true,
            rolling_window: 0.1,
        }
    }
}

/// Parameters of [`WeeklyForecaster::render_forecast`]
#[derive(Debug, Clone)]
pub struct ForecastPlot {
    /// Titles and labels; also used for the test overlay
    pub presentation: Presentation,
    /// Overlay the test observations
    pub show_test: bool,
    /// Render with [`Axes::show`] and return nothing
    pub show: bool,
    /// Months between x ticks
    pub month_tick_interval: u32,
    pub model_plot: ModelPlotOptions,
    pub test_style: SeriesStyle,
}

impl Default for ForecastPlot {
    fn default() -> Self {
        Self {
            presentation: Presentation::default(),
            show_test: true,
            show: false,
            month_tick_interval: 2,
            model_plot: ModelPlotOptions::default(),
            test_style: SeriesStyle::points(Color::RED, 8),
        }
    }
}

impl ForecastPlot {
    /// Options with the given titles and labels
    pub fn titled(title: &str, subtitle: &str, xlabel: &str, ylabel: &str) -> Self {
        Self {
            presentation: Presentation {
                title: title.to_string(),
                subtitle: subtitle.to_string(),
                xlabel: xlabel.to_string(),
                ylabel: ylabel.to_string(),
                ..Presentation::default()
            },
            ..Self::default()
        }
    }
}

/// Forecasting wrapper for weekly series
#[derive(Debug, Clone)]
pub struct WeeklyForecaster {
    config: ForecasterConfig,
    train: TimeSeriesTable,
    test: TimeSeriesTable,
    model: FittedAdditiveModel,
    forecast: ForecastFrame,
    cross_validation: Option<CrossValidationFrame>,
    metrics: Option<MetricsTable>,
}

impl WeeklyForecaster {
    /// Split `data`, fit the model on the training rows and forecast every
    /// row of `data`.
    ///
    /// # Errors
    ///
    /// [`ForecastError::Configuration`] when `test_period` exceeds the row
    /// count, a regressor column is missing, the holiday country is unknown
    /// or a model option is not recognised. [`ForecastError::Model`] when the
    /// training partition has fewer than two observations.
    pub fn new(data: DataFrame, config: ForecasterConfig) -> Result<Self> {
        let table = TimeSeriesTable::new(data)?;
        let (train, test) = table.split(config.test_period)?;

        let mut model = AdditiveModel::new(config.model_options()?)?;
        if config.use_holidays {
            model.add_country_holidays(&config.country)?;
        }
        for regressor in &config.regressors {
            if !table.has_column(regressor) {
                return Err(ForecastError::Configuration(format!(
                    "regressor column '{}' was not found in the data",
                    regressor
                )));
            }
            model.add_regressor(regressor)?;
        }

        let fitted = model.train(&train)?;
        let forecast = fitted.predict(&table.without_target())?;
        info!(
            rows = table.len(),
            train = train.len(),
            test = test.len(),
            holidays = config.use_holidays,
            regressors = config.regressors.len(),
            "weekly forecaster ready"
        );

        Ok(Self {
            config,
            train,
            test,
            model: fitted,
            forecast,
            cross_validation: None,
            metrics: None,
        })
    }

    /// Load a CSV and build the forecaster from it
    pub fn from_csv<P: AsRef<std::path::Path>>(path: P, config: ForecasterConfig) -> Result<Self> {
        let table = TimeSeriesTable::from_csv(path)?;
        Self::new(table.into_dataframe(), config)
    }

    pub fn config(&self) -> &ForecasterConfig {
        &self.config
    }

    /// Training partition: the first `len - test_period` rows
    pub fn train(&self) -> &TimeSeriesTable {
        &self.train
    }

    /// Test partition: the last `test_period` rows
    pub fn test(&self) -> &TimeSeriesTable {
        &self.test
    }

    pub fn fitted_model(&self) -> &FittedAdditiveModel {
        &self.model
    }

    /// Forecast over the full input, train and test rows alike
    pub fn forecast(&self) -> &ForecastFrame {
        &self.forecast
    }

    pub fn cross_validation(&self) -> Option<&CrossValidationFrame> {
        self.cross_validation.as_ref()
    }

    /// Most recently computed metrics
    pub fn metrics(&self) -> Option<&MetricsTable> {
        self.metrics.as_ref()
    }

    /// Cross-validate the model over the training partition and keep the
    /// result.
    pub fn run_cross_validation(&mut self, options: &CrossValidationOptions) -> Result<&CrossValidationFrame> {
        let result = cross_validation(self.model.spec(), self.model.history(), options)?;
        info!(rows = result.len(), cutoffs = result.cutoffs().len(), "cross-validation finished");
        Ok(self.cross_validation.insert(result))
    }

    /// Summarise the cross-validation result per horizon, replacing any
    /// previously computed metrics.
    ///
    /// # Errors
    ///
    /// [`ForecastError::State`] when cross-validation has not been run.
    pub fn compute_metrics(&mut self, request: &MetricsRequest) -> Result<&MetricsTable> {
        let cv = self.cross_validation.as_ref().ok_or_else(|| {
            ForecastError::State(
                "cross-validation not yet run; call run_cross_validation first".to_string(),
            )
        })?;

        let mut table = performance_metrics(cv, &request.metrics, request.rolling_window)?;
        if request.include_aggregates {
            table.push_row_mean(MEAN_METRICS_COLUMN);
            table.push_summary_row();
        }
        let has = |m: Metric| table.columns().iter().any(|c| c == m.name());
        if request.include_diff && has(Metric::Rmse) && has(Metric::Mae) {
            table.push_abs_diff(DIFF_COLUMN, Metric::Rmse.name(), Metric::Mae.name())?;
        }
        debug!(rows = table.len(), columns = table.columns().len(), "metrics computed");

        Ok(self.metrics.insert(table))
    }

    /// Draw the forecast with its band, the history, and the test
    /// observations when there are any.
    ///
    /// Draws on `ax` when given, otherwise on a new wide axis. Returns the
    /// axis, or `None` once it has been shown when `options.show` is set.
    pub fn render_forecast(&self, options: &ForecastPlot, ax: Option<Axes>) -> Result<Option<Axes>> {
        if self.forecast.is_empty() {
            return Err(ForecastError::Validation("forecast is empty".to_string()));
        }
        if options.month_tick_interval == 0 {
            return Err(ForecastError::Validation(
                "month tick interval must be positive".to_string(),
            ));
        }
        let mut ax = ax.unwrap_or_else(Axes::wide);
        self.model.plot_onto(&self.forecast, &mut ax, &options.model_plot)?;

        let train_dates = self.train.timestamps()?;
        let first = train_dates.iter().min().copied();
        let tick_style = TextStyle::new(12, Color::DARK_GRAY);

        if options.show_test && !self.test.is_empty() {
            let observed = self
                .test
                .dataframe()
                .select([DATE_COLUMN, TARGET_COLUMN])?;
            let overlay = TimeSeriesPlot {
                presentation: options.presentation.clone(),
                month_interval: options.month_tick_interval,
                style: options.test_style,
                label: Some("Test".to_string()),
                ..TimeSeriesPlot::default()
            };
            draw_time_series(&observed, &mut ax, &overlay)?;

            let last = self.test.timestamps()?.into_iter().max();
            if let (Some(first), Some(last)) = (first, last) {
                ax.set_x_ticks(
                    month_ticks(first, last, options.month_tick_interval, MonthLocale::English),
                    tick_style,
                );
            }
        } else {
            if let (Some(first), Some(last)) = (first, train_dates.iter().max().copied()) {
                ax.set_x_ticks(
                    month_ticks(first, last, options.month_tick_interval, MonthLocale::English),
                    tick_style,
                );
            }
            apply_presentation(&mut ax, &options.presentation);
        }

        if options.show {
            ax.show()?;
            return Ok(None);
        }
        Ok(Some(ax))
    }

    /// Chart `metric` against the horizon for the cutoffs at the given
    /// positions; negative positions count from the last cutoff.
    ///
    /// # Errors
    ///
    /// [`ForecastError::State`] when cross-validation has not been run or
    /// produced no rows, [`ForecastError::InvalidArgument`] when a position
    /// does not address a cutoff.
    pub fn render_cross_validation_metric(&self, cutoff_indices: &[isize], metric: Metric) -> Result<Axes> {
        let cv = self
            .cross_validation
            .as_ref()
            .filter(|cv| !cv.is_empty())
            .ok_or_else(|| ForecastError::State("run cross-validation first".to_string()))?;
        if cutoff_indices.is_empty() {
            return Err(ForecastError::InvalidArgument(
                "at least one cutoff index is required".to_string(),
            ));
        }

        let cutoffs = cv.select_cutoffs(cutoff_indices)?;
        let subset = cv.filter_cutoffs(&cutoffs);
        debug!(cutoffs = cutoffs.len(), rows = subset.len(), %metric, "charting cross-validation metric");
        plot_cross_validation_metric(&subset, metric, CHART_ROLLING_WINDOW, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_timestamp;
    use chrono::Duration;

    fn forecaster(weeks: i64) -> WeeklyForecaster {
        let start = parse_timestamp("2020-03-01").unwrap();
        let dates: Vec<_> = (0..weeks).map(|i| start + Duration::weeks(i)).collect();
        let values: Vec<f64> = (0..weeks).map(|i| 50.0 + 3.0 * i as f64).collect();
        let df = TimeSeriesTable::from_columns(&dates, &values)
            .unwrap()
            .into_dataframe();
        WeeklyForecaster::new(df, ForecasterConfig::default()).unwrap()
    }

    #[test]
    fn test_chart_of_empty_cross_validation() {
        let mut forecaster = forecaster(30);
        forecaster.cross_validation = Some(CrossValidationFrame::new(Vec::new()));

        let result = forecaster.render_cross_validation_metric(&[0], Metric::Rmse);
        assert!(matches!(result, Err(ForecastError::State(_))));
    }
}
