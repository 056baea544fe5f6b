//! Rolling-origin cross-validation
//!
//! The model is refitted on the history up to each cutoff and evaluated on
//! the following `horizon`. Cutoffs are generated backwards from the end of
//! the history, `period` apart, leaving at least `initial` of training data
//! before the first one.

use crate::data::{TimeSeriesTable, DATE_COLUMN, TARGET_COLUMN};
use crate::error::{ForecastError, Result};
use crate::metrics::{point_metric, rolling_by_horizon, Metric};
use crate::models::{ForecastModel, TrainedForecastModel};
use chrono::{Duration, NaiveDateTime};
use polars::prelude::*;
use series_plot::columns::datetime_series;
use series_plot::{Axes, Color, GridAxis, GridStyle, Layer, SeriesStyle, TextStyle};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Parameters of [`cross_validation`]
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationOptions {
    /// Forecast horizon evaluated after each cutoff
    pub horizon: Duration,
    /// Spacing between cutoffs; half the horizon when unset
    pub period: Option<Duration>,
    /// Minimum training span before the first cutoff; three horizons when unset
    pub initial: Option<Duration>,
    /// Explicit cutoffs, used instead of generated ones
    pub cutoffs: Option<Vec<NaiveDateTime>>,
}

impl CrossValidationOptions {
    pub fn new(horizon: Duration) -> Self {
        Self {
            horizon,
            period: None,
            initial: None,
            cutoffs: None,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = Some(period);
        self
    }

    pub fn with_initial(mut self, initial: Duration) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn with_cutoffs(mut self, cutoffs: Vec<NaiveDateTime>) -> Self {
        self.cutoffs = Some(cutoffs);
        self
    }

    pub fn period(&self) -> Duration {
        self.period.unwrap_or(self.horizon / 2)
    }

    pub fn initial(&self) -> Duration {
        self.initial.unwrap_or(self.horizon * 3)
    }
}

/// One evaluated prediction
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationRow {
    pub ds: NaiveDateTime,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub y: f64,
    pub cutoff: NaiveDateTime,
}

impl CrossValidationRow {
    /// Distance from the cutoff to the evaluated timestamp
    pub fn horizon(&self) -> Duration {
        self.ds - self.cutoff
    }
}

/// Rows of a cross-validation run, ordered by cutoff
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CrossValidationFrame {
    rows: Vec<CrossValidationRow>,
}

impl CrossValidationFrame {
    pub fn new(rows: Vec<CrossValidationRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CrossValidationRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct cutoffs in order of first appearance
    pub fn cutoffs(&self) -> Vec<NaiveDateTime> {
        let mut seen = BTreeSet::new();
        self.rows
            .iter()
            .filter(|row| seen.insert(row.cutoff))
            .map(|row| row.cutoff)
            .collect()
    }

    /// Cutoffs at the given positions of [`Self::cutoffs`]; negative
    /// positions count from the last cutoff.
    pub fn select_cutoffs(&self, positions: &[isize]) -> Result<Vec<NaiveDateTime>> {
        let cutoffs = self.cutoffs();
        let n = cutoffs.len() as isize;
        positions
            .iter()
            .map(|&pos| {
                let idx = if pos < 0 { n + pos } else { pos };
                if (0..n).contains(&idx) {
                    Ok(cutoffs[idx as usize])
                } else {
                    Err(ForecastError::InvalidArgument(format!(
                        "cutoff index {} is out of range for {} cutoffs",
                        pos, n
                    )))
                }
            })
            .collect()
    }

    /// Rows whose cutoff is one of `cutoffs`
    pub fn filter_cutoffs(&self, cutoffs: &[NaiveDateTime]) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|row| cutoffs.contains(&row.cutoff))
            .cloned()
            .collect();
        Self { rows }
    }

    /// Columns `ds, yhat, yhat_lower, yhat_upper, y, cutoff`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let ds: Vec<NaiveDateTime> = self.rows.iter().map(|r| r.ds).collect();
        let cutoffs: Vec<NaiveDateTime> = self.rows.iter().map(|r| r.cutoff).collect();
        let column = |f: fn(&CrossValidationRow) -> f64| self.rows.iter().map(f).collect::<Vec<f64>>();

        let df = DataFrame::new(vec![
            datetime_series(DATE_COLUMN, &ds)?,
            Series::new("yhat", column(|r| r.yhat)),
            Series::new("yhat_lower", column(|r| r.yhat_lower)),
            Series::new("yhat_upper", column(|r| r.yhat_upper)),
            Series::new(TARGET_COLUMN, column(|r| r.y)),
            datetime_series("cutoff", &cutoffs)?,
        ])?;
        Ok(df)
    }
}

/// Cutoffs walking back from `max(ds) - horizon` in steps of `period`,
/// keeping at least `initial` of history before the earliest one.
pub fn generate_cutoffs(ds: &[NaiveDateTime], horizon: Duration, period: Duration, initial: Duration) -> Result<Vec<NaiveDateTime>> {
    let (min_ds, max_ds) = match (ds.iter().min(), ds.iter().max()) {
        (Some(&min), Some(&max)) => (min, max),
        _ => return Err(ForecastError::Validation("history is empty".to_string())),
    };

    let mut cutoff = max_ds - horizon;
    if cutoff < min_ds {
        return Err(ForecastError::Validation(
            "less data than the horizon".to_string(),
        ));
    }

    let mut result = vec![cutoff];
    while result.last().map_or(false, |&last| last >= min_ds + initial) {
        cutoff = cutoff - period;
        // Skip back over windows without data
        let window_empty = !ds.iter().any(|&d| d > cutoff && d <= cutoff + horizon);
        if window_empty && cutoff > min_ds {
            if let Some(&closest) = ds.iter().filter(|&&d| d <= cutoff).max() {
                cutoff = closest - horizon;
            }
        }
        result.push(cutoff);
    }
    result.pop();

    if result.is_empty() {
        return Err(ForecastError::Validation(
            "less data than the horizon after the initial window; make horizon or initial shorter"
                .to_string(),
        ));
    }
    result.reverse();
    Ok(result)
}

/// Rolling-origin cross-validation of `model` over `history`.
///
/// # Errors
///
/// [`ForecastError::Validation`] when the history is too short for the
/// horizon and initial window, or when explicit cutoffs fall outside it.
pub fn cross_validation<M: ForecastModel>(
    model: &M,
    history: &TimeSeriesTable,
    options: &CrossValidationOptions,
) -> Result<CrossValidationFrame> {
    let horizon = options.horizon;
    let period = options.period();
    let initial = options.initial();
    if horizon <= Duration::zero() || period <= Duration::zero() {
        return Err(ForecastError::InvalidArgument(
            "horizon and period must be positive".to_string(),
        ));
    }
    if initial < period {
        warn!(
            initial_days = initial.num_days(),
            period_days = period.num_days(),
            "initial window is shorter than the period between cutoffs"
        );
    }

    let ds = history.timestamps()?;
    let cutoffs = match &options.cutoffs {
        Some(explicit) => {
            let (min_ds, max_ds) = match (ds.iter().min(), ds.iter().max()) {
                (Some(&min), Some(&max)) => (min, max),
                _ => return Err(ForecastError::Validation("history is empty".to_string())),
            };
            if explicit.is_empty() {
                return Err(ForecastError::Validation("no cutoffs given".to_string()));
            }
            if explicit.iter().any(|&c| c <= min_ds) {
                return Err(ForecastError::Validation(
                    "cutoffs must be after the first date of the history".to_string(),
                ));
            }
            if explicit.iter().any(|&c| c > max_ds - horizon) {
                return Err(ForecastError::Validation(
                    "cutoffs must leave a full horizon before the end of the history".to_string(),
                ));
            }
            let mut sorted = explicit.clone();
            sorted.sort();
            sorted
        }
        None => generate_cutoffs(&ds, horizon, period, initial)?,
    };
    info!(
        model = model.name(),
        cutoffs = cutoffs.len(),
        horizon_days = horizon.num_days(),
        "running cross-validation"
    );

    let mut rows = Vec::new();
    for &cutoff in &cutoffs {
        let train = history.filter_dates(|d| d <= cutoff)?;
        if train.len() < 2 {
            return Err(ForecastError::Validation(format!(
                "less than two data points before cutoff {}",
                cutoff
            )));
        }
        let evaluation = history.filter_dates(|d| d > cutoff && d <= cutoff + horizon)?;
        debug!(%cutoff, train = train.len(), evaluated = evaluation.len(), "cross-validation fold");

        let fitted = model.train(&train)?;
        let forecast = fitted.predict(&evaluation)?;
        let actual = evaluation.target()?;

        for (i, &ds) in forecast.ds().iter().enumerate() {
            let y = match actual[i] {
                Some(y) => y,
                None => continue,
            };
            rows.push(CrossValidationRow {
                ds,
                yhat: forecast.yhat()[i],
                yhat_lower: forecast.yhat_lower()[i],
                yhat_upper: forecast.yhat_upper()[i],
                y,
                cutoff,
            });
        }
    }

    Ok(CrossValidationFrame::new(rows))
}

/// Chart a metric against the horizon: each validation row as a grey point
/// and the rolling aggregate as a line.
pub fn plot_cross_validation_metric(
    cv: &CrossValidationFrame,
    metric: Metric,
    rolling_window: f64,
    ax: Option<Axes>,
) -> Result<Axes> {
    if cv.is_empty() {
        return Err(ForecastError::Validation(
            "cross-validation result is empty".to_string(),
        ));
    }

    let mut sorted: Vec<&CrossValidationRow> = cv.rows().iter().collect();
    sorted.sort_by_key(|row| row.horizon());
    let horizons: Vec<i64> = sorted.iter().map(|r| r.horizon().num_milliseconds()).collect();
    let points: Vec<f64> = sorted.iter().map(|r| point_metric(metric, r)).collect();

    let n = sorted.len();
    let w = ((rolling_window * n as f64) as usize).clamp(1, n);
    let rolling = rolling_by_horizon(metric, &horizons, &points, w);

    let days = |ms: i64| ms as f64 / MILLIS_PER_DAY;
    let mut ax = ax.unwrap_or_else(|| Axes::with_size(1000, 600));
    ax.add_layer(Layer::Series {
        points: horizons
            .iter()
            .zip(&points)
            .map(|(&h, &v)| (days(h), v))
            .collect(),
        style: SeriesStyle::points(Color::GRAY, 2),
        label: None,
    });
    ax.add_layer(Layer::Series {
        points: rolling.iter().map(|&(h, v)| (days(h), v)).collect(),
        style: SeriesStyle::line(Color::FORECAST_BLUE, 3),
        label: Some(metric.name().to_string()),
    });
    ax.set_grid(GridStyle {
        axis: GridAxis::Both,
        alpha: 0.2,
        color: Color::GRAY,
    });
    ax.set_xlabel("Horizon (days)", TextStyle::default());
    ax.set_ylabel(metric.name(), TextStyle::default());
    debug!(metric = metric.name(), rows = n, window = w, "drew cross-validation metric");
    Ok(ax)
}
