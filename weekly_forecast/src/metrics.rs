//! Performance metrics of cross-validation results
//!
//! Metrics are aggregated per horizon over a trailing window: for each
//! horizon, the `w` rows with the largest horizons not exceeding it, where
//! `w` is a share of all rows.

use crate::diagnostics::{CrossValidationFrame, CrossValidationRow};
use crate::error::{ForecastError, Result};
use chrono::Duration;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use series_math::errors::covered;
use series_math::stats::{mean, median};
use series_math::PointError;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Values closer to zero than this make percentage errors meaningless
const NEAR_ZERO: f64 = 1e-8;

/// A forecast accuracy metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Mean squared error
    Mse,
    /// Root mean squared error
    Rmse,
    /// Mean absolute error
    Mae,
    /// Mean absolute percentage error
    Mape,
    /// Median absolute percentage error
    Mdape,
    /// Symmetric mean absolute percentage error
    Smape,
    /// Share of actual values inside the uncertainty interval
    Coverage,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::Mse,
        Metric::Rmse,
        Metric::Mae,
        Metric::Mape,
        Metric::Mdape,
        Metric::Smape,
        Metric::Coverage,
    ];

    /// Column name of the metric
    pub fn name(self) -> &'static str {
        match self {
            Metric::Mse => "mse",
            Metric::Rmse => "rmse",
            Metric::Mae => "mae",
            Metric::Mape => "mape",
            Metric::Mdape => "mdape",
            Metric::Smape => "smape",
            Metric::Coverage => "coverage",
        }
    }

    fn is_percentage(self) -> bool {
        matches!(self, Metric::Mape | Metric::Mdape)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        Metric::ALL
            .into_iter()
            .find(|m| m.name() == lowered)
            .ok_or_else(|| ForecastError::InvalidArgument(format!("unknown metric '{}'", s)))
    }
}

/// Per-row value of `metric` before aggregation. For RMSE this is the
/// squared error; the root is taken after averaging.
fn point_value(metric: Metric, row: &CrossValidationRow) -> f64 {
    match metric {
        Metric::Mse | Metric::Rmse => PointError::Squared.evaluate(row.y, row.yhat),
        Metric::Mae => PointError::Absolute.evaluate(row.y, row.yhat),
        Metric::Mape | Metric::Mdape => PointError::AbsolutePercentage.evaluate(row.y, row.yhat),
        Metric::Smape => PointError::SymmetricAbsolutePercentage.evaluate(row.y, row.yhat),
        Metric::Coverage => covered(row.y, row.yhat_lower, row.yhat_upper),
    }
}

/// Value of `metric` for a single row
pub(crate) fn point_metric(metric: Metric, row: &CrossValidationRow) -> f64 {
    let value = point_value(metric, row);
    match metric {
        Metric::Rmse => value.sqrt(),
        _ => value,
    }
}

/// Trailing-window mean per horizon.
///
/// `h` must be sorted ascending with `x` aligned to it. Each distinct horizon
/// with at least `w` rows at or below it gets the mean of the `w` rows with
/// the largest horizons up to it; the rows of the smallest horizon in the
/// window contribute proportionally when only some of them fit.
pub fn rolling_mean_by_horizon(h: &[i64], x: &[f64], w: usize) -> Vec<(i64, f64)> {
    let groups = group_by_horizon(h, x);
    let mut result = vec![0.0; groups.len()];

    let mut trailing = groups.len() as isize - 1;
    let mut x_sum = 0.0;
    let mut n_sum = 0;
    for i in (0..groups.len()).rev() {
        let (_, sum_i, count_i) = groups[i];
        x_sum += sum_i;
        n_sum += count_i;
        while n_sum >= w && trailing >= 0 {
            let excess_n = n_sum - w;
            let excess_x = excess_n as f64 * sum_i / count_i as f64;
            let t = trailing as usize;
            result[t] = (x_sum - excess_x) / w as f64;
            x_sum -= groups[t].1;
            n_sum -= groups[t].2;
            trailing -= 1;
        }
    }

    let first = (trailing + 1) as usize;
    groups[first..]
        .iter()
        .zip(&result[first..])
        .map(|(&(horizon, _, _), &value)| (horizon, value))
        .collect()
}

/// Trailing-window median per horizon: for each distinct horizon, the median
/// of its rows plus as many preceding rows as needed to reach `w`.
pub fn rolling_median_by_horizon(h: &[i64], x: &[f64], w: usize) -> Vec<(i64, f64)> {
    let mut result = Vec::new();
    let mut end = h.len();
    while end > 0 {
        let horizon = h[end - 1];
        let start = h[..end].partition_point(|&v| v < horizon);
        let mut window: Vec<f64> = x[start..end].to_vec();
        let mut next = start;
        while window.len() < w && next > 0 {
            next -= 1;
            window.push(x[next]);
        }
        if window.len() < w {
            break;
        }
        result.push((horizon, median(&window).unwrap_or(f64::NAN)));
        end = start;
    }
    result.reverse();
    result
}

/// (horizon, sum, count) per distinct horizon of sorted `h`
fn group_by_horizon(h: &[i64], x: &[f64]) -> Vec<(i64, f64, usize)> {
    let mut groups: Vec<(i64, f64, usize)> = Vec::new();
    for (&horizon, &value) in h.iter().zip(x) {
        match groups.last_mut() {
            Some(last) if last.0 == horizon => {
                last.1 += value;
                last.2 += 1;
            }
            _ => groups.push((horizon, value, 1)),
        }
    }
    groups
}

/// Rolling aggregate of per-row values for `metric`
pub(crate) fn rolling_by_horizon(metric: Metric, h: &[i64], points: &[f64], w: usize) -> Vec<(i64, f64)> {
    match metric {
        Metric::Mdape => rolling_median_by_horizon(h, points, w),
        Metric::Rmse => {
            let squared: Vec<f64> = points.iter().map(|p| p * p).collect();
            rolling_mean_by_horizon(h, &squared, w)
                .into_iter()
                .map(|(horizon, mse)| (horizon, mse.sqrt()))
                .collect()
        }
        _ => rolling_mean_by_horizon(h, points, w),
    }
}

/// One row of a [`MetricsTable`]
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    /// Forecast horizon; `None` for the summary row
    pub horizon: Option<Duration>,
    /// One value per table column
    pub values: Vec<f64>,
}

/// Metrics per horizon, optionally with aggregate columns and a summary row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsTable {
    columns: Vec<String>,
    rows: Vec<MetricsRow>,
}

/// Label of the summary row
pub const SUMMARY_LABEL: &str = "mean";

impl MetricsTable {
    pub fn new(columns: Vec<String>, rows: Vec<MetricsRow>) -> Result<Self> {
        if let Some(bad) = rows.iter().find(|r| r.values.len() != columns.len()) {
            return Err(ForecastError::Validation(format!(
                "metrics row has {} values for {} columns",
                bad.values.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[MetricsRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of a column, summary row included
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    pub fn value(&self, row: usize, name: &str) -> Option<f64> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r.values[idx])
    }

    /// Horizons of the per-horizon rows
    pub fn horizons(&self) -> Vec<Duration> {
        self.rows.iter().filter_map(|r| r.horizon).collect()
    }

    /// The appended summary row, if any
    pub fn summary(&self) -> Option<&MetricsRow> {
        self.rows.iter().find(|r| r.horizon.is_none())
    }

    /// Row labels: the position of per-horizon rows, `mean` for the summary
    pub fn labels(&self) -> Vec<String> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, r)| match r.horizon {
                Some(_) => i.to_string(),
                None => SUMMARY_LABEL.to_string(),
            })
            .collect()
    }

    /// Append a column holding the mean of the existing columns in each row.
    pub fn push_row_mean(&mut self, name: &str) {
        for row in &mut self.rows {
            let m = mean(&row.values);
            row.values.push(m);
        }
        self.columns.push(name.to_string());
    }

    /// Append a summary row of column means, with no horizon.
    pub fn push_summary_row(&mut self) {
        let values = (0..self.columns.len())
            .map(|idx| mean(&self.rows.iter().map(|r| r.values[idx]).collect::<Vec<_>>()))
            .collect();
        self.rows.push(MetricsRow {
            horizon: None,
            values,
        });
    }

    /// Append `|a - b|` of two existing columns.
    pub fn push_abs_diff(&mut self, name: &str, a: &str, b: &str) -> Result<()> {
        let (ia, ib) = match (self.column_index(a), self.column_index(b)) {
            (Some(ia), Some(ib)) => (ia, ib),
            _ => {
                return Err(ForecastError::InvalidArgument(format!(
                    "columns '{}' and '{}' are both required",
                    a, b
                )))
            }
        };
        for row in &mut self.rows {
            let diff = (row.values[ia] - row.values[ib]).abs();
            row.values.push(diff);
        }
        self.columns.push(name.to_string());
        Ok(())
    }

    /// Columns `label, horizon, <metrics>`; the summary row has a null horizon.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let horizons: Vec<Option<i64>> = self
            .rows
            .iter()
            .map(|r| r.horizon.map(|h| h.num_milliseconds()))
            .collect();
        let mut columns = vec![
            Series::new("label", self.labels()),
            Series::new("horizon", horizons).cast(&DataType::Duration(TimeUnit::Milliseconds))?,
        ];
        for (idx, name) in self.columns.iter().enumerate() {
            let values: Vec<f64> = self.rows.iter().map(|r| r.values[idx]).collect();
            columns.push(Series::new(name, values));
        }
        Ok(DataFrame::new(columns)?)
    }
}

/// Compute `metrics` per horizon over a trailing window of
/// `rolling_window` (a share of all rows). A negative `rolling_window`
/// yields one row per validation row. An empty metric list means all
/// metrics.
///
/// Percentage metrics are skipped when an actual value is close to zero.
pub fn performance_metrics(cv: &CrossValidationFrame, metrics: &[Metric], rolling_window: f64) -> Result<MetricsTable> {
    if cv.is_empty() {
        return Err(ForecastError::Validation(
            "cross-validation result is empty".to_string(),
        ));
    }

    let requested: Vec<Metric> = if metrics.is_empty() {
        Metric::ALL.to_vec()
    } else {
        metrics.to_vec()
    };
    for (i, metric) in requested.iter().enumerate() {
        if requested[..i].contains(metric) {
            return Err(ForecastError::InvalidArgument(format!(
                "metric '{}' requested more than once",
                metric
            )));
        }
    }

    let near_zero = cv.rows().iter().any(|r| r.y.abs() < NEAR_ZERO);
    let selected: Vec<Metric> = requested
        .into_iter()
        .filter(|m| {
            let skip = near_zero && m.is_percentage();
            if skip {
                info!(metric = m.name(), "skipping percentage metric because y is close to 0");
            }
            !skip
        })
        .collect();
    if selected.is_empty() {
        return Err(ForecastError::Validation(
            "none of the requested metrics can be computed".to_string(),
        ));
    }

    let mut sorted: Vec<&CrossValidationRow> = cv.rows().iter().collect();
    sorted.sort_by_key(|row| row.horizon());
    let n = sorted.len();
    let columns: Vec<String> = selected.iter().map(|m| m.name().to_string()).collect();

    let rows = if rolling_window < 0.0 {
        sorted
            .iter()
            .map(|row| MetricsRow {
                horizon: Some(row.horizon()),
                values: selected.iter().map(|&m| point_metric(m, row)).collect(),
            })
            .collect()
    } else {
        let w = ((rolling_window * n as f64) as usize).clamp(1, n);
        let h: Vec<i64> = sorted.iter().map(|r| r.horizon().num_milliseconds()).collect();

        let per_metric: Vec<Vec<(i64, f64)>> = selected
            .iter()
            .map(|&m| {
                let points: Vec<f64> = sorted.iter().map(|r| point_metric(m, r)).collect();
                rolling_by_horizon(m, &h, &points, w)
            })
            .collect();
        debug!(rows = n, window = w, metrics = selected.len(), "aggregated metrics by horizon");

        // Every metric yields the same horizons
        let horizons: Vec<i64> = per_metric
            .first()
            .map(|values| values.iter().map(|&(horizon, _)| horizon).collect())
            .unwrap_or_default();
        horizons
            .iter()
            .enumerate()
            .map(|(i, &horizon)| MetricsRow {
                horizon: Some(Duration::milliseconds(horizon)),
                values: per_metric.iter().map(|values| values[i].1).collect(),
            })
            .collect()
    };

    MetricsTable::new(columns, rows)
}
