//! Forecasting models for weekly time series

use crate::data::{TimeSeriesTable, DATE_COLUMN};
use crate::error::{ForecastError, Result};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use series_plot::columns::datetime_series;
use std::collections::BTreeMap;
use std::fmt::Debug;

pub mod additive;
pub mod plot;

/// Predictions for a table of timestamps, one row per input row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastFrame {
    /// Timestamps, in the order of the input table
    pub(crate) ds: Vec<NaiveDateTime>,
    pub(crate) trend: Vec<f64>,
    pub(crate) yhat_lower: Vec<f64>,
    pub(crate) yhat_upper: Vec<f64>,
    pub(crate) yhat: Vec<f64>,
    /// Additive components by name (seasonalities, holidays, regressors)
    pub(crate) components: BTreeMap<String, Vec<f64>>,
}

impl ForecastFrame {
    /// Create a forecast frame, checking that all columns have one value per
    /// timestamp.
    pub fn new(
        ds: Vec<NaiveDateTime>,
        trend: Vec<f64>,
        yhat_lower: Vec<f64>,
        yhat_upper: Vec<f64>,
        yhat: Vec<f64>,
        components: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let n = ds.len();
        let lengths = [
            ("trend", trend.len()),
            ("yhat_lower", yhat_lower.len()),
            ("yhat_upper", yhat_upper.len()),
            ("yhat", yhat.len()),
        ];
        for (name, len) in lengths
            .into_iter()
            .chain(components.iter().map(|(k, v)| (k.as_str(), v.len())))
        {
            if len != n {
                return Err(ForecastError::Validation(format!(
                    "column '{}' has {} values for {} timestamps",
                    name, len, n
                )));
            }
        }

        Ok(Self {
            ds,
            trend,
            yhat_lower,
            yhat_upper,
            yhat,
            components,
        })
    }

    pub fn len(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }

    pub fn ds(&self) -> &[NaiveDateTime] {
        &self.ds
    }

    pub fn yhat(&self) -> &[f64] {
        &self.yhat
    }

    pub fn yhat_lower(&self) -> &[f64] {
        &self.yhat_lower
    }

    pub fn yhat_upper(&self) -> &[f64] {
        &self.yhat_upper
    }

    pub fn trend(&self) -> &[f64] {
        &self.trend
    }

    /// A named additive component, e.g. `weekly` or `holidays`
    pub fn component(&self, name: &str) -> Option<&[f64]> {
        self.components.get(name).map(Vec::as_slice)
    }

    pub fn component_names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Columns `ds, trend, yhat_lower, yhat_upper, <components>, yhat`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns = vec![
            datetime_series(DATE_COLUMN, &self.ds)?,
            Series::new("trend", &self.trend),
            Series::new("yhat_lower", &self.yhat_lower),
            Series::new("yhat_upper", &self.yhat_upper),
        ];
        for (name, values) in &self.components {
            columns.push(Series::new(name, values));
        }
        columns.push(Series::new("yhat", &self.yhat));
        Ok(DataFrame::new(columns)?)
    }
}

/// Model in its configuration phase
pub trait ForecastModel: Debug + Clone {
    /// Trained model type
    type Trained: TrainedForecastModel;

    /// Fit the model to a history table with `ds` and `y` columns
    fn train(&self, data: &TimeSeriesTable) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Fitted model; its configuration can no longer change
pub trait TrainedForecastModel: Debug {
    /// Predict for every row of a table with a `ds` column (and any
    /// regressor columns); `y` is not required.
    fn predict(&self, data: &TimeSeriesTable) -> Result<ForecastFrame>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_timestamp;

    #[test]
    fn test_frame_length_check() {
        let ds = vec![parse_timestamp("2020-01-05").unwrap()];
        let result = ForecastFrame::new(
            ds,
            vec![1.0],
            vec![0.5],
            vec![1.5],
            vec![1.0, 2.0],
            BTreeMap::new(),
        );
        assert!(matches!(result, Err(ForecastError::Validation(_))));
    }

    #[test]
    fn test_frame_to_dataframe() {
        let ds = vec![
            parse_timestamp("2020-01-05").unwrap(),
            parse_timestamp("2020-01-12").unwrap(),
        ];
        let mut components = BTreeMap::new();
        components.insert("weekly".to_string(), vec![0.1, -0.1]);
        let frame = ForecastFrame::new(
            ds,
            vec![1.0, 2.0],
            vec![0.5, 1.5],
            vec![1.5, 2.5],
            vec![1.1, 1.9],
            components,
        )
        .unwrap();

        let df = frame.to_dataframe().unwrap();
        assert_eq!(
            df.get_column_names(),
            vec!["ds", "trend", "yhat_lower", "yhat_upper", "weekly", "yhat"]
        );
        assert_eq!(df.height(), 2);
    }
}
