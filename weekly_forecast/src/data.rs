//! Time series table with `ds`/`y` column conventions

use crate::error::{ForecastError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use series_plot::columns::{datetime_series, datetime_values, f64_values, is_date_like};
use std::path::Path;
use tracing::debug;

/// Name of the timestamp column
pub const DATE_COLUMN: &str = "ds";

/// Name of the observed value column
pub const TARGET_COLUMN: &str = "y";

/// A table with a temporal `ds` column and, usually, a numeric `y` column.
/// Any other numeric columns are available as regressors.
#[derive(Debug, Clone)]
pub struct TimeSeriesTable {
    df: DataFrame,
}

impl TimeSeriesTable {
    /// Wrap a DataFrame, checking that `ds` exists and is temporal.
    pub fn new(df: DataFrame) -> Result<Self> {
        let ds = df.column(DATE_COLUMN).map_err(|_| {
            ForecastError::Validation(format!("table has no '{}' column", DATE_COLUMN))
        })?;
        if !is_date_like(ds.dtype()) {
            return Err(ForecastError::Validation(format!(
                "column '{}' must be a date or datetime, got {}",
                DATE_COLUMN,
                ds.dtype()
            )));
        }
        Ok(Self { df })
    }

    /// Build a table from timestamps and values, for testing and demos
    pub fn from_columns(dates: &[NaiveDateTime], values: &[f64]) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::Validation(format!(
                "{} timestamps but {} values",
                dates.len(),
                values.len()
            )));
        }
        let df = DataFrame::new(vec![
            datetime_series(DATE_COLUMN, dates)?,
            Series::new(TARGET_COLUMN, values),
        ])?;
        Self::new(df)
    }

    /// Load a CSV file with a `ds` column and numeric value columns.
    ///
    /// Dates are read as `%Y-%m-%d` or `%Y-%m-%d %H:%M:%S`; empty value cells
    /// become nulls.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let headers = reader.headers()?.clone();
        let date_idx = headers
            .iter()
            .position(|h| h == DATE_COLUMN)
            .ok_or_else(|| {
                ForecastError::Validation(format!("CSV has no '{}' column", DATE_COLUMN))
            })?;

        let mut dates = Vec::new();
        let mut values: Vec<Vec<Option<f64>>> = vec![Vec::new(); headers.len()];

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            for (idx, field) in record.iter().enumerate() {
                let field = field.trim();
                if idx == date_idx {
                    dates.push(parse_timestamp(field).ok_or_else(|| {
                        ForecastError::Validation(format!(
                            "row {}: cannot parse date '{}'",
                            line + 1,
                            field
                        ))
                    })?);
                } else if field.is_empty() {
                    values[idx].push(None);
                } else {
                    let value = field.parse::<f64>().map_err(|_| {
                        ForecastError::Validation(format!(
                            "row {}: column '{}' has non-numeric value '{}'",
                            line + 1,
                            &headers[idx],
                            field
                        ))
                    })?;
                    values[idx].push(Some(value));
                }
            }
        }

        let mut columns = Vec::with_capacity(headers.len());
        for (idx, name) in headers.iter().enumerate() {
            if idx == date_idx {
                columns.push(datetime_series(DATE_COLUMN, &dates)?);
            } else {
                columns.push(Series::new(name, std::mem::take(&mut values[idx])));
            }
        }

        let df = DataFrame::new(columns)?;
        debug!(rows = df.height(), columns = df.width(), "loaded CSV table");
        Self::new(df)
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// The `ds` column; null timestamps are rejected.
    pub fn timestamps(&self) -> Result<Vec<NaiveDateTime>> {
        datetime_values(self.df.column(DATE_COLUMN)?)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| {
                    ForecastError::Validation(format!("row {} has no timestamp", row))
                })
            })
            .collect()
    }

    /// The `y` column, nulls kept as `None`
    pub fn target(&self) -> Result<Vec<Option<f64>>> {
        self.column_values(TARGET_COLUMN)
    }

    /// A numeric column, nulls kept as `None`
    pub fn column_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let series = self
            .df
            .column(name)
            .map_err(|_| ForecastError::Validation(format!("table has no '{}' column", name)))?;
        if !series.dtype().is_numeric() {
            return Err(ForecastError::Validation(format!(
                "column '{}' must be numeric, got {}",
                name,
                series.dtype()
            )));
        }
        Ok(f64_values(series)?)
    }

    /// A numeric column without nulls
    pub fn column_f64(&self, name: &str) -> Result<Vec<f64>> {
        self.column_values(name)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.ok_or_else(|| {
                    ForecastError::Validation(format!(
                        "column '{}' has a missing value in row {}",
                        name, row
                    ))
                })
            })
            .collect()
    }

    /// Split into the first `len - test_period` rows and the last
    /// `test_period` rows.
    pub fn split(&self, test_period: usize) -> Result<(TimeSeriesTable, TimeSeriesTable)> {
        let n = self.len();
        if test_period > n {
            return Err(ForecastError::Configuration(format!(
                "test period {} exceeds the {} available rows",
                test_period, n
            )));
        }
        let train_len = n - test_period;
        let train = self.df.slice(0, train_len);
        let test = self.df.slice(train_len as i64, test_period);
        Ok((Self { df: train }, Self { df: test }))
    }

    /// The same table without the `y` column
    pub fn without_target(&self) -> Self {
        let df = self.df.drop(TARGET_COLUMN).unwrap_or_else(|_| self.df.clone());
        Self { df }
    }

    /// Rows whose timestamp satisfies `keep`
    pub fn filter_dates<F>(&self, keep: F) -> Result<Self>
    where
        F: Fn(NaiveDateTime) -> bool,
    {
        let mask: BooleanChunked = self.timestamps()?.into_iter().map(keep).collect();
        let df = self.df.filter(&mask)?;
        Ok(Self { df })
    }

    /// Keep only `ds`, `y` and the given columns
    pub fn select(&self, extra: &[String]) -> Result<Self> {
        let mut names = vec![DATE_COLUMN.to_string()];
        if self.has_column(TARGET_COLUMN) {
            names.push(TARGET_COLUMN.to_string());
        }
        names.extend(extra.iter().cloned());
        let df = self.df.select(names)?;
        Ok(Self { df })
    }
}

/// Parse `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn weekly(n: usize) -> TimeSeriesTable {
        let start = parse_timestamp("2020-03-01").unwrap();
        let dates: Vec<_> = (0..n).map(|i| start + Duration::weeks(i as i64)).collect();
        let values: Vec<f64> = (0..n).map(|i| i as f64).collect();
        TimeSeriesTable::from_columns(&dates, &values).unwrap()
    }

    #[test]
    fn test_split_sizes() {
        let table = weekly(10);
        for k in [0, 3, 10] {
            let (train, test) = table.split(k).unwrap();
            assert_eq!(train.len(), 10 - k);
            assert_eq!(test.len(), k);

            let mut joined = train.into_dataframe();
            joined.vstack_mut(test.dataframe()).unwrap();
            assert!(joined.frame_equal(table.dataframe()));
        }
    }

    #[test]
    fn test_split_too_long() {
        assert!(matches!(
            weekly(3).split(4),
            Err(ForecastError::Configuration(_))
        ));
    }

    #[test]
    fn test_requires_temporal_ds() {
        let df = DataFrame::new(vec![
            Series::new("ds", vec![1i64, 2]),
            Series::new("y", vec![1.0, 2.0]),
        ])
        .unwrap();
        assert!(matches!(
            TimeSeriesTable::new(df),
            Err(ForecastError::Validation(_))
        ));
    }

    #[test]
    fn test_filter_and_drop_target() {
        let table = weekly(5);
        let cutoff = parse_timestamp("2020-03-15").unwrap();
        let head = table.filter_dates(|d| d <= cutoff).unwrap();
        assert_eq!(head.len(), 3);

        let future = head.without_target();
        assert!(!future.has_column(TARGET_COLUMN));
        assert_eq!(future.timestamps().unwrap(), head.timestamps().unwrap());
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2021-01-03").is_some());
        assert!(parse_timestamp("2021-01-03 12:30:00").is_some());
        assert!(parse_timestamp("03/01/2021").is_none());
    }
}
