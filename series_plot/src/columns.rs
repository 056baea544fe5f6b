//! Column extraction helpers for polars frames

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

/// True for calendar columns (`Date` or `Datetime`)
pub fn is_date_like(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Date | DataType::Datetime(_, _))
}

/// Read a `Date` or `Datetime` column as naive instants.
pub fn datetime_values(series: &Series) -> PolarsResult<Vec<Option<NaiveDateTime>>> {
    let millis = series
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        .cast(&DataType::Int64)?;
    let values = millis
        .i64()?
        .into_iter()
        .map(|v| v.and_then(DateTime::from_timestamp_millis).map(|d| d.naive_utc()))
        .collect();
    Ok(values)
}

/// Read a numeric column as `f64`.
pub fn f64_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    let values = cast.f64()?.into_iter().collect();
    Ok(values)
}

/// Build a millisecond `Datetime` column.
pub fn datetime_series(name: &str, values: &[NaiveDateTime]) -> PolarsResult<Series> {
    let millis: Vec<i64> = values
        .iter()
        .map(|d| d.and_utc().timestamp_millis())
        .collect();
    Series::new(name, millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
}
