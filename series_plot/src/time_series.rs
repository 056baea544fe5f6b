//! Line chart of a single value over time

use crate::axes::{Axes, Color, SeriesStyle, TextStyle, TickFormatter};
use crate::columns::{datetime_values, f64_values, is_date_like};
use crate::error::{PlotError, Result};
use crate::presentation::{apply_presentation, Presentation};
use crate::ticks::{month_ticks, MonthLocale};
use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::debug;

/// Options for [`plot_time_series`]
#[derive(Debug, Clone)]
pub struct TimeSeriesPlot {
    pub presentation: Presentation,
    /// Render with [`Axes::show`] and return nothing
    pub show: bool,
    /// Months between x ticks
    pub month_interval: u32,
    pub locale: MonthLocale,
    pub formatter_x: Option<TickFormatter>,
    pub formatter_y: Option<TickFormatter>,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub style: SeriesStyle,
    /// Legend entry for the series
    pub label: Option<String>,
}

impl Default for TimeSeriesPlot {
    fn default() -> Self {
        Self {
            presentation: Presentation::default(),
            show: false,
            month_interval: 2,
            locale: MonthLocale::Portuguese,
            formatter_x: None,
            formatter_y: None,
            xlim: None,
            ylim: None,
            style: SeriesStyle::default(),
            label: None,
        }
    }
}

/// Plot a two-column table (one date column, one numeric column) as a
/// series over time.
///
/// Draws on `ax` when given, otherwise on a new default-sized axis. Returns
/// the axis, or `None` once it has been shown when `options.show` is set.
///
/// # Errors
///
/// [`PlotError::Validation`] when the table does not have exactly two
/// columns, has no date column, or has no numeric column.
pub fn plot_time_series(df: &DataFrame, ax: Option<Axes>, options: &TimeSeriesPlot) -> Result<Option<Axes>> {
    let mut ax = ax.unwrap_or_default();
    draw_time_series(df, &mut ax, options)?;

    if options.show {
        ax.show()?;
        return Ok(None);
    }
    Ok(Some(ax))
}

/// Draw the series of [`plot_time_series`] onto an existing axis, leaving
/// `options.show` to the caller.
pub fn draw_time_series(df: &DataFrame, ax: &mut Axes, options: &TimeSeriesPlot) -> Result<()> {
    let (dates, values) = date_value_pairs(df)?;
    if options.month_interval == 0 {
        return Err(PlotError::Validation(
            "month interval must be positive".to_string(),
        ));
    }

    ax.plot_dates(&dates, &values, options.style, options.label.clone());

    apply_presentation(ax, &options.presentation);

    if let (Some(&first), Some(&last)) = (dates.iter().min(), dates.iter().max()) {
        let ticks = month_ticks(first, last, options.month_interval, options.locale);
        debug!(ticks = ticks.len(), "applying month ticks");
        ax.set_x_ticks(ticks, TextStyle::new(15, Color::DARK_GRAY));
    }

    if let Some(formatter) = options.formatter_x {
        ax.set_x_formatter(formatter);
    }
    if let Some(formatter) = options.formatter_y {
        ax.set_y_formatter(formatter);
    }
    if let Some((min, max)) = options.xlim {
        ax.set_x_limits(min, max);
    }
    if let Some((min, max)) = options.ylim {
        ax.set_y_limits(min, max);
    }
    Ok(())
}

/// Validate the table shape and return its rows as (date, value) pairs,
/// skipping rows where either side is null.
fn date_value_pairs(df: &DataFrame) -> Result<(Vec<NaiveDateTime>, Vec<f64>)> {
    if df.width() != 2 {
        return Err(PlotError::Validation(
            "table must have exactly two columns".to_string(),
        ));
    }

    let columns = df.get_columns();
    let date_idx = columns
        .iter()
        .position(|s| is_date_like(s.dtype()))
        .ok_or_else(|| PlotError::Validation("x-axis must be temporal".to_string()))?;
    let value_col = &columns[1 - date_idx];
    if !value_col.dtype().is_numeric() {
        return Err(PlotError::Validation("y-axis must be numeric".to_string()));
    }

    let mut date_col = columns[date_idx].clone();
    date_col.rename("date");
    let mut value_col = value_col.clone();
    value_col.rename("y");
    let renamed = DataFrame::new(vec![date_col, value_col])?;
    debug!(rows = renamed.height(), "plotting time series");

    let dates = datetime_values(renamed.column("date")?)?;
    let values = f64_values(renamed.column("y")?)?;
    let pairs: (Vec<NaiveDateTime>, Vec<f64>) = dates
        .into_iter()
        .zip(values)
        .filter_map(|(d, v)| Some((d?, v?)))
        .unzip();
    Ok(pairs)
}
