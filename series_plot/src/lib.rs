//! # Series Plot
//!
//! Chart helpers for time series: a consistent presentation (title,
//! subtitle, labels, source attribution, spines, grid), a date/value line
//! chart with month ticks, and tick formatters.
//!
//! Charts are described by an [`Axes`] scene that plot functions mutate in
//! call order. Scenes are drawn with plotters, as SVG.
//!
//! ```no_run
//! use polars::prelude::*;
//! use series_plot::{plot_time_series, thousand_formatter, TimeSeriesPlot};
//!
//! # fn frame() -> DataFrame { unimplemented!() }
//! let df = frame(); // one Date column, one numeric column
//! let options = TimeSeriesPlot {
//!     formatter_y: Some(thousand_formatter),
//!     ..TimeSeriesPlot::default()
//! };
//! let ax = plot_time_series(&df, None, &options)?.expect("not shown");
//! ax.render_svg("cases.svg")?;
//! # Ok::<(), series_plot::PlotError>(())
//! ```

pub mod axes;
pub mod columns;
pub mod error;
pub mod formatters;
pub mod presentation;
pub mod render;
pub mod ticks;
pub mod time_series;

// Re-export commonly used types
pub use crate::axes::{
    date_to_x, x_to_date, Axes, Color, GridAxis, GridStyle, Layer, Marker, SeriesStyle, Spine,
    TextRole, TextStyle, Tick, TickFormatter,
};
pub use crate::error::{PlotError, Result};
pub use crate::formatters::{million_formatter, percent_formatter, thousand_formatter};
pub use crate::presentation::{apply_presentation, Presentation, DEFAULT_SOURCE};
pub use crate::ticks::{month_starts, month_ticks, MonthLocale};
pub use crate::time_series::{draw_time_series, plot_time_series, TimeSeriesPlot};
