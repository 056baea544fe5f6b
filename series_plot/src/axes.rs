//! Axis scene model
//!
//! An [`Axes`] records everything a chart shows: decorations, drawn layers,
//! ticks, formatters and limits. Plot functions mutate it in call order and
//! [`crate::render`] draws the final scene with plotters.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Label function for a tick: `(value, position) -> label`
pub type TickFormatter = fn(f64, usize) -> String;

/// Convert an instant to the x coordinate used for date axes (days since the
/// Unix epoch).
pub fn date_to_x(date: NaiveDateTime) -> f64 {
    date.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY
}

/// Inverse of [`date_to_x`]
pub fn x_to_date(x: f64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis((x * MILLIS_PER_DAY).round() as i64).map(|d| d.naive_utc())
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const BLACK: Color = Color(0, 0, 0);
    pub const WHITE: Color = Color(255, 255, 255);
    pub const RED: Color = Color(255, 0, 0);
    pub const GRAY: Color = Color(128, 128, 128);
    /// `#333333`, used for labels and tick text
    pub const DARK_GRAY: Color = Color(0x33, 0x33, 0x33);
    /// `#0072B2`, the forecast line color
    pub const FORECAST_BLUE: Color = Color(0x00, 0x72, 0xB2);
}

/// Font size and color of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: u32,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: u32, color: Color) -> Self {
        Self { size, color }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(12, Color::BLACK)
    }
}

/// A text with its style
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub style: TextStyle,
}

/// What an axis-relative annotation is for. Setting an annotation replaces
/// any previous one with the same role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRole {
    Subtitle,
    Source,
    Note(String),
}

/// Text placed in axis-relative coordinates: `(0, 0)` is the bottom-left
/// corner of the plotting area and `(1, 1)` the top-right.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub role: TextRole,
    pub x: f64,
    pub y: f64,
    pub label: Label,
}

/// The four lines framing the plotting area
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spine {
    Top,
    Right,
    Bottom,
    Left,
}

/// Which grid lines to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridAxis {
    /// Vertical lines at x ticks
    X,
    /// Horizontal lines at y ticks
    Y,
    Both,
}

/// Grid line styling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStyle {
    pub axis: GridAxis,
    pub alpha: f64,
    pub color: Color,
}

impl Default for GridStyle {
    fn default() -> Self {
        Self {
            axis: GridAxis::Y,
            alpha: 0.6,
            color: Color(0xB0, 0xB0, 0xB0),
        }
    }
}

/// Marker drawn at each data point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Radius in pixels
    pub size: u32,
}

/// How a data series is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: Color,
    /// Width of the connecting line; `None` draws no line
    pub line_width: Option<u32>,
    pub marker: Option<Marker>,
}

impl SeriesStyle {
    /// Solid line without markers
    pub fn line(color: Color, width: u32) -> Self {
        Self {
            color,
            line_width: Some(width),
            marker: None,
        }
    }

    /// Markers only, no connecting line
    pub fn points(color: Color, size: u32) -> Self {
        Self {
            color,
            line_width: None,
            marker: Some(Marker { size }),
        }
    }
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self::line(Color::FORECAST_BLUE, 2)
    }
}

/// Something drawn inside the plotting area
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// A series of (x, y) points
    Series {
        points: Vec<(f64, f64)>,
        style: SeriesStyle,
        label: Option<String>,
    },
    /// A filled region between two curves sharing x values
    Band {
        x: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
        color: Color,
        alpha: f64,
    },
}

/// A tick with its label
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// A single chart axis and everything drawn on it
#[derive(Debug, Clone)]
pub struct Axes {
    size: (u32, u32),
    title: Option<Label>,
    xlabel: Option<Label>,
    ylabel: Option<Label>,
    annotations: Vec<Annotation>,
    hidden_spines: BTreeSet<Spine>,
    grid: Option<GridStyle>,
    layers: Vec<Layer>,
    x_ticks: Option<Vec<Tick>>,
    x_tick_style: TextStyle,
    y_tick_style: TextStyle,
    x_formatter: Option<TickFormatter>,
    y_formatter: Option<TickFormatter>,
    x_limits: Option<(f64, f64)>,
    y_limits: Option<(f64, f64)>,
    x_is_date: bool,
}

impl Default for Axes {
    fn default() -> Self {
        Self::with_size(640, 480)
    }
}

impl Axes {
    /// A new empty axis of the default size
    pub fn new() -> Self {
        Self::default()
    }

    /// A new empty axis of `width` x `height` pixels
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            title: None,
            xlabel: None,
            ylabel: None,
            annotations: Vec::new(),
            hidden_spines: BTreeSet::new(),
            grid: None,
            layers: Vec::new(),
            x_ticks: None,
            x_tick_style: TextStyle::default(),
            y_tick_style: TextStyle::default(),
            x_formatter: None,
            y_formatter: None,
            x_limits: None,
            y_limits: None,
            x_is_date: false,
        }
    }

    /// A wide landscape axis (2000 x 1000)
    pub fn wide() -> Self {
        Self::with_size(2000, 1000)
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn set_title(&mut self, text: impl Into<String>, style: TextStyle) {
        self.title = Some(Label {
            text: text.into(),
            style,
        });
    }

    pub fn title(&self) -> Option<&Label> {
        self.title.as_ref()
    }

    pub fn set_xlabel(&mut self, text: impl Into<String>, style: TextStyle) {
        self.xlabel = Some(Label {
            text: text.into(),
            style,
        });
    }

    pub fn xlabel(&self) -> Option<&Label> {
        self.xlabel.as_ref()
    }

    pub fn set_ylabel(&mut self, text: impl Into<String>, style: TextStyle) {
        self.ylabel = Some(Label {
            text: text.into(),
            style,
        });
    }

    pub fn ylabel(&self) -> Option<&Label> {
        self.ylabel.as_ref()
    }

    /// Place text at axis-relative coordinates, replacing any annotation with
    /// the same role.
    pub fn annotate(&mut self, role: TextRole, x: f64, y: f64, text: impl Into<String>, style: TextStyle) {
        self.annotations.retain(|a| a.role != role);
        self.annotations.push(Annotation {
            role,
            x,
            y,
            label: Label {
                text: text.into(),
                style,
            },
        });
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The annotation with the given role, if any
    pub fn annotation(&self, role: &TextRole) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.role == role)
    }

    pub fn hide_spine(&mut self, spine: Spine) {
        self.hidden_spines.insert(spine);
    }

    pub fn is_spine_visible(&self, spine: Spine) -> bool {
        !self.hidden_spines.contains(&spine)
    }

    pub fn set_grid(&mut self, grid: GridStyle) {
        self.grid = Some(grid);
    }

    pub fn grid(&self) -> Option<&GridStyle> {
        self.grid.as_ref()
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Draw a date series; marks the x axis as a date axis.
    pub fn plot_dates(&mut self, dates: &[NaiveDateTime], values: &[f64], style: SeriesStyle, label: Option<String>) {
        let points = dates
            .iter()
            .zip(values)
            .map(|(&d, &v)| (date_to_x(d), v))
            .collect();
        self.x_is_date = true;
        self.add_layer(Layer::Series {
            points,
            style,
            label,
        });
    }

    /// Fill between two curves over dates; marks the x axis as a date axis.
    pub fn fill_between_dates(&mut self, dates: &[NaiveDateTime], lower: &[f64], upper: &[f64], color: Color, alpha: f64) {
        self.x_is_date = true;
        self.add_layer(Layer::Band {
            x: dates.iter().map(|&d| date_to_x(d)).collect(),
            lower: lower.to_vec(),
            upper: upper.to_vec(),
            color,
            alpha,
        });
    }

    pub fn is_date_axis(&self) -> bool {
        self.x_is_date
    }

    pub fn set_x_ticks(&mut self, ticks: Vec<Tick>, style: TextStyle) {
        self.x_ticks = Some(ticks);
        self.x_tick_style = style;
    }

    pub fn x_ticks(&self) -> Option<&[Tick]> {
        self.x_ticks.as_deref()
    }

    pub fn x_tick_style(&self) -> TextStyle {
        self.x_tick_style
    }

    pub fn set_y_tick_style(&mut self, style: TextStyle) {
        self.y_tick_style = style;
    }

    pub fn y_tick_style(&self) -> TextStyle {
        self.y_tick_style
    }

    pub fn set_x_formatter(&mut self, formatter: TickFormatter) {
        self.x_formatter = Some(formatter);
    }

    pub fn set_y_formatter(&mut self, formatter: TickFormatter) {
        self.y_formatter = Some(formatter);
    }

    pub fn set_x_limits(&mut self, min: f64, max: f64) {
        self.x_limits = Some((min, max));
    }

    pub fn x_limits(&self) -> Option<(f64, f64)> {
        self.x_limits
    }

    pub fn set_y_limits(&mut self, min: f64, max: f64) {
        self.y_limits = Some((min, max));
    }

    pub fn y_limits(&self) -> Option<(f64, f64)> {
        self.y_limits
    }

    /// Label for an x tick at `pos`
    pub fn format_x(&self, value: f64, pos: usize) -> String {
        if let Some(formatter) = self.x_formatter {
            return formatter(value, pos);
        }
        if let Some(tick) = self
            .x_ticks
            .as_ref()
            .and_then(|ticks| ticks.iter().find(|t| (t.value - value).abs() < 1e-9))
        {
            return tick.label.clone();
        }
        if self.x_is_date {
            return x_to_date(value)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default();
        }
        format!("{}", value)
    }

    /// Label for a y tick at `pos`
    pub fn format_y(&self, value: f64, pos: usize) -> String {
        match self.y_formatter {
            Some(formatter) => formatter(value, pos),
            None => format!("{}", value),
        }
    }

    /// Visible data range: explicit limits where set, otherwise the extent
    /// of all layers padded by 5%.
    pub fn view_bounds(&self) -> ((f64, f64), (f64, f64)) {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        let mut include = |x: f64, y: f64| {
            if x.is_finite() {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
            }
            if y.is_finite() {
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        };

        for layer in &self.layers {
            match layer {
                Layer::Series { points, .. } => points.iter().for_each(|&(x, y)| include(x, y)),
                Layer::Band { x, lower, upper, .. } => {
                    for (i, &xi) in x.iter().enumerate() {
                        if let Some(&lo) = lower.get(i) {
                            include(xi, lo);
                        }
                        if let Some(&hi) = upper.get(i) {
                            include(xi, hi);
                        }
                    }
                }
            }
        }

        let x = self.x_limits.unwrap_or_else(|| padded(x_min, x_max));
        let y = self.y_limits.unwrap_or_else(|| padded(y_min, y_max));
        (x, y)
    }
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span <= 0.0 {
        return (min - 1.0, max + 1.0);
    }
    (min - span * 0.05, max + span * 0.05)
}
