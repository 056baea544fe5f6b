//! Chart presentation: titles, labels, source attribution, spines and grid

use crate::axes::{Axes, Color, GridStyle, Spine, TextRole, TextStyle};
use serde::{Deserialize, Serialize};

/// Default data source credited under each chart
pub const DEFAULT_SOURCE: &str = "https://brasil.io/dataset/covid19/caso_full/";

/// Axis-relative position of the subtitle, just above the plotting area
pub const SUBTITLE_POSITION: (f64, f64) = (0.0, 1.03);

/// Axis-relative position of the source text, below the x axis
pub const SOURCE_POSITION: (f64, f64) = (0.0, -0.1);

/// Decorations applied by [`apply_presentation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presentation {
    pub title: String,
    pub subtitle: String,
    pub xlabel: String,
    pub ylabel: String,
    /// Credited as `fonte:<source>` under the chart
    pub source: String,
    pub hidden_spines: Vec<Spine>,
    pub grid: GridStyle,
}

impl Default for Presentation {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            xlabel: String::new(),
            ylabel: String::new(),
            source: DEFAULT_SOURCE.to_string(),
            hidden_spines: vec![Spine::Top, Spine::Right],
            grid: GridStyle::default(),
        }
    }
}

impl Presentation {
    /// Presentation with the given title and every other field defaulted
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Apply titles, labels, source text, spine visibility and grid to `ax`.
pub fn apply_presentation(ax: &mut Axes, presentation: &Presentation) {
    ax.set_title(format!("{}\n", presentation.title), TextStyle::new(25, Color::BLACK));

    let (sx, sy) = SUBTITLE_POSITION;
    ax.annotate(
        TextRole::Subtitle,
        sx,
        sy,
        presentation.subtitle.clone(),
        TextStyle::new(15, Color::GRAY),
    );

    ax.set_xlabel(presentation.xlabel.clone(), TextStyle::new(15, Color::DARK_GRAY));
    ax.set_ylabel(presentation.ylabel.clone(), TextStyle::new(15, Color::DARK_GRAY));
    ax.set_y_tick_style(TextStyle::new(15, Color::DARK_GRAY));

    let (fx, fy) = SOURCE_POSITION;
    ax.annotate(
        TextRole::Source,
        fx,
        fy,
        format!("fonte:{}", presentation.source),
        TextStyle::new(15, Color::GRAY),
    );

    for &spine in &presentation.hidden_spines {
        ax.hide_spine(spine);
    }
    ax.set_grid(presentation.grid);
}
