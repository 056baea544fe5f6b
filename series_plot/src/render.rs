//! Drawing an [`Axes`] scene with plotters

use crate::axes::{Axes, Color, GridAxis, Layer, Spine, TextStyle};
use crate::error::{PlotError, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::Color as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Directory that [`Axes::show`] writes into; the system temp dir when unset
pub const PLOT_DIR_ENV: &str = "SERIES_PLOT_DIR";

static SHOWN: AtomicUsize = AtomicUsize::new(0);

fn rgb(color: Color) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

fn font(style: TextStyle) -> plotters::style::TextStyle<'static> {
    ("sans-serif", style.size as f64)
        .into_font()
        .color(&rgb(style.color))
}

fn render_err<E: std::error::Error>(err: E) -> PlotError {
    PlotError::Render(err.to_string())
}

impl Axes {
    /// Render the scene as an SVG file.
    pub fn render_svg<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let root = SVGBackend::new(path.as_ref(), self.size()).into_drawing_area();
        draw(self, &root)?;
        root.present().map_err(render_err)?;
        Ok(())
    }

    /// Render the scene into an SVG document held in memory.
    pub fn to_svg_string(&self) -> Result<String> {
        let mut buffer = String::new();
        {
            let root = SVGBackend::with_string(&mut buffer, self.size()).into_drawing_area();
            draw(self, &root)?;
            root.present().map_err(render_err)?;
        }
        Ok(buffer)
    }

    /// Display the chart by writing it to the plot directory
    /// (`SERIES_PLOT_DIR`, else the temp dir). Returns the written path.
    pub fn show(&self) -> Result<PathBuf> {
        let dir = std::env::var_os(PLOT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);
        std::fs::create_dir_all(&dir)?;

        let stem = self
            .title()
            .map(|t| slug(&t.text))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "figure".to_string());
        let n = SHOWN.fetch_add(1, Ordering::Relaxed);
        let path = dir.join(format!("{}-{}-{}.svg", stem, std::process::id(), n));

        self.render_svg(&path)?;
        info!(path = %path.display(), "chart written");
        Ok(path)
    }
}

fn slug(text: &str) -> String {
    let lowered: String = text
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    lowered
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn draw<DB: DrawingBackend>(ax: &Axes, root: &DrawingArea<DB, Shift>) -> Result<()> {
    root.fill(&WHITE).map_err(render_err)?;
    let ((x0, x1), (y0, y1)) = ax.view_bounds();
    debug!(x0, x1, y0, y1, layers = ax.layers().len(), "rendering axes");

    let mut builder = ChartBuilder::on(root);
    builder.margin(30).x_label_area_size(70).y_label_area_size(110);
    if let Some(title) = ax.title() {
        let text = title.text.trim_end();
        if !text.is_empty() {
            builder.caption(text, font(title.style));
        }
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    let explicit_ticks: Vec<_> = ax
        .x_ticks()
        .map(|ticks| {
            ticks
                .iter()
                .filter(|t| t.value >= x0 && t.value <= x1)
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    let grid = ax.grid().copied();

    {
        let x_fmt = |x: &f64| ax.format_x(*x, 0);
        let y_fmt = |y: &f64| ax.format_y(*y, 0);
        let xdesc = ax.xlabel().map(|l| l.text.clone()).unwrap_or_default();
        let ydesc = ax.ylabel().map(|l| l.text.clone()).unwrap_or_default();
        let desc_style = ax
            .xlabel()
            .map(|l| l.style)
            .unwrap_or_default();

        let mut mesh = chart.configure_mesh();
        mesh.x_desc(xdesc)
            .y_desc(ydesc)
            .axis_desc_style(font(desc_style))
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .x_label_style(font(ax.x_tick_style()))
            .y_label_style(font(ax.y_tick_style()))
            .axis_style(&TRANSPARENT)
            .light_line_style(&TRANSPARENT);
        if ax.x_ticks().is_some() {
            mesh.x_labels(0);
        }

        match grid {
            Some(g) => {
                match g.axis {
                    GridAxis::X => {
                        mesh.disable_y_mesh();
                    }
                    GridAxis::Y => {
                        mesh.disable_x_mesh();
                    }
                    GridAxis::Both => {}
                }
                mesh.bold_line_style(&rgb(g.color).mix(g.alpha));
            }
            None => {
                mesh.disable_mesh();
            }
        }
        mesh.draw().map_err(render_err)?;
    }

    if let Some(g) = grid.filter(|g| g.axis != GridAxis::Y) {
        let color = rgb(g.color).mix(g.alpha);
        chart
            .draw_series(
                explicit_ticks
                    .iter()
                    .map(|t| PathElement::new(vec![(t.value, y0), (t.value, y1)], color)),
            )
            .map_err(render_err)?;
    }

    let mut has_legend = false;
    for layer in ax.layers() {
        match layer {
            Layer::Band {
                x,
                lower,
                upper,
                color,
                alpha,
            } => {
                let mut outline: Vec<(f64, f64)> =
                    x.iter().zip(upper).map(|(&xi, &u)| (xi, u)).collect();
                outline.extend(x.iter().zip(lower).rev().map(|(&xi, &l)| (xi, l)));
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        outline,
                        rgb(*color).mix(*alpha).filled(),
                    )))
                    .map_err(render_err)?;
            }
            Layer::Series {
                points,
                style,
                label,
            } => {
                let color = rgb(style.color);
                if let Some(width) = style.line_width {
                    let drawn = chart
                        .draw_series(std::iter::once(PathElement::new(
                            points.clone(),
                            color.stroke_width(width),
                        )))
                        .map_err(render_err)?;
                    if let Some(label) = label {
                        has_legend = true;
                        drawn.label(label.as_str()).legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 20, y)], color)
                        });
                    }
                }
                if let Some(marker) = style.marker {
                    let drawn = chart
                        .draw_series(
                            points
                                .iter()
                                .map(|&p| Circle::new(p, marker.size, color.filled())),
                        )
                        .map_err(render_err)?;
                    if let (Some(label), None) = (label, style.line_width) {
                        has_legend = true;
                        drawn.label(label.as_str()).legend(move |(x, y)| {
                            Circle::new((x, y), marker.size, color.filled())
                        });
                    }
                }
            }
        }
    }

    if has_legend {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;
    }

    // Explicit x tick labels sit at their exact values
    let tick_style = font(ax.x_tick_style());
    for (pos, tick) in explicit_ticks.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(tick.value, y0));
        root.draw(&Text::new(
            ax.format_x(tick.value, pos),
            (px - 30, py + 12),
            tick_style.clone(),
        ))
        .map_err(render_err)?;
    }

    let (xr, yr) = chart.plotting_area().get_pixel_range();
    let width = (xr.end - xr.start) as f64;
    let height = (yr.end - yr.start) as f64;
    for annotation in ax.annotations() {
        if annotation.label.text.is_empty() {
            continue;
        }
        let px = xr.start + (annotation.x * width) as i32;
        let py = yr.end - (annotation.y * height) as i32;
        root.draw(&Text::new(
            annotation.label.text.clone(),
            (px, py),
            font(annotation.label.style),
        ))
        .map_err(render_err)?;
    }

    let spines = [
        (Spine::Top, (xr.start, yr.start), (xr.end, yr.start)),
        (Spine::Bottom, (xr.start, yr.end), (xr.end, yr.end)),
        (Spine::Left, (xr.start, yr.start), (xr.start, yr.end)),
        (Spine::Right, (xr.end, yr.start), (xr.end, yr.end)),
    ];
    for (spine, from, to) in spines {
        if ax.is_spine_visible(spine) {
            root.draw(&PathElement::new(vec![from, to], BLACK))
                .map_err(render_err)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axes::{GridStyle, SeriesStyle};

    #[test]
    fn test_slug() {
        assert_eq!(slug("Casos semanais\n"), "casos-semanais");
        assert_eq!(slug("  "), "");
    }

    #[test]
    fn test_svg_with_band_points_and_grid() {
        let mut ax = Axes::new();
        ax.set_title("Casos", TextStyle::new(14, Color::DARK_GRAY));
        ax.set_grid(GridStyle {
            axis: GridAxis::Both,
            ..GridStyle::default()
        });
        let x: Vec<f64> = (0..5).map(f64::from).collect();
        ax.add_layer(Layer::Band {
            x: x.clone(),
            lower: x.iter().map(|v| v - 1.0).collect(),
            upper: x.iter().map(|v| v + 1.0).collect(),
            color: Color::FORECAST_BLUE,
            alpha: 0.2,
        });
        ax.add_layer(Layer::Series {
            points: x.iter().map(|&v| (v, v * 2.0)).collect(),
            style: SeriesStyle::points(Color::BLACK, 3),
            label: Some("Observed".to_string()),
        });
        ax.add_layer(Layer::Series {
            points: x.iter().map(|&v| (v, v * 2.0 + 0.5)).collect(),
            style: SeriesStyle::line(Color::RED, 2),
            label: None,
        });

        let svg = ax.to_svg_string().unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Casos"));
    }
}
