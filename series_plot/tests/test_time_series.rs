use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use series_plot::columns::datetime_series;
use series_plot::{
    date_to_x, percent_formatter, plot_time_series, thousand_formatter, Axes, Layer, PlotError,
    Presentation, SeriesStyle, Spine, TextRole, TimeSeriesPlot,
};

fn weekly_dates(n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    (0..n)
        .map(|i| {
            (start + chrono::Duration::weeks(i as i64))
                .and_hms_opt(0, 0, 0)
                .unwrap()
        })
        .collect()
}

fn cases_frame(n: usize) -> DataFrame {
    let dates = datetime_series("data", &weekly_dates(n)).unwrap();
    let values = Series::new("casos", (0..n).map(|i| (i * 100) as f64).collect::<Vec<_>>());
    DataFrame::new(vec![dates, values]).unwrap()
}

fn expect_validation(result: series_plot::Result<Option<Axes>>, message: &str) {
    match result {
        Err(PlotError::Validation(msg)) => assert_eq!(msg, message),
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_plots_series_with_presentation_and_ticks() {
    let df = cases_frame(20);
    let options = TimeSeriesPlot {
        presentation: Presentation {
            title: "Casos semanais".to_string(),
            ylabel: "casos".to_string(),
            ..Presentation::default()
        },
        ..TimeSeriesPlot::default()
    };

    let ax = plot_time_series(&df, None, &options).unwrap().unwrap();

    assert_eq!(ax.layers().len(), 1);
    match &ax.layers()[0] {
        Layer::Series { points, style, .. } => {
            assert_eq!(points.len(), 20);
            assert_eq!(points[3].1, 300.0);
            assert_eq!(*style, SeriesStyle::default());
        }
        other => panic!("unexpected layer {:?}", other),
    }

    assert_eq!(ax.title().unwrap().text, "Casos semanais\n");
    assert_eq!(ax.ylabel().unwrap().text, "casos");
    assert!(ax.annotation(&TextRole::Source).is_some());
    assert!(!ax.is_spine_visible(Spine::Top));

    // 2020-03-01 .. 2020-07-12, every two months, Portuguese labels
    let labels: Vec<&str> = ax
        .x_ticks()
        .unwrap()
        .iter()
        .map(|t| t.label.as_str())
        .collect();
    assert_eq!(labels, vec!["2020-Mar", "2020-Maio", "2020-Jul"]);
}

#[test]
fn test_column_order_does_not_matter() {
    let df = cases_frame(5);
    let swapped = df.select(["casos", "data"]).unwrap();
    let ax = plot_time_series(&swapped, None, &TimeSeriesPlot::default())
        .unwrap()
        .unwrap();
    match &ax.layers()[0] {
        Layer::Series { points, .. } => assert_eq!(points[1].1, 100.0),
        other => panic!("unexpected layer {:?}", other),
    }
}

#[test]
fn test_draws_on_given_axes_with_formatters_and_limits() {
    let df = cases_frame(10);
    let mut ax = Axes::wide();
    ax.plot_dates(&weekly_dates(2), &[1.0, 2.0], SeriesStyle::default(), None);

    let options = TimeSeriesPlot {
        formatter_y: Some(thousand_formatter),
        formatter_x: Some(percent_formatter),
        ylim: Some((0.0, 2000.0)),
        style: SeriesStyle::points(series_plot::Color::RED, 8),
        ..TimeSeriesPlot::default()
    };
    let ax = plot_time_series(&df, Some(ax), &options).unwrap().unwrap();

    assert_eq!(ax.size(), (2000, 1000));
    assert_eq!(ax.layers().len(), 2);
    assert_eq!(ax.y_limits(), Some((0.0, 2000.0)));
    assert_eq!(ax.format_y(2500.0, 0), "2.50 Mil");
    assert_eq!(ax.format_x(0.5, 0), "50%");
}

#[test]
fn test_rejects_three_columns() {
    let mut df = cases_frame(3);
    df.with_column(Series::new("extra", vec![1.0, 2.0, 3.0])).unwrap();
    expect_validation(
        plot_time_series(&df, None, &TimeSeriesPlot::default()),
        "table must have exactly two columns",
    );
}

#[test]
fn test_rejects_missing_temporal_column() {
    let df = df!("a" => &[1.0, 2.0], "b" => &[3.0, 4.0]).unwrap();
    expect_validation(
        plot_time_series(&df, None, &TimeSeriesPlot::default()),
        "x-axis must be temporal",
    );
}

#[test]
fn test_rejects_missing_numeric_column() {
    let dates = datetime_series("data", &weekly_dates(2)).unwrap();
    let names = Series::new("nome", &["a", "b"]);
    let df = DataFrame::new(vec![dates, names]).unwrap();
    expect_validation(
        plot_time_series(&df, None, &TimeSeriesPlot::default()),
        "y-axis must be numeric",
    );
}

#[test]
fn test_show_writes_chart_and_returns_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::env::set_var(series_plot::render::PLOT_DIR_ENV, dir.path());

    let options = TimeSeriesPlot {
        presentation: Presentation::titled("Mostrar"),
        show: true,
        ..TimeSeriesPlot::default()
    };
    let shown = plot_time_series(&cases_frame(12), None, &options).unwrap();
    assert!(shown.is_none());

    let written: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(written.len(), 1);
}

#[test]
fn test_svg_contains_title() {
    let options = TimeSeriesPlot {
        presentation: Presentation::titled("Casos"),
        ..TimeSeriesPlot::default()
    };
    let ax = plot_time_series(&cases_frame(12), None, &options).unwrap().unwrap();
    let svg = ax.to_svg_string().unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Casos"));
    assert!(date_to_x(weekly_dates(1)[0]) > 0.0);
}
