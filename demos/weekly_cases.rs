//! Forecast a synthetic weekly case series, cross-validate it and chart the
//! result.
//!
//! Pass a CSV path (`ds,y[,isolamento]`) to use real data instead. Charts
//! are written to the current directory as SVG.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weekly_forecast_workspace::forecast::prelude::*;
use weekly_forecast_workspace::plot::thousand_formatter;

fn synthetic_cases(weeks: usize) -> std::result::Result<DataFrame, Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2020, 3, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or("invalid start date")?;
    let dates: Vec<NaiveDateTime> = (0..weeks).map(|i| start + Duration::weeks(i as i64)).collect();
    let isolamento: Vec<f64> = (0..weeks)
        .map(|i| 0.45 - 0.1 * (i as f64 / 20.0).sin())
        .collect();
    let cases: Vec<f64> = (0..weeks)
        .zip(&isolamento)
        .map(|(i, iso)| {
            let wave = 4_000.0 * (i as f64 / 9.0).sin().max(0.0);
            1_500.0 + 40.0 * i as f64 + wave - 2_000.0 * (iso - 0.45)
        })
        .collect();

    let mut df = TimeSeriesTable::from_columns(&dates, &cases)?.into_dataframe();
    df.with_column(Series::new("isolamento", isolamento))?;
    Ok(df)
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weekly_forecast=info,weekly_cases=info".into()),
        )
        .init();

    let (data, regressors) = match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading cases");
            let table = TimeSeriesTable::from_csv(&path)?;
            let regressors: Vec<String> = ["isolamento"]
                .iter()
                .filter(|&&name| table.has_column(name))
                .map(|name| name.to_string())
                .collect();
            (table.into_dataframe(), regressors)
        }
        None => (synthetic_cases(80)?, vec!["isolamento".to_string()]),
    };

    let config = ForecasterConfig::default()
        .with_test_period(6)
        .with_holidays("BR")
        .with_regressors(regressors);
    let mut forecaster = WeeklyForecaster::new(data, config)?;
    println!(
        "Trained on {} weeks, holding out {}",
        forecaster.train().len(),
        forecaster.test().len()
    );

    let options = CrossValidationOptions::new(Duration::weeks(4))
        .with_period(Duration::weeks(4))
        .with_initial(Duration::weeks(30));
    let cv = forecaster.run_cross_validation(&options)?;
    println!("Cross-validation: {} rows over {} cutoffs", cv.len(), cv.cutoffs().len());

    let metrics = forecaster.compute_metrics(&MetricsRequest::default())?;
    println!("{}", metrics.to_dataframe()?);

    let plot = ForecastPlot::titled("Casos semanais", "Previsão com modelo aditivo", "Data", "Casos");
    if let Some(mut ax) = forecaster.render_forecast(&plot, None)? {
        ax.set_y_formatter(thousand_formatter);
        ax.render_svg("weekly_cases.svg")?;
        println!("Forecast chart written to weekly_cases.svg");
    }

    let ax = forecaster.render_cross_validation_metric(&[0, -1], Metric::Rmse)?;
    ax.render_svg("weekly_cases_rmse.svg")?;
    println!("Cross-validation chart written to weekly_cases_rmse.svg");

    Ok(())
}
