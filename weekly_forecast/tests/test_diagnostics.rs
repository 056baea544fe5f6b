use assert_approx_eq::assert_approx_eq;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use weekly_forecast::diagnostics::plot_cross_validation_metric;
use weekly_forecast::prelude::*;
use weekly_forecast::{cross_validation, performance_metrics, AdditiveModel};

fn linear_history(n: usize) -> TimeSeriesTable {
    let start = NaiveDate::from_ymd_opt(2020, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let dates: Vec<NaiveDateTime> = (0..n).map(|i| start + Duration::weeks(i as i64)).collect();
    let values: Vec<f64> = (0..n).map(|i| 200.0 + 5.0 * i as f64).collect();
    TimeSeriesTable::from_columns(&dates, &values).unwrap()
}

fn model() -> AdditiveModel {
    AdditiveModel::new(ModelOptions {
        uncertainty_samples: 100,
        ..ModelOptions::weekly()
    })
    .unwrap()
}

#[test]
fn test_linear_series_is_predicted_well() {
    let history = linear_history(40);
    let options = CrossValidationOptions::new(Duration::weeks(3))
        .with_period(Duration::weeks(1))
        .with_initial(Duration::weeks(20));
    let cv = cross_validation(&model(), &history, &options).unwrap();

    assert!(!cv.is_empty());
    for row in cv.rows() {
        assert!(row.horizon() > Duration::zero());
        assert!(row.horizon() <= Duration::weeks(3));
        assert_approx_eq!(row.yhat, row.y, 2.0);
    }

    let metrics = performance_metrics(&cv, &[Metric::Mae, Metric::Smape], 0.1).unwrap();
    assert_eq!(metrics.horizons().len(), 3);
    assert!(metrics.column("mae").unwrap().iter().all(|&v| v < 2.0));
}

#[test]
fn test_explicit_cutoffs() {
    let history = linear_history(30);
    let ds = history.timestamps().unwrap();
    let cutoffs = vec![ds[20], ds[10]];
    let options = CrossValidationOptions::new(Duration::weeks(2)).with_cutoffs(cutoffs);

    let cv = cross_validation(&model(), &history, &options).unwrap();
    // Cutoffs are evaluated in time order
    assert_eq!(cv.cutoffs(), vec![ds[10], ds[20]]);
    assert_eq!(cv.len(), 4);
}

#[test]
fn test_explicit_cutoff_too_late() {
    let history = linear_history(30);
    let ds = history.timestamps().unwrap();
    let options = CrossValidationOptions::new(Duration::weeks(4)).with_cutoffs(vec![ds[28]]);
    assert!(matches!(
        cross_validation(&model(), &history, &options),
        Err(ForecastError::Validation(_))
    ));
}

#[test]
fn test_horizon_longer_than_history() {
    let history = linear_history(5);
    let options = CrossValidationOptions::new(Duration::weeks(10));
    assert!(matches!(
        cross_validation(&model(), &history, &options),
        Err(ForecastError::Validation(_))
    ));
}

#[test]
fn test_per_row_metrics_and_chart() {
    let history = linear_history(40);
    let options = CrossValidationOptions::new(Duration::weeks(2))
        .with_period(Duration::weeks(4))
        .with_initial(Duration::weeks(24));
    let cv = cross_validation(&model(), &history, &options).unwrap();

    let per_row = performance_metrics(&cv, &[Metric::Coverage], -1.0).unwrap();
    assert_eq!(per_row.len(), cv.len());
    assert!(per_row
        .column("coverage")
        .unwrap()
        .iter()
        .all(|&v| v == 0.0 || v == 1.0));

    let ax = plot_cross_validation_metric(&cv, Metric::Mdape, 0.1, None).unwrap();
    assert_eq!(ax.layers().len(), 2);
    assert_eq!(ax.xlabel().unwrap().text, "Horizon (days)");
}
