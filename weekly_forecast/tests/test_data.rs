use std::io::Write;

use chrono::NaiveDate;
use tempfile::NamedTempFile;
use weekly_forecast::data::{TimeSeriesTable, TARGET_COLUMN};
use weekly_forecast::{ForecastError, ForecasterConfig, WeeklyForecaster};

fn write_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_csv() {
    let file = write_csv(
        "ds,y,isolamento\n\
         2020-03-01,10,0.41\n\
         2020-03-08,15,\n\
         2020-03-15,22,0.45\n",
    );

    let table = TimeSeriesTable::from_csv(file.path()).unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(
        table.timestamps().unwrap()[1],
        NaiveDate::from_ymd_opt(2020, 3, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
    assert_eq!(
        table.column_values(TARGET_COLUMN).unwrap(),
        vec![Some(10.0), Some(15.0), Some(22.0)]
    );
    assert_eq!(table.column_values("isolamento").unwrap()[1], None);
    assert!(matches!(
        table.column_f64("isolamento"),
        Err(ForecastError::Validation(_))
    ));
}

#[test]
fn test_csv_without_date_column() {
    let file = write_csv("date,y\n2020-03-01,1\n");
    assert!(matches!(
        TimeSeriesTable::from_csv(file.path()),
        Err(ForecastError::Validation(_))
    ));
}

#[test]
fn test_csv_with_bad_values() {
    let file = write_csv("ds,y\n2020-03-01,many\n");
    assert!(matches!(
        TimeSeriesTable::from_csv(file.path()),
        Err(ForecastError::Validation(_))
    ));

    let file = write_csv("ds,y\n01/03/2020,1\n");
    assert!(matches!(
        TimeSeriesTable::from_csv(file.path()),
        Err(ForecastError::Validation(_))
    ));
}

#[test]
fn test_forecaster_from_csv() {
    let mut content = String::from("ds,y\n");
    let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
    for week in 0..20 {
        let day = start + chrono::Duration::weeks(week);
        content.push_str(&format!("{},{}\n", day.format("%Y-%m-%d"), 50 + 3 * week));
    }
    let file = write_csv(&content);

    let forecaster =
        WeeklyForecaster::from_csv(file.path(), ForecasterConfig::default().with_test_period(2)).unwrap();
    assert_eq!(forecaster.train().len(), 18);
    assert_eq!(forecaster.forecast().len(), 20);
}

#[test]
fn test_missing_file() {
    assert!(TimeSeriesTable::from_csv("/nonexistent/casos.csv").is_err());
}
