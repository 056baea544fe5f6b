//! Drawing a fitted model's forecast onto an axis

use crate::error::Result;
use crate::models::additive::FittedAdditiveModel;
use crate::models::ForecastFrame;
use chrono::NaiveDateTime;
use series_plot::{Axes, Color, GridAxis, GridStyle, SeriesStyle, TextStyle};
use tracing::debug;

/// Options for [`FittedAdditiveModel::plot_onto`]
#[derive(Debug, Clone, PartialEq)]
pub struct ModelPlotOptions {
    /// Draw the uncertainty band
    pub uncertainty: bool,
    /// Draw the observed history
    pub history: bool,
    pub xlabel: String,
    pub ylabel: String,
}

impl Default for ModelPlotOptions {
    fn default() -> Self {
        Self {
            uncertainty: true,
            history: true,
            xlabel: "ds".to_string(),
            ylabel: "y".to_string(),
        }
    }
}

impl FittedAdditiveModel {
    /// Draw the history as black points, `yhat` as a line and the interval
    /// as a translucent band.
    pub fn plot_onto(&self, forecast: &ForecastFrame, ax: &mut Axes, options: &ModelPlotOptions) -> Result<()> {
        if options.history {
            let (dates, values): (Vec<NaiveDateTime>, Vec<f64>) = self.observations().unzip();
            ax.plot_dates(&dates, &values, SeriesStyle::points(Color::BLACK, 2), Some("Observed".to_string()));
        }

        ax.plot_dates(
            forecast.ds(),
            forecast.yhat(),
            SeriesStyle::line(Color::FORECAST_BLUE, 2),
            Some("Forecast".to_string()),
        );
        if options.uncertainty {
            ax.fill_between_dates(
                forecast.ds(),
                forecast.yhat_lower(),
                forecast.yhat_upper(),
                Color::FORECAST_BLUE,
                0.2,
            );
        }

        ax.set_grid(GridStyle {
            axis: GridAxis::Both,
            alpha: 0.2,
            color: Color::GRAY,
        });
        ax.set_xlabel(options.xlabel.clone(), TextStyle::default());
        ax.set_ylabel(options.ylabel.clone(), TextStyle::default());
        debug!(rows = forecast.len(), "drew forecast");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelOptions;
    use crate::data::{parse_timestamp, TimeSeriesTable};
    use crate::models::additive::AdditiveModel;
    use crate::models::{ForecastModel, TrainedForecastModel};
    use chrono::Duration;
    use series_plot::Layer;

    #[test]
    fn test_plot_layers() {
        let start = parse_timestamp("2020-03-01").unwrap();
        let dates: Vec<_> = (0..12).map(|i| start + Duration::weeks(i)).collect();
        let values: Vec<f64> = (0..12).map(|i| 10.0 + i as f64).collect();
        let history = TimeSeriesTable::from_columns(&dates, &values).unwrap();

        let model = AdditiveModel::new(ModelOptions {
            uncertainty_samples: 0,
            ..ModelOptions::weekly()
        })
        .unwrap();
        let fitted = model.train(&history).unwrap();
        let forecast = fitted.predict(&history.without_target()).unwrap();

        let mut ax = Axes::wide();
        fitted
            .plot_onto(&forecast, &mut ax, &ModelPlotOptions::default())
            .unwrap();

        assert_eq!(ax.layers().len(), 3);
        assert!(ax.is_date_axis());
        assert!(matches!(ax.layers()[2], Layer::Band { alpha, .. } if alpha == 0.2));
        match &ax.layers()[0] {
            Layer::Series { points, style, .. } => {
                assert_eq!(points.len(), 12);
                assert_eq!(style.color, Color::BLACK);
            }
            other => panic!("unexpected layer {:?}", other),
        }
    }
}
