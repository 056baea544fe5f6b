//! Additive model
//!
//! `y(t) = trend(t) + seasonalities(t) + holidays(t) + regressors(t) + noise`
//!
//! The trend is piecewise linear with changepoints spread over the first part
//! of the history. Seasonalities are Fourier series, holidays are indicator
//! columns and regressors enter standardised. All coefficients are fitted
//! jointly as a penalised least squares problem, each block's penalty coming
//! from its prior scale. Uncertainty intervals are simulated from future
//! trend changes and the residual noise.

use crate::config::ModelOptions;
use crate::data::{TimeSeriesTable, DATE_COLUMN, TARGET_COLUMN};
use crate::error::{ForecastError, Result};
use crate::holidays::{country_holidays, holiday_index, supported_country};
use crate::models::{ForecastFrame, ForecastModel, TrainedForecastModel};
use chrono::{Datelike, Duration, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal, Poisson};
use series_math::stats::{mean, quantile_sorted, std_dev};
use series_math::{fourier_series, ridge_solve};
use statrs::distribution::{ContinuousCDF, Normal as StandardNormal};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use tracing::{debug, info};

/// Prior variance of the observation noise on the scaled target. Each
/// coefficient's penalty is this over its prior scale squared.
const NOISE_VARIANCE: f64 = 0.01;

/// Penalty of the base growth rate and offset
const UNPENALISED: f64 = 1e-8;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Names that regressors cannot take
const RESERVED_NAMES: [&str; 12] = [
    DATE_COLUMN,
    TARGET_COLUMN,
    "trend",
    "yhat",
    "yhat_lower",
    "yhat_upper",
    "holidays",
    "weekly",
    "yearly",
    "daily",
    "additive_terms",
    "extra_regressors",
];

/// A Fourier seasonality
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalTerm {
    pub name: &'static str,
    /// Period in days
    pub period: f64,
    pub order: usize,
}

/// A regressor with the statistics used to standardise it
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorTerm {
    pub name: String,
    pub mu: f64,
    pub std: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BlockKind {
    Trend,
    Seasonality,
    Holidays,
    Regressor,
}

/// Coefficients belonging to one component
#[derive(Debug, Clone)]
struct Block {
    name: String,
    kind: BlockKind,
    columns: Range<usize>,
}

/// Column structure of the design matrix, fixed at fit time
#[derive(Debug, Clone)]
struct FeatureLayout {
    /// Changepoint locations in scaled time
    changepoints: Vec<f64>,
    seasonalities: Vec<SeasonalTerm>,
    country: Option<String>,
    holiday_names: Vec<String>,
    regressors: Vec<RegressorTerm>,
}

impl FeatureLayout {
    fn blocks(&self) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut next = 0;
        let mut push = |name: &str, kind: BlockKind, width: usize| {
            blocks.push(Block {
                name: name.to_string(),
                kind,
                columns: next..next + width,
            });
            next += width;
        };

        push("trend", BlockKind::Trend, 2 + self.changepoints.len());
        for term in &self.seasonalities {
            push(term.name, BlockKind::Seasonality, 2 * term.order);
        }
        if !self.holiday_names.is_empty() {
            push("holidays", BlockKind::Holidays, self.holiday_names.len());
        }
        for term in &self.regressors {
            push(&term.name, BlockKind::Regressor, 1);
        }
        blocks
    }

    fn penalties(&self, options: &ModelOptions) -> Vec<f64> {
        let mut penalties = Vec::new();
        for block in self.blocks() {
            let width = block.columns.len();
            match block.kind {
                BlockKind::Trend => {
                    penalties.extend([UNPENALISED, UNPENALISED]);
                    let delta = NOISE_VARIANCE / options.changepoint_prior_scale.powi(2);
                    penalties.extend(std::iter::repeat(delta).take(width - 2));
                }
                BlockKind::Seasonality => {
                    let p = NOISE_VARIANCE / options.seasonality_prior_scale.powi(2);
                    penalties.extend(std::iter::repeat(p).take(width));
                }
                BlockKind::Holidays => {
                    let p = NOISE_VARIANCE / options.holidays_prior_scale.powi(2);
                    penalties.extend(std::iter::repeat(p).take(width));
                }
                BlockKind::Regressor => {
                    penalties.push(NOISE_VARIANCE / options.regressor_prior_scale.powi(2));
                }
            }
        }
        penalties
    }

    /// One design row per timestamp. `regressor_values` holds the raw
    /// regressor columns in layout order.
    fn design(&self, ds: &[NaiveDateTime], t: &[f64], regressor_values: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let days: Vec<f64> = ds.iter().map(|&d| epoch_days(d)).collect();
        let fourier: Vec<Vec<Vec<f64>>> = self
            .seasonalities
            .iter()
            .map(|term| fourier_series(&days, term.period, term.order))
            .collect();
        let holidays = self.holiday_flags(ds)?;

        let rows = (0..ds.len())
            .map(|i| {
                let mut row = vec![t[i], 1.0];
                row.extend(self.changepoints.iter().map(|&s| (t[i] - s).max(0.0)));
                for features in &fourier {
                    row.extend_from_slice(&features[i]);
                }
                row.extend_from_slice(&holidays[i]);
                for (term, values) in self.regressors.iter().zip(regressor_values) {
                    row.push((values[i] - term.mu) / term.std);
                }
                row
            })
            .collect();
        Ok(rows)
    }

    fn holiday_flags(&self, ds: &[NaiveDateTime]) -> Result<Vec<Vec<f64>>> {
        let code = match &self.country {
            Some(code) if !self.holiday_names.is_empty() => code,
            _ => return Ok(vec![Vec::new(); ds.len()]),
        };
        let years = ds.iter().map(|d| d.year());
        let (first, last) = match (years.clone().min(), years.max()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Ok(Vec::new()),
        };
        let calendar = country_holidays(code, first..=last)?;
        let index = holiday_index(&calendar);

        Ok(ds
            .iter()
            .map(|d| {
                let names = index.get(&d.date());
                self.holiday_names
                    .iter()
                    .map(|name| match names {
                        Some(names) if names.contains(&name.as_str()) => 1.0,
                        _ => 0.0,
                    })
                    .collect()
            })
            .collect())
    }
}

fn epoch_days(d: NaiveDateTime) -> f64 {
    d.and_utc().timestamp_millis() as f64 / MILLIS_PER_DAY
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Changepoints at evenly spaced history rows within the first
/// `range` share of the history.
fn select_changepoints(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let hist_size = (t.len() as f64 * range).floor() as usize;
    let n = n_changepoints.min(hist_size.saturating_sub(1));
    if n == 0 {
        return Vec::new();
    }
    let step = (hist_size - 1) as f64 / n as f64;
    (1..=n)
        .map(|i| t[(i as f64 * step).round() as usize])
        .collect()
}

/// Additive model before fitting
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveModel {
    name: String,
    options: ModelOptions,
    country: Option<String>,
    regressors: Vec<String>,
}

impl AdditiveModel {
    /// Create a model with validated options
    pub fn new(options: ModelOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            name: "Additive model".to_string(),
            options,
            country: None,
            regressors: Vec::new(),
        })
    }

    /// Add the national holidays of `country` as indicator effects.
    pub fn add_country_holidays(&mut self, country: &str) -> Result<&mut Self> {
        self.country = Some(supported_country(country)?);
        Ok(self)
    }

    /// Add a numeric column of the input tables as a regressor.
    pub fn add_regressor(&mut self, name: &str) -> Result<&mut Self> {
        if RESERVED_NAMES.contains(&name) {
            return Err(ForecastError::Configuration(format!(
                "'{}' is reserved and cannot name a regressor",
                name
            )));
        }
        if !self.regressors.iter().any(|r| r == name) {
            self.regressors.push(name.to_string());
        }
        Ok(self)
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn regressors(&self) -> &[String] {
        &self.regressors
    }

    fn seasonal_terms(&self, ds: &[NaiveDateTime]) -> Vec<SeasonalTerm> {
        let (first, last) = match (ds.first(), ds.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => return Vec::new(),
        };
        let span_days = (last - first).num_milliseconds() as f64 / MILLIS_PER_DAY;
        let min_spacing_days = ds
            .windows(2)
            .map(|w| (w[1] - w[0]).num_milliseconds() as f64 / MILLIS_PER_DAY)
            .filter(|&gap| gap > 0.0)
            .fold(f64::INFINITY, f64::min);

        let candidates = [
            ("yearly", 365.25, 10, self.options.yearly_seasonality, span_days >= 730.0),
            (
                "weekly",
                7.0,
                3,
                self.options.weekly_seasonality,
                span_days >= 14.0 && min_spacing_days < 7.0,
            ),
            (
                "daily",
                1.0,
                4,
                self.options.daily_seasonality,
                span_days >= 2.0 && min_spacing_days < 1.0,
            ),
        ];

        candidates
            .into_iter()
            .filter_map(|(name, period, default_order, toggle, supported)| {
                toggle
                    .resolve(default_order, supported)
                    .map(|order| SeasonalTerm {
                        name,
                        period,
                        order,
                    })
            })
            .collect()
    }

    fn standardise(&self, name: &str, values: &[f64]) -> RegressorTerm {
        let binary = values.iter().all(|&v| v == 0.0 || v == 1.0);
        let (mu, std) = if binary {
            (0.0, 1.0)
        } else {
            let std = std_dev(values).unwrap_or(0.0);
            (mean(values), if std > 0.0 { std } else { 1.0 })
        };
        RegressorTerm {
            name: name.to_string(),
            mu,
            std,
        }
    }

    /// Holidays of the configured country that fall on a history date
    fn observed_holidays(&self, ds: &[NaiveDateTime]) -> Result<Vec<String>> {
        let (country, first, last) = match (&self.country, ds.first(), ds.last()) {
            (Some(country), Some(first), Some(last)) => (country, first.year(), last.year()),
            _ => return Ok(Vec::new()),
        };
        let calendar = country_holidays(country, first..=last)?;
        let index = holiday_index(&calendar);
        let names: BTreeSet<String> = ds
            .iter()
            .filter_map(|d| index.get(&d.date()))
            .flatten()
            .map(|name| name.to_string())
            .collect();
        Ok(names.into_iter().collect())
    }
}

impl ForecastModel for AdditiveModel {
    type Trained = FittedAdditiveModel;

    fn train(&self, data: &TimeSeriesTable) -> Result<FittedAdditiveModel> {
        let ds_all = data.timestamps()?;
        let y_all = data.target()?;
        let regressors_all = self
            .regressors
            .iter()
            .map(|name| data.column_values(name))
            .collect::<Result<Vec<_>>>()?;

        // Rows with an observed target, in time order
        let mut rows: Vec<usize> = (0..ds_all.len())
            .filter(|&i| y_all[i].map_or(false, f64::is_finite))
            .collect();
        rows.sort_by_key(|&i| ds_all[i]);
        if rows.len() < 2 {
            return Err(ForecastError::Model(format!(
                "history needs at least two observed rows, has {}",
                rows.len()
            )));
        }

        let ds: Vec<NaiveDateTime> = rows.iter().map(|&i| ds_all[i]).collect();
        let y: Vec<f64> = rows.iter().filter_map(|&i| y_all[i]).collect();
        let mut regressor_values = Vec::with_capacity(self.regressors.len());
        for (name, column) in self.regressors.iter().zip(&regressors_all) {
            let values = rows
                .iter()
                .map(|&i| {
                    column[i].ok_or_else(|| {
                        ForecastError::Validation(format!(
                            "regressor '{}' has a missing value at {}",
                            name, ds_all[i]
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            regressor_values.push(values);
        }

        let start = ds[0];
        let span_ms = (ds[ds.len() - 1] - start).num_milliseconds() as f64;
        if span_ms <= 0.0 {
            return Err(ForecastError::Model(
                "history must cover more than one instant".to_string(),
            ));
        }
        let t: Vec<f64> = ds
            .iter()
            .map(|&d| (d - start).num_milliseconds() as f64 / span_ms)
            .collect();

        let max_abs = y.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };
        let y_scaled: Vec<f64> = y.iter().map(|v| v / y_scale).collect();

        let layout = FeatureLayout {
            changepoints: select_changepoints(
                &t,
                self.options.n_changepoints,
                self.options.changepoint_range,
            ),
            seasonalities: self.seasonal_terms(&ds),
            country: self.country.clone(),
            holiday_names: self.observed_holidays(&ds)?,
            regressors: self
                .regressors
                .iter()
                .zip(&regressor_values)
                .map(|(name, values)| self.standardise(name, values))
                .collect(),
        };

        let design = layout.design(&ds, &t, &regressor_values)?;
        let penalties = layout.penalties(&self.options);
        let beta = ridge_solve(&design, &y_scaled, &penalties)
            .map_err(|e| ForecastError::Model(format!("least squares fit failed: {}", e)))?;

        let residuals: Vec<f64> = design
            .iter()
            .zip(&y_scaled)
            .map(|(row, y)| (y - dot(row, &beta)).powi(2))
            .collect();
        let sigma = mean(&residuals).sqrt();

        info!(
            model = %self.name,
            rows = ds.len(),
            changepoints = layout.changepoints.len(),
            seasonalities = layout.seasonalities.len(),
            holidays = layout.holiday_names.len(),
            regressors = layout.regressors.len(),
            features = beta.len(),
            "fitted additive model"
        );

        Ok(FittedAdditiveModel {
            spec: self.clone(),
            layout,
            start,
            span_ms,
            y_scale,
            beta,
            sigma,
            history: data.clone(),
            history_ds: ds,
            history_y: y,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Additive model after fitting
#[derive(Debug, Clone)]
pub struct FittedAdditiveModel {
    spec: AdditiveModel,
    layout: FeatureLayout,
    start: NaiveDateTime,
    span_ms: f64,
    y_scale: f64,
    beta: Vec<f64>,
    /// Residual standard deviation on the scaled target
    sigma: f64,
    history: TimeSeriesTable,
    history_ds: Vec<NaiveDateTime>,
    history_y: Vec<f64>,
}

impl FittedAdditiveModel {
    /// Configuration the model was fitted with
    pub fn spec(&self) -> &AdditiveModel {
        &self.spec
    }

    pub fn options(&self) -> &ModelOptions {
        &self.spec.options
    }

    /// Table the model was fitted on
    pub fn history(&self) -> &TimeSeriesTable {
        &self.history
    }

    /// Observed (timestamp, value) pairs of the history, in time order
    pub fn observations(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.history_ds.iter().copied().zip(self.history_y.iter().copied())
    }

    pub fn changepoints(&self) -> Vec<NaiveDateTime> {
        self.layout
            .changepoints
            .iter()
            .map(|&s| self.start + Duration::milliseconds((s * self.span_ms).round() as i64))
            .collect()
    }

    pub fn seasonalities(&self) -> &[SeasonalTerm] {
        &self.layout.seasonalities
    }

    pub fn holiday_names(&self) -> &[String] {
        &self.layout.holiday_names
    }

    pub fn regressors(&self) -> &[RegressorTerm] {
        &self.layout.regressors
    }

    /// Residual standard deviation in the units of `y`
    pub fn residual_std(&self) -> f64 {
        self.sigma * self.y_scale
    }

    fn scale_time(&self, ds: &[NaiveDateTime]) -> Vec<f64> {
        ds.iter()
            .map(|&d| (d - self.start).num_milliseconds() as f64 / self.span_ms)
            .collect()
    }

    /// Trend changes of the fitted changepoints, scaled
    fn deltas(&self) -> &[f64] {
        &self.beta[2..2 + self.layout.changepoints.len()]
    }

    /// Interval bounds around `yhat` (scaled) at scaled times `t`.
    fn uncertainty(&self, t: &[f64], yhat: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let width = self.spec.options.interval_width;
        let samples = self.spec.options.uncertainty_samples;

        if samples == 0 {
            let z = StandardNormal::new(0.0, 1.0)
                .map_err(|e| ForecastError::Model(e.to_string()))?
                .inverse_cdf((1.0 + width) / 2.0);
            let half = z * self.sigma;
            return Ok((
                yhat.iter().map(|v| v - half).collect(),
                yhat.iter().map(|v| v + half).collect(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.spec.options.seed);
        let noise = Normal::new(0.0, self.sigma).map_err(|e| ForecastError::Model(e.to_string()))?;

        let t_max = t.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let deltas = self.deltas();
        let scale = deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len().max(1) as f64;
        let future_changes = if t_max > 1.0 && !deltas.is_empty() && scale > 0.0 {
            let expected = deltas.len() as f64 * (t_max - 1.0);
            let count = Poisson::new(expected).map_err(|e| ForecastError::Model(e.to_string()))?;
            let magnitude = Exp::new(1.0 / scale).map_err(|e| ForecastError::Model(e.to_string()))?;
            Some((count, magnitude))
        } else {
            None
        };

        let mut draws: Vec<Vec<f64>> = vec![Vec::with_capacity(samples); t.len()];
        for _ in 0..samples {
            let mut changes: Vec<(f64, f64)> = Vec::new();
            if let Some((count, magnitude)) = &future_changes {
                let n: f64 = count.sample(&mut rng);
                for _ in 0..n as usize {
                    let location = rng.gen_range(1.0..t_max);
                    let size = magnitude.sample(&mut rng);
                    let delta = if rng.gen_bool(0.5) { size } else { -size };
                    changes.push((location, delta));
                }
            }

            for (i, &ti) in t.iter().enumerate() {
                let shift: f64 = changes
                    .iter()
                    .filter(|(s, _)| ti > *s)
                    .map(|(s, d)| d * (ti - s))
                    .sum();
                draws[i].push(yhat[i] + shift + noise.sample(&mut rng));
            }
        }

        let lower_q = (1.0 - width) / 2.0;
        let upper_q = (1.0 + width) / 2.0;
        let mut lower = Vec::with_capacity(t.len());
        let mut upper = Vec::with_capacity(t.len());
        for mut row in draws {
            row.sort_by(|a, b| a.total_cmp(b));
            lower.push(quantile_sorted(&row, lower_q));
            upper.push(quantile_sorted(&row, upper_q));
        }
        Ok((lower, upper))
    }
}

impl TrainedForecastModel for FittedAdditiveModel {
    fn predict(&self, data: &TimeSeriesTable) -> Result<ForecastFrame> {
        let ds = data.timestamps()?;
        let regressor_values = self
            .layout
            .regressors
            .iter()
            .map(|term| data.column_f64(&term.name))
            .collect::<Result<Vec<_>>>()?;

        let t = self.scale_time(&ds);
        let design = self.layout.design(&ds, &t, &regressor_values)?;

        let mut trend = vec![0.0; ds.len()];
        let mut additive = vec![0.0; ds.len()];
        let mut extra_regressors = vec![0.0; ds.len()];
        let mut components = BTreeMap::new();

        for block in self.layout.blocks() {
            let coefficients = &self.beta[block.columns.clone()];
            let values: Vec<f64> = design
                .iter()
                .map(|row| dot(&row[block.columns.clone()], coefficients))
                .collect();
            match block.kind {
                BlockKind::Trend => trend = values,
                kind => {
                    for (i, v) in values.iter().enumerate() {
                        additive[i] += v;
                        if kind == BlockKind::Regressor {
                            extra_regressors[i] += v;
                        }
                    }
                    components.insert(block.name, values.iter().map(|v| v * self.y_scale).collect());
                }
            }
        }
        if !self.layout.regressors.is_empty() {
            components.insert(
                "extra_regressors".to_string(),
                extra_regressors.iter().map(|v| v * self.y_scale).collect(),
            );
        }
        components.insert(
            "additive_terms".to_string(),
            additive.iter().map(|v| v * self.y_scale).collect(),
        );

        let yhat_scaled: Vec<f64> = trend.iter().zip(&additive).map(|(a, b)| a + b).collect();
        let (lower, upper) = self.uncertainty(&t, &yhat_scaled)?;
        debug!(rows = ds.len(), "predicted with additive model");

        let unscale = |values: &[f64]| values.iter().map(|v| v * self.y_scale).collect::<Vec<_>>();
        ForecastFrame::new(
            ds,
            unscale(&trend),
            unscale(&lower),
            unscale(&upper),
            unscale(&yhat_scaled),
            components,
        )
    }

    fn name(&self) -> &str {
        &self.spec.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Seasonality;
    use crate::data::parse_timestamp;
    use assert_approx_eq::assert_approx_eq;
    use polars::prelude::NamedFrom;

    fn daily_table(n: usize, f: impl Fn(usize) -> f64) -> TimeSeriesTable {
        let start = parse_timestamp("2021-01-04").unwrap();
        let dates: Vec<_> = (0..n).map(|i| start + Duration::days(i as i64)).collect();
        let values: Vec<f64> = (0..n).map(f).collect();
        TimeSeriesTable::from_columns(&dates, &values).unwrap()
    }

    #[test]
    fn test_select_changepoints() {
        let t: Vec<f64> = (0..11).map(|i| i as f64 / 10.0).collect();
        let cps = select_changepoints(&t, 25, 0.8);
        // 8 rows in range, so at most 7 changepoints
        assert_eq!(cps.len(), 7);
        assert_approx_eq!(cps[0], 0.1);
        assert_approx_eq!(cps[6], 0.7);
        assert!(select_changepoints(&t[..2], 25, 0.8).is_empty());
    }

    #[test]
    fn test_too_short_history() {
        let model = AdditiveModel::new(ModelOptions::default()).unwrap();
        let result = model.train(&daily_table(1, |_| 1.0));
        assert!(matches!(result, Err(ForecastError::Model(_))));
    }

    #[test]
    fn test_fits_linear_trend() {
        let options = ModelOptions {
            weekly_seasonality: Seasonality::Disabled,
            uncertainty_samples: 0,
            ..ModelOptions::default()
        };
        let model = AdditiveModel::new(options).unwrap();
        let history = daily_table(60, |i| 10.0 + 0.5 * i as f64);
        let fitted = model.train(&history).unwrap();

        let forecast = fitted.predict(&history.without_target()).unwrap();
        for (i, yhat) in forecast.yhat().iter().enumerate() {
            assert_approx_eq!(*yhat, 10.0 + 0.5 * i as f64, 0.2);
        }
        assert!(fitted.seasonalities().is_empty());
    }

    #[test]
    fn test_weekly_component_detected() {
        let options = ModelOptions {
            uncertainty_samples: 0,
            ..ModelOptions::weekly()
        };
        let model = AdditiveModel::new(options).unwrap();
        let pattern = [0.0, 1.0, 2.0, 3.0, 2.0, 1.0, 0.0];
        let history = daily_table(70, |i| 50.0 + 5.0 * pattern[i % 7]);
        let fitted = model.train(&history).unwrap();

        assert_eq!(fitted.seasonalities().len(), 1);
        assert_eq!(fitted.seasonalities()[0].name, "weekly");

        let forecast = fitted.predict(&history).unwrap();
        let weekly = forecast.component("weekly").unwrap();
        let span = weekly.iter().cloned().fold(f64::MIN, f64::max)
            - weekly.iter().cloned().fold(f64::MAX, f64::min);
        assert!(span > 10.0, "weekly amplitude too small: {}", span);
    }

    #[test]
    fn test_weekly_spacing_disables_auto_weekly() {
        let start = parse_timestamp("2020-03-01").unwrap();
        let dates: Vec<_> = (0..20).map(|i| start + Duration::weeks(i)).collect();
        let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let history = TimeSeriesTable::from_columns(&dates, &values).unwrap();

        let model = AdditiveModel::new(ModelOptions::weekly()).unwrap();
        let fitted = model.train(&history).unwrap();
        assert!(fitted.seasonalities().is_empty());
    }

    #[test]
    fn test_intervals_are_seeded_and_ordered() {
        let options = ModelOptions {
            uncertainty_samples: 200,
            seed: 7,
            ..ModelOptions::weekly()
        };
        let model = AdditiveModel::new(options).unwrap();
        let history = daily_table(40, |i| 20.0 + (i % 5) as f64);
        let fitted = model.train(&history).unwrap();

        let start = parse_timestamp("2021-01-04").unwrap();
        let future: Vec<_> = (0..50).map(|i| start + Duration::days(i)).collect();
        let future = TimeSeriesTable::from_columns(&future, &vec![0.0; 50])
            .unwrap()
            .without_target();

        let first = fitted.predict(&future).unwrap();
        let second = fitted.predict(&future).unwrap();
        assert_eq!(first, second);
        for i in 0..first.len() {
            assert!(first.yhat_lower()[i] <= first.yhat_upper()[i]);
        }
    }

    #[test]
    fn test_regressor_effect() {
        let mut model = AdditiveModel::new(ModelOptions {
            uncertainty_samples: 0,
            ..ModelOptions::weekly()
        })
        .unwrap();
        model.add_regressor("promo").unwrap();

        let start = parse_timestamp("2021-01-04").unwrap();
        let dates: Vec<_> = (0..40).map(|i| start + Duration::days(i)).collect();
        let promo: Vec<f64> = (0..40).map(|i| (i % 3 == 0) as i32 as f64).collect();
        let y: Vec<f64> = promo.iter().map(|p| 100.0 + 30.0 * p).collect();
        let mut df = TimeSeriesTable::from_columns(&dates, &y).unwrap().into_dataframe();
        df.with_column(polars::prelude::Series::new("promo", promo.clone())).unwrap();
        let history = TimeSeriesTable::new(df).unwrap();

        let fitted = model.train(&history).unwrap();
        assert_eq!(fitted.regressors()[0].mu, 0.0);

        let forecast = fitted.predict(&history.without_target()).unwrap();
        let effect = forecast.component("promo").unwrap();
        assert_approx_eq!(effect[0] - effect[1], 30.0, 1.0);

        let missing = history.select(&[]).unwrap();
        assert!(matches!(
            fitted.predict(&missing),
            Err(ForecastError::Validation(_))
        ));
    }

    #[test]
    fn test_reserved_regressor_name() {
        let mut model = AdditiveModel::new(ModelOptions::default()).unwrap();
        assert!(model.add_regressor("trend").is_err());
        assert!(model.add_country_holidays("ZZ").is_err());
        assert!(model.add_country_holidays("br").is_ok());
        assert_eq!(model.country(), Some("BR"));
    }
}
