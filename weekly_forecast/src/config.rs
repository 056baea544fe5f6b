//! Model and forecaster configuration
//!
//! Options are plain serde structures so they can be read from JSON. Options
//! the typed structure does not name can still be supplied through an
//! opaque JSON map, which is overlaid onto the typed fields and rejected
//! when a key is not recognised.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How a periodic component is included in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seasonality {
    /// Included when the history is long and dense enough
    Auto,
    /// Included with its default Fourier order
    Enabled,
    Disabled,
    /// Included with an explicit Fourier order (0 disables it)
    Order(usize),
}

impl Seasonality {
    /// Fourier order to use, given the default order and whether the
    /// history supports the component.
    pub fn resolve(self, default_order: usize, supported_by_history: bool) -> Option<usize> {
        let order = match self {
            Seasonality::Auto if supported_by_history => default_order,
            Seasonality::Auto | Seasonality::Disabled => 0,
            Seasonality::Enabled => default_order,
            Seasonality::Order(order) => order,
        };
        (order > 0).then_some(order)
    }
}

/// Options recognised by [`crate::models::additive::AdditiveModel`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelOptions {
    /// Number of potential trend changepoints
    pub n_changepoints: usize,
    /// Share of the history in which changepoints are placed
    pub changepoint_range: f64,
    /// Prior scale of trend changes; larger means a more flexible trend
    pub changepoint_prior_scale: f64,
    pub yearly_seasonality: Seasonality,
    pub weekly_seasonality: Seasonality,
    pub daily_seasonality: Seasonality,
    pub seasonality_prior_scale: f64,
    pub holidays_prior_scale: f64,
    pub regressor_prior_scale: f64,
    /// Width of the uncertainty interval, in (0, 1)
    pub interval_width: f64,
    /// Simulations used for the uncertainty interval. With zero, a normal
    /// approximation of the observation noise is used instead.
    pub uncertainty_samples: usize,
    /// Seed of the uncertainty simulation
    pub seed: u64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            yearly_seasonality: Seasonality::Auto,
            weekly_seasonality: Seasonality::Auto,
            daily_seasonality: Seasonality::Auto,
            seasonality_prior_scale: 10.0,
            holidays_prior_scale: 10.0,
            regressor_prior_scale: 10.0,
            interval_width: 0.8,
            uncertainty_samples: 1000,
            seed: 0,
        }
    }
}

impl ModelOptions {
    /// Defaults used by the weekly forecaster: no daily or yearly seasonality.
    pub fn weekly() -> Self {
        Self {
            yearly_seasonality: Seasonality::Disabled,
            daily_seasonality: Seasonality::Disabled,
            ..Self::default()
        }
    }

    /// Overlay pass-through options onto these ones.
    ///
    /// # Errors
    ///
    /// [`ForecastError::Configuration`] when a key is not a recognised
    /// option or its value has the wrong type.
    pub fn with_extras(self, extras: &Map<String, Value>) -> Result<Self> {
        if extras.is_empty() {
            return Ok(self);
        }

        let mut merged = serde_json::to_value(&self)?;
        if let Value::Object(fields) = &mut merged {
            for (key, value) in extras {
                fields.insert(key.clone(), value.clone());
            }
        }

        serde_json::from_value(merged)
            .map_err(|e| ForecastError::Configuration(format!("invalid model option: {}", e)))
    }

    /// Check ranges of the numeric options
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.changepoint_range) {
            return Err(ForecastError::Configuration(format!(
                "changepoint_range must be within [0, 1], got {}",
                self.changepoint_range
            )));
        }
        if !(self.interval_width > 0.0 && self.interval_width < 1.0) {
            return Err(ForecastError::Configuration(format!(
                "interval_width must be within (0, 1), got {}",
                self.interval_width
            )));
        }
        let scales = [
            ("changepoint_prior_scale", self.changepoint_prior_scale),
            ("seasonality_prior_scale", self.seasonality_prior_scale),
            ("holidays_prior_scale", self.holidays_prior_scale),
            ("regressor_prior_scale", self.regressor_prior_scale),
        ];
        for (name, scale) in scales {
            if !(scale > 0.0 && scale.is_finite()) {
                return Err(ForecastError::Configuration(format!(
                    "{} must be positive, got {}",
                    name, scale
                )));
            }
        }
        Ok(())
    }
}

fn default_country() -> String {
    "BR".to_string()
}

/// Construction parameters of [`crate::forecaster::WeeklyForecaster`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecasterConfig {
    /// Trailing rows held out as the test partition
    pub test_period: usize,
    /// Add the national holidays of `country` to the model
    pub use_holidays: bool,
    /// ISO country code of the holiday calendar
    #[serde(default = "default_country")]
    pub country: String,
    /// Extra numeric columns used as regressors
    pub regressors: Vec<String>,
    #[serde(default = "ModelOptions::weekly")]
    pub model: ModelOptions,
    /// Pass-through model options overlaid onto `model`
    pub model_extras: Map<String, Value>,
}

impl Default for ForecasterConfig {
    fn default() -> Self {
        Self {
            test_period: 0,
            use_holidays: false,
            country: default_country(),
            regressors: Vec::new(),
            model: ModelOptions::weekly(),
            model_extras: Map::new(),
        }
    }
}

impl ForecasterConfig {
    /// Parse a JSON configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ForecastError::Configuration(e.to_string()))
    }

    pub fn with_test_period(mut self, test_period: usize) -> Self {
        self.test_period = test_period;
        self
    }

    /// Enable the holiday calendar of `country`
    pub fn with_holidays(mut self, country: &str) -> Self {
        self.use_holidays = true;
        self.country = country.to_string();
        self
    }

    pub fn with_regressors<I, S>(mut self, regressors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regressors = regressors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_model(mut self, model: ModelOptions) -> Self {
        self.model = model;
        self
    }

    pub fn with_model_extra(mut self, key: &str, value: Value) -> Self {
        self.model_extras.insert(key.to_string(), value);
        self
    }

    /// The model options with pass-through extras applied
    pub fn model_options(&self) -> Result<ModelOptions> {
        let options = self.model.clone().with_extras(&self.model_extras)?;
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_seasonality() {
        assert_eq!(Seasonality::Auto.resolve(3, true), Some(3));
        assert_eq!(Seasonality::Auto.resolve(3, false), None);
        assert_eq!(Seasonality::Enabled.resolve(3, false), Some(3));
        assert_eq!(Seasonality::Disabled.resolve(3, true), None);
        assert_eq!(Seasonality::Order(5).resolve(3, false), Some(5));
        assert_eq!(Seasonality::Order(0).resolve(3, true), None);
    }

    #[test]
    fn test_weekly_defaults() {
        let config = ForecasterConfig::default();
        assert_eq!(config.country, "BR");
        assert_eq!(config.model.yearly_seasonality, Seasonality::Disabled);
        assert_eq!(config.model.daily_seasonality, Seasonality::Disabled);
        assert_eq!(config.model.weekly_seasonality, Seasonality::Auto);
    }

    #[test]
    fn test_extras_overlay() {
        let config = ForecasterConfig::default()
            .with_model_extra("changepoint_prior_scale", json!(0.5))
            .with_model_extra("yearly_seasonality", json!("enabled"));
        let options = config.model_options().unwrap();
        assert_eq!(options.changepoint_prior_scale, 0.5);
        assert_eq!(options.yearly_seasonality, Seasonality::Enabled);
        assert_eq!(options.daily_seasonality, Seasonality::Disabled);
    }

    #[test]
    fn test_unknown_extra_rejected() {
        let config = ForecasterConfig::default().with_model_extra("growth", json!("logistic"));
        assert!(matches!(
            config.model_options(),
            Err(ForecastError::Configuration(_))
        ));
    }

    #[test]
    fn test_out_of_range_option_rejected() {
        let config = ForecasterConfig::default().with_model_extra("interval_width", json!(1.5));
        assert!(matches!(
            config.model_options(),
            Err(ForecastError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_json() {
        let config = ForecasterConfig::from_json_str(
            r#"{"test_period": 4, "regressors": ["isolamento"], "model": {"weekly_seasonality": {"order": 2}}}"#,
        )
        .unwrap();
        assert_eq!(config.test_period, 4);
        assert_eq!(config.country, "BR");
        assert_eq!(config.regressors, vec!["isolamento".to_string()]);
        assert_eq!(config.model.weekly_seasonality, Seasonality::Order(2));
        // A partially given model section falls back to the general defaults
        assert_eq!(config.model.n_changepoints, 25);

        assert!(ForecasterConfig::from_json_str(r#"{"unknown": 1}"#).is_err());
    }
}
