//! Summary statistics over plain slices

use crate::{MathError, Result};

/// Arithmetic mean. Returns `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Standard deviation needs at least 2 values, have {}",
            values.len()
        )));
    }

    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Ok(variance.sqrt())
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take a quantile of an empty slice".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be within [0, 1], got {}",
            q
        )));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    Ok(quantile_sorted(&sorted, q))
}

/// Quantile of an already sorted slice. The slice must not be empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Median, the 0.5 quantile.
pub fn median(values: &[f64]) -> Result<f64> {
    quantile(values, 0.5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_approx_eq!(mean(&values), 5.0);
        assert_approx_eq!(std_dev(&values).unwrap(), 2.138, 0.001);
        assert!(mean(&[]).is_nan());
        assert!(std_dev(&[1.0]).is_err());
    }

    #[test]
    fn test_quantiles() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_approx_eq!(median(&values).unwrap(), 2.5);
        assert_approx_eq!(quantile(&values, 0.0).unwrap(), 1.0);
        assert_approx_eq!(quantile(&values, 1.0).unwrap(), 4.0);
        assert_approx_eq!(quantile(&values, 0.25).unwrap(), 1.75);
        assert!(quantile(&values, 1.5).is_err());
        assert!(quantile(&[], 0.5).is_err());
    }
}
