//! Fourier terms for periodic components

use std::f64::consts::PI;

/// Generate Fourier features for times `t` (days since the Unix epoch) with
/// the given `period` (days). Returns one row per time point with `2 * order`
/// columns laid out as `sin(1), cos(1), sin(2), cos(2), ...`.
pub fn fourier_series(t: &[f64], period: f64, order: usize) -> Vec<Vec<f64>> {
    t.iter()
        .map(|&ti| {
            let mut row = Vec::with_capacity(2 * order);
            for k in 1..=order {
                let angle = 2.0 * PI * k as f64 * ti / period;
                row.push(angle.sin());
                row.push(angle.cos());
            }
            row
        })
        .collect()
}
