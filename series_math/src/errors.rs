//! Point-wise forecast error functions
//!
//! Each function scores one (actual, predicted) pair. Aggregations such as
//! RMSE are built by averaging these over a window of rows.

/// Error of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointError {
    /// (y - ŷ)²
    Squared,
    /// |y - ŷ|
    Absolute,
    /// |y - ŷ| / |y|
    AbsolutePercentage,
    /// 2 |y - ŷ| / (|y| + |ŷ|)
    SymmetricAbsolutePercentage,
}

impl PointError {
    /// Score one prediction. Percentage errors of a zero actual are `NaN`.
    pub fn evaluate(self, actual: f64, predicted: f64) -> f64 {
        let diff = actual - predicted;
        match self {
            PointError::Squared => diff * diff,
            PointError::Absolute => diff.abs(),
            PointError::AbsolutePercentage => {
                if actual == 0.0 {
                    f64::NAN
                } else {
                    (diff / actual).abs()
                }
            }
            PointError::SymmetricAbsolutePercentage => {
                let denom = actual.abs() + predicted.abs();
                if denom == 0.0 {
                    0.0
                } else {
                    2.0 * diff.abs() / denom
                }
            }
        }
    }

    /// Score paired slices. Extra elements of the longer slice are ignored.
    pub fn evaluate_all(self, actual: &[f64], predicted: &[f64]) -> Vec<f64> {
        actual
            .iter()
            .zip(predicted)
            .map(|(&a, &p)| self.evaluate(a, p))
            .collect()
    }
}

/// 1.0 when `actual` lies within `[lower, upper]`, else 0.0.
pub fn covered(actual: f64, lower: f64, upper: f64) -> f64 {
    if actual >= lower && actual <= upper {
        1.0
    } else {
        0.0
    }
}
