//! Penalised least squares
//!
//! The additive model is fitted as a ridge regression where each coefficient
//! carries its own penalty, which is the MAP estimate under independent
//! Gaussian priors.

use crate::{MathError, Result};

/// Solve `(XᵀX + diag(penalties)) β = Xᵀy` for β.
///
/// `design` holds one row per observation. Every row must have
/// `penalties.len()` columns.
pub fn ridge_solve(design: &[Vec<f64>], target: &[f64], penalties: &[f64]) -> Result<Vec<f64>> {
    if design.len() != target.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but target has {} values",
            design.len(),
            target.len()
        )));
    }
    if design.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot solve least squares without observations".to_string(),
        ));
    }

    let p = penalties.len();
    if let Some(bad) = design.iter().position(|row| row.len() != p) {
        return Err(MathError::InvalidInput(format!(
            "Row {} has {} columns, expected {}",
            bad,
            design[bad].len(),
            p
        )));
    }

    // Normal equations
    let mut gram = vec![vec![0.0; p]; p];
    let mut rhs = vec![0.0; p];
    for (row, &y) in design.iter().zip(target) {
        for i in 0..p {
            if row[i] == 0.0 {
                continue;
            }
            rhs[i] += row[i] * y;
            for j in i..p {
                gram[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..p {
        gram[i][i] += penalties[i];
        for j in 0..i {
            gram[i][j] = gram[j][i];
        }
    }

    let lower = cholesky(&gram)?;
    Ok(cholesky_solve(&lower, &rhs))
}

/// Cholesky factorisation `A = L Lᵀ` of a symmetric positive definite matrix.
fn cholesky(a: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let diag = a[i][i] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return Err(MathError::CalculationError(format!(
                        "Matrix is not positive definite (pivot {} = {})",
                        i, diag
                    )));
                }
                l[i][j] = diag.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }

    Ok(l)
}

fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = l.len();

    // Forward substitution: L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|k| l[i][k] * z[k]).sum();
        z[i] = (b[i] - sum) / l[i][i];
    }

    // Back substitution: Lᵀ x = z
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|k| l[k][i] * x[k]).sum();
        x[i] = (z[i] - sum) / l[i][i];
    }

    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_exact_line() {
        // y = 2 + 3x
        let design: Vec<Vec<f64>> = (0..5).map(|x| vec![1.0, x as f64]).collect();
        let target: Vec<f64> = (0..5).map(|x| 2.0 + 3.0 * x as f64).collect();

        let beta = ridge_solve(&design, &target, &[1e-10, 1e-10]).unwrap();
        assert_approx_eq!(beta[0], 2.0, 1e-6);
        assert_approx_eq!(beta[1], 3.0, 1e-6);
    }

    #[test]
    fn test_penalty_shrinks() {
        let design: Vec<Vec<f64>> = (0..5).map(|x| vec![x as f64]).collect();
        let target: Vec<f64> = (0..5).map(|x| 3.0 * x as f64).collect();

        let loose = ridge_solve(&design, &target, &[1e-10]).unwrap();
        let tight = ridge_solve(&design, &target, &[100.0]).unwrap();
        assert!(tight[0].abs() < loose[0].abs());
    }

    #[test]
    fn test_singular_without_penalty() {
        let design = vec![vec![1.0, 0.0], vec![2.0, 0.0]];
        let target = vec![1.0, 2.0];
        assert!(ridge_solve(&design, &target, &[0.0, 0.0]).is_err());
    }

    #[test]
    fn test_shape_mismatch() {
        let design = vec![vec![1.0, 1.0], vec![2.0]];
        assert!(matches!(
            ridge_solve(&design, &[1.0, 2.0], &[0.1, 0.1]),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            ridge_solve(&[], &[], &[0.1]),
            Err(MathError::InsufficientData(_))
        ));
    }
}
