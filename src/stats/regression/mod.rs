// Least-squares regression used by the forecast engine

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordinary least squares fit of `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegressionResult {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearRegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a simple linear regression
///
/// When every `x` is identical the slope is 0 and the intercept is the mean
/// of `y`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<LinearRegressionResult> {
    check_lengths(x, y)?;

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;

    let (min, max) = x
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if max == min {
        return Ok(LinearRegressionResult {
            intercept: y_mean,
            slope: 0.0,
        });
    }

    let sxy: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (xi - x_mean) * (yi - y_mean))
        .sum();
    let sxx: f64 = x.iter().map(|&xi| (xi - x_mean).powi(2)).sum();

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(Error::ComputationError(
            "linear regression produced non-finite coefficients".to_string(),
        ));
    }

    Ok(LinearRegressionResult { intercept, slope })
}

/// Least squares fit on the polynomial basis `[1, x, x², …]`
///
/// `x` is standardized before expansion; `coefficients[k]` multiplies
/// `((x - x_mean) / x_scale)^k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialRegressionResult {
    /// Degree actually fitted (may be lower than requested)
    pub degree: usize,
    pub coefficients: Vec<f64>,
    pub x_mean: f64,
    pub x_scale: f64,
}

impl PolynomialRegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        let t = (x - self.x_mean) / self.x_scale;
        // Horner
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * t + c)
    }
}

/// Fit a polynomial regression of at most `degree`
///
/// If the normal equations are singular at the requested degree, the degree
/// is reduced until the system is solvable.
pub fn polynomial_regression(
    x: &[f64],
    y: &[f64],
    degree: usize,
) -> Result<PolynomialRegressionResult> {
    check_lengths(x, y)?;

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let variance = x.iter().map(|&v| (v - x_mean).powi(2)).sum::<f64>() / n;
    let x_scale = if variance > 0.0 { variance.sqrt() } else { 1.0 };
    let t: Vec<f64> = x.iter().map(|&v| (v - x_mean) / x_scale).collect();

    for d in (0..=degree).rev() {
        let basis: Vec<Vec<f64>> = (0..=d)
            .map(|k| t.iter().map(|&ti| ti.powi(k as i32)).collect())
            .collect();

        let xt_x = matrix_multiply_transpose(&basis, &basis);
        let xt_y = vec_multiply_transpose(&basis, y);

        match solve_linear_system(xt_x, xt_y) {
            Ok(coefficients) => {
                if d < degree {
                    log::debug!(
                        "polynomial regression reduced from degree {} to {}",
                        degree,
                        d
                    );
                }
                return Ok(PolynomialRegressionResult {
                    degree: d,
                    coefficients,
                    x_mean,
                    x_scale,
                });
            }
            Err(Error::ComputationError(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    Err(Error::ComputationError(
        "polynomial regression system is singular at every degree".to_string(),
    ))
}

fn check_lengths(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(Error::InconsistentRowCount {
            expected: x.len(),
            found: y.len(),
        });
    }
    if x.is_empty() {
        return Err(Error::InsufficientData(
            "regression needs at least one observation".to_string(),
        ));
    }
    Ok(())
}

/// A^T * B where rows of `a` and `b` are basis columns
fn matrix_multiply_transpose(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    a.iter()
        .map(|ai| {
            b.iter()
                .map(|bj| ai.iter().zip(bj).map(|(p, q)| p * q).sum())
                .collect()
        })
        .collect()
}

/// A^T * y
fn vec_multiply_transpose(a: &[Vec<f64>], y: &[f64]) -> Vec<f64> {
    a.iter()
        .map(|ai| ai.iter().zip(y).map(|(p, q)| p * q).sum())
        .collect()
}

/// Solve `A x = b` by Gauss-Jordan elimination with partial pivoting
///
/// Returns `Error::ComputationError` when `A` is (numerically) singular.
pub(crate) fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = a.len();
    if n == 0 || b.len() != n || a.iter().any(|row| row.len() != n) {
        return Err(Error::InvalidInput(
            "linear system must be square and non-empty".to_string(),
        ));
    }

    let scale = a
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |m, v| m.max(v.abs()));
    let tolerance = scale.max(1.0) * 1e-10;

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < tolerance {
            return Err(Error::ComputationError("singular matrix".to_string()));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        let pivot = a[col][col];
        for k in col..n {
            a[col][k] /= pivot;
        }
        b[col] /= pivot;

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    if b.iter().any(|v| !v.is_finite()) {
        return Err(Error::ComputationError(
            "linear system solution is not finite".to_string(),
        ));
    }
    Ok(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_regression_exact_line() {
        let x: Vec<f64> = (0..10).map(|v| v as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        let fit = linear_regression(&x, &y).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-10);
        assert!((fit.intercept - 1.0).abs() < 1e-10);
        assert!((fit.predict(20.0) - 41.0).abs() < 1e-9);
    }

    #[test]
    fn test_linear_regression_constant_x() {
        let fit = linear_regression(&[0.1, 0.1, 0.1], &[1.0, 2.0, 6.0]).unwrap();
        assert_eq!(fit.slope, 0.0);
        assert!((fit.intercept - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_regression_length_mismatch() {
        assert!(linear_regression(&[1.0, 2.0], &[1.0]).is_err());
        assert!(linear_regression(&[], &[]).is_err());
    }

    #[test]
    fn test_polynomial_regression_recovers_cubic() {
        let x: Vec<f64> = (0..12).map(|v| v as f64 - 4.0).collect();
        let y: Vec<f64> = x.iter().map(|v| 0.5 * v.powi(3) - v * v + 3.0).collect();
        let fit = polynomial_regression(&x, &y, 3).unwrap();
        assert_eq!(fit.degree, 3);
        for (&xi, &yi) in x.iter().zip(&y) {
            assert!((fit.predict(xi) - yi).abs() < 1e-6);
        }
        let expected = 0.5 * 10.0_f64.powi(3) - 100.0 + 3.0;
        assert!((fit.predict(10.0) - expected).abs() < 1e-5);
    }

    #[test]
    fn test_polynomial_regression_reduces_degree_when_singular() {
        // Two distinct x values only support a straight line
        let x = vec![1.0, 1.0, 2.0, 2.0, 1.0];
        let y = vec![3.0, 3.0, 5.0, 5.0, 3.0];
        let fit = polynomial_regression(&x, &y, 3).unwrap();
        assert!(fit.degree <= 1);
        assert!((fit.predict(1.0) - 3.0).abs() < 1e-8);
        assert!((fit.predict(2.0) - 5.0).abs() < 1e-8);
    }

    #[test]
    fn test_solve_linear_system_singular() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        assert!(matches!(
            solve_linear_system(a, vec![1.0, 2.0]),
            Err(Error::ComputationError(_))
        ));
    }
}
