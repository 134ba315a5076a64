//! Metrics for in-sample forecast quality

use crate::error::{Error, Result};

fn check_inputs(y_true: &[f64], y_pred: &[f64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(Error::InconsistentRowCount {
            expected: y_true.len(),
            found: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(Error::InsufficientData(
            "metrics need at least one observation".to_string(),
        ));
    }
    Ok(())
}

/// Mean squared error
pub fn mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_pred)?;

    let sum_squared_error = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| (t - p) * (t - p))
        .sum::<f64>();

    Ok(sum_squared_error / y_true.len() as f64)
}

/// Mean absolute error
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_pred)?;

    let sum_absolute_error = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| (t - p).abs())
        .sum::<f64>();

    Ok(sum_absolute_error / y_true.len() as f64)
}

pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    Ok(mean_squared_error(y_true, y_pred)?.sqrt())
}

/// Coefficient of determination
///
/// A constant `y_true` scores 1.0 for a perfect prediction and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> Result<f64> {
    check_inputs(y_true, y_pred)?;

    let y_mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_tot = y_true.iter().map(|&t| (t - y_mean).powi(2)).sum::<f64>();
    let ss_res = y_true
        .iter()
        .zip(y_pred)
        .map(|(&t, &p)| (t - p).powi(2))
        .sum::<f64>();

    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            Ok(1.0)
        } else {
            Ok(0.0)
        }
    } else {
        Ok(1.0 - ss_res / ss_tot)
    }
}

/// Mean absolute percentage error, as a fraction
///
/// Observations with `y_true == 0` are skipped; `None` when none remain.
pub fn mean_absolute_percentage_error(y_true: &[f64], y_pred: &[f64]) -> Result<Option<f64>> {
    check_inputs(y_true, y_pred)?;

    let (sum, count) = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, _)| **t != 0.0)
        .fold((0.0, 0usize), |(sum, count), (&t, &p)| {
            (sum + ((t - p) / t).abs(), count + 1)
        });

    if count == 0 {
        Ok(None)
    } else {
        Ok(Some(sum / count as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(mean_squared_error(&y, &y).unwrap(), 0.0);
        assert_eq!(r2_score(&y, &y).unwrap(), 1.0);
        assert_eq!(mean_absolute_percentage_error(&y, &y).unwrap(), Some(0.0));
    }

    #[test]
    fn test_error_values() {
        let t = [2.0, 4.0];
        let p = [1.0, 5.0];
        assert_eq!(mean_absolute_error(&t, &p).unwrap(), 1.0);
        assert_eq!(root_mean_squared_error(&t, &p).unwrap(), 1.0);
        let mape = mean_absolute_percentage_error(&t, &p).unwrap().unwrap();
        assert!((mape - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_mape_skips_zero_targets() {
        assert_eq!(
            mean_absolute_percentage_error(&[0.0, 0.0], &[1.0, 2.0]).unwrap(),
            None
        );
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(r2_score(&[1.0], &[1.0, 2.0]).is_err());
    }
}
