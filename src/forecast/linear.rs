use crate::error::{Error, Result};
use crate::forecast::{Forecast, Forecaster};
use crate::stats::regression::{linear_regression, LinearRegressionResult};

/// Ordinary least squares `y = a + b·x`; produces no out-of-sample points
#[derive(Debug, Clone, Default)]
pub struct LinearForecaster {
    fit: Option<LinearRegressionResult>,
    x: Vec<f64>,
}

impl LinearForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn coefficients(&self) -> Option<LinearRegressionResult> {
        self.fit
    }
}

impl Forecaster for LinearForecaster {
    fn name(&self) -> &'static str {
        "Linear"
    }

    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        self.fit = Some(linear_regression(x, y)?);
        self.x = x.to_vec();
        Ok(())
    }

    fn fitted_values(&self) -> Result<Vec<f64>> {
        let fit = self.fit.ok_or_else(not_fitted)?;
        Ok(self.x.iter().map(|&x| fit.predict(x)).collect())
    }

    fn forecast(&self, _horizon: usize) -> Result<Forecast> {
        self.fit.ok_or_else(not_fitted)?;
        Ok(Forecast::default())
    }
}

fn not_fitted() -> Error {
    Error::InvalidInput("linear model has not been fitted".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_fitted_values_follow_line() {
        let x: Vec<f64> = (0..10).map(|v| v as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();

        let mut model = LinearForecaster::new();
        model.fit(&x, &y).unwrap();

        for (fitted, expected) in model.fitted_values().unwrap().iter().zip(&y) {
            assert!((fitted - expected).abs() < 1e-9);
        }
        let forecast = model.forecast(5).unwrap();
        assert!(forecast.x.is_empty());
        assert!(forecast.y.is_empty());
    }

    #[test]
    fn test_unfitted_model_errors() {
        let model = LinearForecaster::new();
        assert!(model.fitted_values().is_err());
    }
}
