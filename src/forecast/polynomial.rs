use crate::error::{Error, Result};
use crate::forecast::{Forecast, Forecaster};
use crate::stats::regression::{polynomial_regression, PolynomialRegressionResult};

/// Least squares on `[1, x, x², x³]`, extrapolated along the median x gap
#[derive(Debug, Clone)]
pub struct PolynomialForecaster {
    degree: usize,
    fit: Option<PolynomialRegressionResult>,
    x: Vec<f64>,
}

impl Default for PolynomialForecaster {
    fn default() -> Self {
        Self::new(3)
    }
}

impl PolynomialForecaster {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            fit: None,
            x: Vec::new(),
        }
    }

    /// Degree actually fitted; lower than requested when the system was singular
    pub fn fitted_degree(&self) -> Option<usize> {
        self.fit.as_ref().map(|f| f.degree)
    }

    fn model(&self) -> Result<&PolynomialRegressionResult> {
        self.fit
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("polynomial model has not been fitted".to_string()))
    }
}

/// Median gap between consecutive sorted values (1.0 for a single value)
pub(crate) fn median_gap(sorted: &[f64]) -> f64 {
    if sorted.len() < 2 {
        return 1.0;
    }
    let mut diffs: Vec<f64> = sorted.windows(2).map(|w| w[1] - w[0]).collect();
    diffs.sort_by(|a, b| a.total_cmp(b));
    let mid = diffs.len() / 2;
    if diffs.len() % 2 == 0 {
        (diffs[mid - 1] + diffs[mid]) / 2.0
    } else {
        diffs[mid]
    }
}

impl Forecaster for PolynomialForecaster {
    fn name(&self) -> &'static str {
        "Polynomial"
    }

    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        self.fit = Some(polynomial_regression(x, y, self.degree)?);
        self.x = x.to_vec();
        Ok(())
    }

    fn fitted_values(&self) -> Result<Vec<f64>> {
        let model = self.model()?;
        Ok(self.x.iter().map(|&x| model.predict(x)).collect())
    }

    fn forecast(&self, horizon: usize) -> Result<Forecast> {
        let model = self.model()?;

        let mut sorted = self.x.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let last = match sorted.last() {
            Some(&v) => v,
            None => return Ok(Forecast::default()),
        };
        let gap = median_gap(&sorted);

        let x: Vec<f64> = (1..=horizon).map(|k| last + k as f64 * gap).collect();
        let y = x.iter().map(|&v| model.predict(v)).collect();
        Ok(Forecast { x, y })
    }
}
