//! Forecast engine
//!
//! Fits one of three models to an (x, y) column pair of a [`Table`]:
//! - Linear: ordinary least squares, no out-of-sample points
//! - Polynomial: degree 3, needs at least 5 valid rows
//! - ARIMA(1,1,1): needs more than 10 valid rows, optional 95% band
//!
//! When a model lacks data the engine falls back to Linear and says so in
//! [`ForecastResult::fallback`].

pub mod arima;
pub mod coerce;
pub mod linear;
pub mod polynomial;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ml::metrics::regression::{
    mean_absolute_error, mean_absolute_percentage_error, r2_score, root_mean_squared_error,
};
use crate::table::Table;

pub use arima::{ArimaForecaster, ArimaParams};
pub use coerce::{coerce_column, CoercedColumn, Coercion};
pub use linear::LinearForecaster;
pub use polynomial::PolynomialForecaster;

/// Horizon used when the entered text is not a plain non-negative integer
pub const DEFAULT_HORIZON: usize = 5;
/// Largest horizon a forecast accepts
pub const MAX_HORIZON: usize = 1000;
/// Minimum valid rows for the polynomial model
pub const POLYNOMIAL_MIN_ROWS: usize = 5;
/// ARIMA needs strictly more valid rows than this
pub const ARIMA_MIN_ROWS_EXCLUSIVE: usize = 10;
/// Two-sided 95% normal quantile
pub const Z_95: f64 = 1.959963984540054;

/// Common interface of the forecast models
pub trait Forecaster {
    /// Display name of the model
    fn name(&self) -> &'static str;

    /// Fit on valid rows, in row order
    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<()>;

    /// In-sample predictions aligned with the fitted rows
    fn fitted_values(&self) -> Result<Vec<f64>>;

    /// Out-of-sample points
    fn forecast(&self, horizon: usize) -> Result<Forecast>;

    /// Confidence band around [`Forecaster::forecast`]; `None` when the
    /// model has no notion of one
    fn confidence_band(&self, _horizon: usize, _z: f64) -> Result<Option<ConfidenceBand>> {
        Ok(None)
    }
}

/// Out-of-sample forecast points
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

/// Lower and upper bounds per forecast step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastModel {
    Linear,
    Polynomial,
    Arima,
}

impl ForecastModel {
    pub const ALL: [ForecastModel; 3] = [
        ForecastModel::Linear,
        ForecastModel::Polynomial,
        ForecastModel::Arima,
    ];

    fn forecaster(&self) -> Box<dyn Forecaster> {
        match self {
            ForecastModel::Linear => Box::new(LinearForecaster::new()),
            ForecastModel::Polynomial => Box::new(PolynomialForecaster::default()),
            ForecastModel::Arima => Box::new(ArimaForecaster::new()),
        }
    }

    /// Whether `valid_rows` is enough for this model
    fn accepts(&self, valid_rows: usize) -> bool {
        match self {
            ForecastModel::Linear => valid_rows >= 1,
            ForecastModel::Polynomial => valid_rows >= POLYNOMIAL_MIN_ROWS,
            ForecastModel::Arima => valid_rows > ARIMA_MIN_ROWS_EXCLUSIVE,
        }
    }

    fn requirement(&self) -> &'static str {
        match self {
            ForecastModel::Linear => "at least 1 valid row",
            ForecastModel::Polynomial => "at least 5 valid rows",
            ForecastModel::Arima => "more than 10 valid rows",
        }
    }
}

impl fmt::Display for ForecastModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ForecastModel::Linear => "Linear",
            ForecastModel::Polynomial => "Polynomial",
            ForecastModel::Arima => "ARIMA",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ForecastModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(ForecastModel::Linear),
            "polynomial" | "poly" => Ok(ForecastModel::Polynomial),
            "arima" => Ok(ForecastModel::Arima),
            _ => Err(Error::InvalidInput(format!(
                "unknown forecast model '{}' (expected Linear, Polynomial or ARIMA)",
                s.trim()
            ))),
        }
    }
}

/// Parse a forecast horizon from free text
///
/// A non-empty run of ASCII digits is taken as is; anything else (including
/// values too large to represent) yields [`DEFAULT_HORIZON`].
pub fn parse_horizon(text: &str) -> usize {
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        text.parse().unwrap_or(DEFAULT_HORIZON)
    } else {
        DEFAULT_HORIZON
    }
}

/// Forecast settings chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub model: ForecastModel,
    pub horizon: usize,
    /// Attach a 95% band (ARIMA only)
    pub confidence_interval: bool,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            model: ForecastModel::Linear,
            horizon: DEFAULT_HORIZON,
            confidence_interval: false,
        }
    }
}

/// Explicit record of a model downgrade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fallback {
    pub requested: ForecastModel,
    pub used: ForecastModel,
    pub valid_rows: usize,
    pub reason: String,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fell back to {}: {} ({} valid rows)",
            self.requested, self.used, self.reason, self.valid_rows
        )
    }
}

/// In-sample fit quality over valid rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitMetrics {
    pub r2: f64,
    pub rmse: f64,
    pub mae: f64,
    /// Skips rows where y is 0; `None` when every y is 0
    pub mape: Option<f64>,
}

/// Output of one forecast run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub x_column: String,
    pub y_column: String,
    pub requested: ForecastModel,
    pub model: ForecastModel,
    pub fallback: Option<Fallback>,
    /// One entry per table row; `None` for rows excluded from the fit
    pub fitted: Vec<Option<f64>>,
    pub forecast: Forecast,
    pub confidence: Option<ConfidenceBand>,
    pub x_coercion: Coercion,
    pub y_coercion: Coercion,
    pub valid_rows: usize,
    pub metrics: FitMetrics,
}

/// Fit the configured model to columns `x_column`/`y_column` of `table`
///
/// The table is not modified; callers write [`ForecastResult::fitted`] into
/// the `Prediction` column.
pub fn run_forecast(
    table: &Table,
    x_column: &str,
    y_column: &str,
    config: &ForecastConfig,
) -> Result<ForecastResult> {
    if config.horizon > MAX_HORIZON {
        return Err(Error::InvalidValue(format!(
            "forecast horizon {} exceeds the maximum of {}",
            config.horizon, MAX_HORIZON
        )));
    }

    let x_col = table.column(x_column)?;
    let y_col = table.column(y_column)?;

    let x = coerce_column(x_col);
    let y = coerce_column(y_col);

    let valid_idx: Vec<usize> = (0..table.row_count())
        .filter(|&i| x.values[i].is_some() && y.values[i].is_some())
        .collect();
    let xs: Vec<f64> = valid_idx.iter().filter_map(|&i| x.values[i]).collect();
    let ys: Vec<f64> = valid_idx.iter().filter_map(|&i| y.values[i]).collect();

    if valid_idx.is_empty() {
        return Err(Error::InsufficientData(
            "No valid numeric data available for prediction.".to_string(),
        ));
    }

    let fallback = if config.model.accepts(valid_idx.len()) {
        None
    } else {
        let fallback = Fallback {
            requested: config.model,
            used: ForecastModel::Linear,
            valid_rows: valid_idx.len(),
            reason: format!("{} needs {}", config.model, config.model.requirement()),
        };
        log::warn!("{}", fallback);
        Some(fallback)
    };
    let model = fallback.as_ref().map_or(config.model, |f| f.used);

    let mut forecaster = model.forecaster();
    forecaster.fit(&xs, &ys)?;
    let fitted_valid = forecaster.fitted_values()?;
    if fitted_valid.iter().any(|v| !v.is_finite()) {
        return Err(Error::ComputationError(format!(
            "{} model produced non-finite fitted values",
            forecaster.name()
        )));
    }

    let forecast = forecaster.forecast(config.horizon)?;
    let confidence = if config.confidence_interval {
        forecaster.confidence_band(config.horizon, Z_95)?
    } else {
        None
    };

    let mut fitted = vec![None; table.row_count()];
    for (&row, &value) in valid_idx.iter().zip(&fitted_valid) {
        fitted[row] = Some(value);
    }

    let metrics = FitMetrics {
        r2: r2_score(&ys, &fitted_valid)?,
        rmse: root_mean_squared_error(&ys, &fitted_valid)?,
        mae: mean_absolute_error(&ys, &fitted_valid)?,
        mape: mean_absolute_percentage_error(&ys, &fitted_valid)?,
    };

    log::info!(
        "{} forecast of '{}' on '{}': {} valid rows, R2={:.4}, RMSE={:.4}",
        model,
        y_col.name(),
        x_col.name(),
        valid_idx.len(),
        metrics.r2,
        metrics.rmse
    );

    Ok(ForecastResult {
        x_column: x_col.name().to_string(),
        y_column: y_col.name().to_string(),
        requested: config.model,
        model,
        fallback,
        fitted,
        forecast,
        confidence,
        x_coercion: x.coercion,
        y_coercion: y.coercion,
        valid_rows: valid_idx.len(),
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, NumericColumn, TextColumn};

    fn line_table(n: usize) -> Table {
        let x: Vec<f64> = (0..n).map(|v| v as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| 2.0 * v + 1.0).collect();
        Table::from_columns(vec![
            Column::Numeric(NumericColumn::from_values("x", x)),
            Column::Numeric(NumericColumn::from_values("y", y)),
        ])
        .unwrap()
    }

    fn config(model: ForecastModel) -> ForecastConfig {
        ForecastConfig {
            model,
            ..ForecastConfig::default()
        }
    }

    #[test]
    fn test_horizon_above_cap_is_rejected() {
        let table = line_table(12);
        for model in ForecastModel::ALL {
            let config = ForecastConfig {
                model,
                horizon: usize::MAX,
                confidence_interval: true,
            };
            let err = run_forecast(&table, "x", "y", &config).unwrap_err();
            assert!(matches!(err, Error::InvalidValue(_)));
        }

        let config = ForecastConfig {
            model: ForecastModel::Polynomial,
            horizon: MAX_HORIZON,
            confidence_interval: false,
        };
        let result = run_forecast(&table, "x", "y", &config).unwrap();
        assert_eq!(result.forecast.x.len(), MAX_HORIZON);
    }

    #[test]
    fn test_parse_horizon() {
        assert_eq!(parse_horizon("7"), 7);
        assert_eq!(parse_horizon("abc"), DEFAULT_HORIZON);
        assert_eq!(parse_horizon(""), DEFAULT_HORIZON);
        assert_eq!(parse_horizon("-3"), DEFAULT_HORIZON);
        assert_eq!(parse_horizon(" 4"), DEFAULT_HORIZON);
        assert_eq!(parse_horizon("99999999999999999999999"), DEFAULT_HORIZON);
        assert_eq!(parse_horizon("5000"), 5000);
    }

    #[test]
    fn test_model_names_parse_case_insensitively() {
        assert_eq!("arima".parse::<ForecastModel>().unwrap(), ForecastModel::Arima);
        assert_eq!("Polynomial".parse::<ForecastModel>().unwrap(), ForecastModel::Polynomial);
        assert!("spline".parse::<ForecastModel>().is_err());
        assert_eq!(ForecastModel::Arima.to_string(), "ARIMA");
    }

    #[test]
    fn test_linear_forecast_matches_line() {
        let table = line_table(10);
        let result = run_forecast(&table, "x", "y", &config(ForecastModel::Linear)).unwrap();
        assert!(result.fallback.is_none());
        for (i, v) in result.fitted.iter().enumerate() {
            assert!((v.unwrap() - (2.0 * i as f64 + 1.0)).abs() < 1e-9);
        }
        assert!(result.forecast.x.is_empty());
        assert!((result.metrics.r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_polynomial_falls_back_with_few_rows() {
        let table = line_table(4);
        let result = run_forecast(&table, "x", "y", &config(ForecastModel::Polynomial)).unwrap();
        let linear = run_forecast(&table, "x", "y", &config(ForecastModel::Linear)).unwrap();

        let fallback = result.fallback.expect("fallback recorded");
        assert_eq!(fallback.requested, ForecastModel::Polynomial);
        assert_eq!(fallback.used, ForecastModel::Linear);
        assert_eq!(fallback.valid_rows, 4);
        assert_eq!(result.model, ForecastModel::Linear);
        assert_eq!(result.fitted, linear.fitted);
    }

    #[test]
    fn test_arima_needs_more_than_ten_rows() {
        let short = line_table(10);
        let result = run_forecast(&short, "x", "y", &config(ForecastModel::Arima)).unwrap();
        assert_eq!(result.model, ForecastModel::Linear);
        assert!(result.fallback.is_some());

        let long = line_table(11);
        let result = run_forecast(&long, "x", "y", &config(ForecastModel::Arima)).unwrap();
        assert_eq!(result.model, ForecastModel::Arima);
        assert!(result.fallback.is_none());
        assert_eq!(result.forecast.x.len(), DEFAULT_HORIZON);
        assert!(result.confidence.is_none());
    }

    #[test]
    fn test_confidence_band_only_for_arima_when_enabled() {
        let table = line_table(20);
        let mut cfg = config(ForecastModel::Polynomial);
        cfg.confidence_interval = true;
        let result = run_forecast(&table, "x", "y", &cfg).unwrap();
        assert!(result.confidence.is_none());

        cfg.model = ForecastModel::Arima;
        let result = run_forecast(&table, "x", "y", &cfg).unwrap();
        let band = result.confidence.expect("band");
        assert_eq!(band.lower.len(), DEFAULT_HORIZON);
    }

    #[test]
    fn test_excluded_rows_have_no_fitted_value() {
        let table = Table::from_columns(vec![
            Column::Numeric(NumericColumn::new("x", vec![Some(0.0), None, Some(2.0), Some(3.0)])),
            Column::Numeric(NumericColumn::new("y", vec![Some(1.0), Some(2.0), None, Some(7.0)])),
        ])
        .unwrap();
        let result = run_forecast(&table, "x", "y", &config(ForecastModel::Linear)).unwrap();
        assert_eq!(result.valid_rows, 2);
        assert!(result.fitted[1].is_none());
        assert!(result.fitted[2].is_none());
        assert!((result.fitted[3].unwrap() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_valid_rows_is_error() {
        let table = Table::from_columns(vec![
            Column::Numeric(NumericColumn::new("x", vec![Some(1.0), None])),
            Column::Numeric(NumericColumn::new("y", vec![None, Some(2.0)])),
        ])
        .unwrap();
        let err = run_forecast(&table, "x", "y", &config(ForecastModel::Linear)).unwrap_err();
        assert!(err.to_string().contains("No valid numeric data available for prediction."));
    }

    #[test]
    fn test_categorical_x_is_factorized() {
        let table = Table::from_columns(vec![
            Column::Text(TextColumn::from_values("team", vec!["a", "b", "a", "c"])),
            Column::Numeric(NumericColumn::from_values("pts", vec![1.0, 2.0, 1.0, 3.0])),
        ])
        .unwrap();
        let result = run_forecast(&table, "TEAM", "pts", &config(ForecastModel::Linear)).unwrap();
        assert_eq!(result.x_column, "team");
        assert!(matches!(result.x_coercion, Coercion::Factorized { ref levels } if levels.len() == 3));
        assert!((result.fitted[3].unwrap() - 3.0).abs() < 1e-9);
    }
}
