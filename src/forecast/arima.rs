//! ARIMA(1,1,1) without constant, estimated by conditional sum of squares
//!
//! The series is differenced once; the differences follow
//! `w_t = φ·w_{t-1} + e_t + θ·e_{t-1}`. Estimation starts from the lag-1
//! Yule-Walker estimate of φ, scans a coarse grid and then refines with a
//! shrinking pattern search, keeping both parameters inside (-0.99, 0.99).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::forecast::{ConfidenceBand, Forecast, Forecaster};

const PARAM_BOUND: f64 = 0.99;
const GRID_STEP: f64 = 0.05;
const MIN_STEP: f64 = 1e-5;
const MAX_REFINE_ITERATIONS: usize = 10_000;

/// Estimated ARIMA(1,1,1) parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArimaParams {
    pub phi: f64,
    pub theta: f64,
    /// Innovation variance
    pub sigma2: f64,
}

#[derive(Debug, Clone)]
struct ArimaState {
    params: ArimaParams,
    levels: Vec<f64>,
    diffs: Vec<f64>,
    residuals: Vec<f64>,
    max_x: f64,
}

/// ARIMA(1,1,1) forecaster over `y` in row order
#[derive(Debug, Clone, Default)]
pub struct ArimaForecaster {
    state: Option<ArimaState>,
}

impl ArimaForecaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn params(&self) -> Option<ArimaParams> {
        self.state.as_ref().map(|s| s.params)
    }

    fn state(&self) -> Result<&ArimaState> {
        self.state
            .as_ref()
            .ok_or_else(|| Error::InvalidInput("ARIMA model has not been fitted".to_string()))
    }

    /// Point forecasts of the level for steps 1..=horizon
    fn level_forecast(state: &ArimaState, horizon: usize) -> Vec<f64> {
        let ArimaParams { phi, theta, .. } = state.params;
        let mut level = state.levels[state.levels.len() - 1];
        let last_diff = state.diffs[state.diffs.len() - 1];
        let last_residual = state.residuals[state.residuals.len() - 1];

        let mut out = Vec::with_capacity(horizon);
        let mut diff = phi * last_diff + theta * last_residual;
        for _ in 0..horizon {
            level += diff;
            out.push(level);
            diff *= phi;
        }
        out
    }
}

/// Residuals of the CSS recursion, conditioned on the first difference
fn residuals(w: &[f64], phi: f64, theta: f64) -> Vec<f64> {
    let mut e = vec![0.0; w.len()];
    for t in 1..w.len() {
        e[t] = w[t] - phi * w[t - 1] - theta * e[t - 1];
    }
    e
}

fn css(w: &[f64], phi: f64, theta: f64) -> f64 {
    let mut prev_e = 0.0;
    let mut sum = 0.0;
    for t in 1..w.len() {
        let e = w[t] - phi * w[t - 1] - theta * prev_e;
        sum += e * e;
        prev_e = e;
    }
    sum
}

/// Lag-1 autocorrelation of `w` (0 for a constant series)
fn lag1_autocorrelation(w: &[f64]) -> f64 {
    let n = w.len() as f64;
    let mean = w.iter().sum::<f64>() / n;
    let denom: f64 = w.iter().map(|v| (v - mean).powi(2)).sum();
    if denom == 0.0 {
        return 0.0;
    }
    let numer: f64 = w.windows(2).map(|p| (p[0] - mean) * (p[1] - mean)).sum();
    numer / denom
}

fn clamp_param(v: f64) -> f64 {
    v.clamp(-PARAM_BOUND, PARAM_BOUND)
}

/// Minimize the conditional sum of squares over (φ, θ)
fn estimate(w: &[f64]) -> (f64, f64, f64) {
    let phi0 = clamp_param(lag1_autocorrelation(w));
    let mut best = (phi0, 0.0, css(w, phi0, 0.0));

    let steps = (PARAM_BOUND / GRID_STEP).floor() as i32;
    for i in -steps..=steps {
        for j in -steps..=steps {
            let (phi, theta) = (i as f64 * GRID_STEP, j as f64 * GRID_STEP);
            let value = css(w, phi, theta);
            if value < best.2 {
                best = (phi, theta, value);
            }
        }
    }

    let mut step = GRID_STEP / 2.0;
    let mut iterations = 0;
    while step > MIN_STEP && iterations < MAX_REFINE_ITERATIONS {
        iterations += 1;
        let mut improved = false;
        for (dp, dt) in [(step, 0.0), (-step, 0.0), (0.0, step), (0.0, -step)] {
            let phi = clamp_param(best.0 + dp);
            let theta = clamp_param(best.1 + dt);
            let value = css(w, phi, theta);
            if value < best.2 {
                best = (phi, theta, value);
                improved = true;
            }
        }
        if !improved {
            step /= 2.0;
        }
    }

    best
}

impl Forecaster for ArimaForecaster {
    fn name(&self) -> &'static str {
        "ARIMA"
    }

    fn fit(&mut self, x: &[f64], y: &[f64]) -> Result<()> {
        if y.len() < 3 {
            return Err(Error::InsufficientData(format!(
                "ARIMA(1,1,1) needs at least 3 observations, got {}",
                y.len()
            )));
        }

        let diffs: Vec<f64> = y.windows(2).map(|p| p[1] - p[0]).collect();
        let (phi, theta, sum_sq) = estimate(&diffs);
        if !sum_sq.is_finite() {
            return Err(Error::ComputationError(
                "ARIMA estimation produced a non-finite sum of squares".to_string(),
            ));
        }

        let sigma2 = sum_sq / (diffs.len() - 1) as f64;
        let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        log::debug!(
            "ARIMA(1,1,1) estimated phi={:.4} theta={:.4} sigma2={:.6}",
            phi,
            theta,
            sigma2
        );

        self.state = Some(ArimaState {
            params: ArimaParams { phi, theta, sigma2 },
            levels: y.to_vec(),
            residuals: residuals(&diffs, phi, theta),
            diffs,
            max_x: if max_x.is_finite() { max_x } else { 0.0 },
        });
        Ok(())
    }

    /// One-step-ahead in-sample level predictions; the first two equal `y₀`
    fn fitted_values(&self) -> Result<Vec<f64>> {
        let state = self.state()?;
        let ArimaParams { phi, theta, .. } = state.params;
        let y = &state.levels;

        let mut fitted = Vec::with_capacity(y.len());
        fitted.push(y[0]);
        fitted.push(y[0]);
        for i in 1..state.diffs.len() {
            let predicted_diff = phi * state.diffs[i - 1] + theta * state.residuals[i - 1];
            fitted.push(y[i] + predicted_diff);
        }
        Ok(fitted)
    }

    fn forecast(&self, horizon: usize) -> Result<Forecast> {
        let state = self.state()?;
        let x = (1..=horizon).map(|k| state.max_x + k as f64).collect();
        let y = Self::level_forecast(state, horizon);
        Ok(Forecast { x, y })
    }

    fn confidence_band(&self, horizon: usize, z: f64) -> Result<Option<ConfidenceBand>> {
        let state = self.state()?;
        let ArimaParams { phi, theta, sigma2 } = state.params;
        let center = Self::level_forecast(state, horizon);

        // ψ weights of the differences, cumulated for the integrated level
        let mut psi = 1.0;
        let mut cumulative = 0.0;
        let mut variance_sum = 0.0;
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for (j, &c) in center.iter().enumerate() {
            if j == 1 {
                psi = phi + theta;
            } else if j > 1 {
                psi *= phi;
            }
            cumulative += psi;
            variance_sum += cumulative * cumulative;
            let half_width = z * (sigma2 * variance_sum).sqrt();
            lower.push(c - half_width);
            upper.push(c + half_width);
        }

        Ok(Some(ConfidenceBand { lower, upper }))
    }
}
