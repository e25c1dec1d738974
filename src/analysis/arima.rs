//! ARIMA(p,0,q) with a constant mean, fitted by exact maximum likelihood.
//!
//! The model is
//!
//! ```text
//! y_t - μ = φ_1 (y_{t-1} - μ) + … + φ_p (y_{t-p} - μ) + ε_t + θ_1 ε_{t-1} + … + θ_q ε_{t-q}
//! ```
//!
//! The likelihood is evaluated with a Kalman filter on Harvey's state-space
//! form, started from the stationary state covariance, with the innovation
//! variance concentrated out. Coefficients are optimised in an unconstrained
//! space that maps onto partial autocorrelations in `(-1, 1)`, so every
//! candidate is stationary (AR) and invertible (MA).
//!
//! # Example
//!
//! ```rust
//! use chatcast::analysis::{ArimaModel, FittedModel, ForecastModel};
//! use chatcast::core::resample::HourlySeries;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let counts: Vec<u64> = (0..120).map(|i| [3, 1, 4, 1, 5, 9, 2, 6][i % 8]).collect();
//! let series = HourlySeries::from_counts(start, &counts);
//!
//! let fitted = ArimaModel::default().fit(&series).unwrap();
//! let forecast = fitted.forecast(20).unwrap();
//! assert_eq!(forecast.len(), 20);
//! ```

use std::f64::consts::PI;

use chrono::TimeDelta;
use tracing::debug;

use crate::analysis::linalg::{mat_vec, solve};
use crate::analysis::optimize::NelderMead;
use crate::analysis::{FittedModel, ForecastModel, ForecastPoint, ForecastResult, ModelSummary};
use crate::config::{ArimaOrder, ForecastConfig};
use crate::core::resample::{HourlyCount, HourlySeries};
use crate::error::{ChatcastError, Result};

const STAGE: &str = "ARIMA fit";

/// Largest starting partial autocorrelation, keeping the optimizer off the boundary.
const MAX_START_PACF: f64 = 0.9;

/// Unfitted ARIMA specification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArimaModel {
    config: ForecastConfig,
}

impl Default for ArimaModel {
    fn default() -> Self {
        Self::from_config(&ForecastConfig::default())
    }
}

impl ArimaModel {
    /// Creates a model of the given order with default optimizer settings.
    pub fn new(order: ArimaOrder) -> Self {
        Self::from_config(&ForecastConfig::default().with_order(order))
    }

    /// Creates a model from forecast settings. The horizon is ignored.
    pub fn from_config(config: &ForecastConfig) -> Self {
        Self { config: *config }
    }

    /// The model order.
    pub fn order(&self) -> ArimaOrder {
        self.config.order
    }
}

impl ForecastModel for ArimaModel {
    type Fitted = FittedArima;

    fn name(&self) -> String {
        self.config.order.to_string()
    }

    fn fit(&self, series: &HourlySeries) -> Result<FittedArima> {
        self.config.validate()?;
        let ArimaOrder { p, q, .. } = self.config.order;

        let y = series.values();
        let n = y.len();
        let required = p + q + 3;
        if n < required {
            return Err(ChatcastError::InsufficientData {
                stage: STAGE,
                required,
                actual: n,
            });
        }
        let last = *series.last().ok_or(ChatcastError::EmptySeries)?;

        let mean = y.iter().sum::<f64>() / n as f64;
        if y.iter().all(|v| (v - mean).abs() < f64::EPSILON) {
            return Err(ChatcastError::numerical(STAGE, "series is constant"));
        }

        let start = start_params(&y, mean, p, q);
        let objective = |params: &[f64]| {
            let (phi, theta) = coefficients(params, p, q);
            match kalman_filter(&y, params[0], &phi, &theta) {
                Some(filter) => -filter.log_likelihood / n as f64,
                None => f64::INFINITY,
            }
        };

        let optimizer = NelderMead::new(self.config.max_iterations, self.config.tolerance);
        let first = optimizer.minimize(&objective, &start);
        let second = optimizer.minimize(&objective, &first.x);
        let iterations = first.iterations + second.iterations;

        if !second.value.is_finite() {
            return Err(ChatcastError::numerical(STAGE, "likelihood is not finite"));
        }
        if !second.converged {
            return Err(ChatcastError::numerical(
                STAGE,
                format!("optimizer did not converge within {iterations} iterations"),
            ));
        }

        let (ar, ma) = coefficients(&second.x, p, q);
        let constant = second.x[0];
        let filter = kalman_filter(&y, constant, &ar, &ma)
            .ok_or_else(|| ChatcastError::numerical(STAGE, "likelihood is not finite"))?;

        debug!(
            order = %self.config.order,
            constant,
            sigma2 = filter.sigma2,
            log_likelihood = filter.log_likelihood,
            iterations,
            "ARIMA fit converged"
        );

        Ok(FittedArima {
            order: self.config.order,
            constant,
            ar,
            ma,
            sigma2: filter.sigma2,
            log_likelihood: filter.log_likelihood,
            nobs: n,
            iterations,
            state: filter.state,
            last,
        })
    }
}

/// ARIMA model with estimated parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedArima {
    order: ArimaOrder,
    constant: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    nobs: usize,
    iterations: usize,
    /// One-step-ahead predicted state after the last observation.
    state: Vec<f64>,
    last: HourlyCount,
}

impl FittedArima {
    /// Estimated series mean.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Autoregressive coefficients.
    pub fn ar(&self) -> &[f64] {
        &self.ar
    }

    /// Moving-average coefficients.
    pub fn ma(&self) -> &[f64] {
        &self.ma
    }
}

impl FittedModel for FittedArima {
    fn forecast(&self, steps: usize) -> Result<ForecastResult> {
        let transition = transition_matrix(&self.ar, self.state.len());
        let mut state = self.state.clone();
        let mut points = Vec::with_capacity(steps);

        for step in 1..=steps {
            let predicted_count = self.constant + state[0];
            if !predicted_count.is_finite() {
                return Err(ChatcastError::numerical(
                    "ARIMA forecast",
                    format!("non-finite prediction at step {step}"),
                ));
            }
            points.push(ForecastPoint {
                timestamp: self.last.hour + TimeDelta::hours(step as i64),
                predicted_count,
            });
            state = mat_vec(&transition, &state);
        }

        Ok(ForecastResult::new(points))
    }

    fn summary(&self) -> ModelSummary {
        let n = self.nobs as f64;
        // Mean, coefficients and the innovation variance
        let k = (self.ar.len() + self.ma.len() + 2) as f64;
        let deviance = -2.0 * self.log_likelihood;
        ModelSummary {
            model: self.order.to_string(),
            constant: self.constant,
            ar: self.ar.clone(),
            ma: self.ma.clone(),
            sigma2: self.sigma2,
            log_likelihood: self.log_likelihood,
            aic: deviance + 2.0 * k,
            bic: deviance + k * n.ln(),
            hqic: deviance + 2.0 * k * n.ln().ln(),
            nobs: self.nobs,
            iterations: self.iterations,
        }
    }
}

struct KalmanOutput {
    log_likelihood: f64,
    sigma2: f64,
    state: Vec<f64>,
}

/// Concentrated exact log-likelihood of `y` under the given parameters.
///
/// Returns `None` when the parameters admit no stationary initial state or
/// the filter degenerates.
fn kalman_filter(y: &[f64], mean: f64, phi: &[f64], theta: &[f64]) -> Option<KalmanOutput> {
    let r = phi.len().max(theta.len() + 1);
    let t_mat = transition_matrix(phi, r);
    let mut selection = vec![0.0; r];
    selection[0] = 1.0;
    selection[1..=theta.len()].copy_from_slice(theta);
    let rqr: Vec<Vec<f64>> = selection
        .iter()
        .map(|a| selection.iter().map(|b| a * b).collect())
        .collect();

    let mut state = vec![0.0; r];
    let mut cov = stationary_covariance(&t_mat, &rqr)?;

    let mut sum_scaled_sq = 0.0;
    let mut sum_log_f = 0.0;

    for &obs in y {
        let v = obs - mean - state[0];
        let f = cov[0][0];
        if !(f > 0.0 && f.is_finite()) {
            return None;
        }
        sum_scaled_sq += v * v / f;
        sum_log_f += f.ln();

        let gain: Vec<f64> = cov.iter().map(|row| row[0] / f).collect();
        for (s, g) in state.iter_mut().zip(&gain) {
            *s += g * v;
        }
        let first_row = cov[0].clone();
        for (row, g) in cov.iter_mut().zip(&gain) {
            for (c, top) in row.iter_mut().zip(&first_row) {
                *c -= g * top;
            }
        }

        state = mat_vec(&t_mat, &state);
        cov = add(&sandwich(&t_mat, &cov), &rqr);
    }

    let n = y.len() as f64;
    let sigma2 = sum_scaled_sq / n;
    if !(sigma2 > 0.0 && sigma2.is_finite()) {
        return None;
    }
    let log_likelihood = -n / 2.0 * ((2.0 * PI).ln() + sigma2.ln() + 1.0) - 0.5 * sum_log_f;
    log_likelihood.is_finite().then_some(KalmanOutput {
        log_likelihood,
        sigma2,
        state,
    })
}

/// Companion-style transition matrix: `phi` down the first column, ones on
/// the superdiagonal.
fn transition_matrix(phi: &[f64], r: usize) -> Vec<Vec<f64>> {
    let mut t = vec![vec![0.0; r]; r];
    for (i, row) in t.iter_mut().enumerate() {
        if let Some(&coef) = phi.get(i) {
            row[0] = coef;
        }
        if i + 1 < r {
            row[i + 1] = 1.0;
        }
    }
    t
}

/// Solves `P = T P T' + Q` through `(I - T ⊗ T) vec(P) = vec(Q)`.
fn stationary_covariance(t: &[Vec<f64>], q: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let r = t.len();
    let dim = r * r;
    let mut system = vec![vec![0.0; dim]; dim];
    for i in 0..r {
        for j in 0..r {
            for k in 0..r {
                for l in 0..r {
                    let identity = if i == k && j == l { 1.0 } else { 0.0 };
                    system[i * r + j][k * r + l] = identity - t[i][k] * t[j][l];
                }
            }
        }
    }
    let rhs: Vec<f64> = q.iter().flatten().copied().collect();
    let vec_p = solve(&system, &rhs)?;
    Some(vec_p.chunks(r).map(<[f64]>::to_vec).collect())
}

/// `T P T'`.
fn sandwich(t: &[Vec<f64>], p: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let r = t.len();
    let tp: Vec<Vec<f64>> = (0..r)
        .map(|i| (0..r).map(|j| (0..r).map(|k| t[i][k] * p[k][j]).sum()).collect())
        .collect();
    (0..r)
        .map(|i| (0..r).map(|j| (0..r).map(|k| tp[i][k] * t[j][k]).sum()).collect())
        .collect()
}

fn add(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    a.iter()
        .zip(b)
        .map(|(ra, rb)| ra.iter().zip(rb).map(|(x, y)| x + y).collect())
        .collect()
}

/// Splits `[μ, x_ar.., x_ma..]` into constrained AR and MA coefficients.
fn coefficients(params: &[f64], p: usize, q: usize) -> (Vec<f64>, Vec<f64>) {
    let phi = constrain_stationary(&params[1..=p]);
    let theta = constrain_stationary(&params[1 + p..1 + p + q])
        .into_iter()
        .map(|a| -a)
        .collect();
    (phi, theta)
}

/// Maps unconstrained values to the coefficients of a stationary polynomial.
///
/// Each value becomes a partial autocorrelation `x / sqrt(1 + x²)`, and the
/// Durbin-Levinson recursion turns those into coefficients.
fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let partials: Vec<f64> = unconstrained
        .iter()
        .map(|x| x / (1.0 + x * x).sqrt())
        .collect();
    levinson_from_partials(&partials)
}

fn levinson_from_partials(partials: &[f64]) -> Vec<f64> {
    let mut coefs: Vec<f64> = Vec::with_capacity(partials.len());
    for (k, &r) in partials.iter().enumerate() {
        let previous = coefs.clone();
        for j in 0..k {
            coefs[j] = previous[j] - r * previous[k - 1 - j];
        }
        coefs.push(r);
    }
    coefs
}

/// Sample partial autocorrelations at lags `1..=max_lag`.
fn sample_pacf(y: &[f64], mean: f64, max_lag: usize) -> Vec<f64> {
    let n = y.len();
    let autocov = |lag: usize| -> f64 {
        (0..n - lag)
            .map(|t| (y[t] - mean) * (y[t + lag] - mean))
            .sum::<f64>()
            / n as f64
    };
    let c0 = autocov(0);
    let rho: Vec<f64> = (0..=max_lag).map(|k| autocov(k) / c0).collect();

    let mut pacf = Vec::with_capacity(max_lag);
    let mut phi: Vec<f64> = Vec::new();
    for k in 1..=max_lag {
        let num = rho[k] - (1..k).map(|j| phi[j - 1] * rho[k - j]).sum::<f64>();
        let den = 1.0 - (1..k).map(|j| phi[j - 1] * rho[j]).sum::<f64>();
        let partial = if den.abs() > f64::EPSILON { num / den } else { 0.0 };
        let previous = phi.clone();
        for j in 1..k {
            phi[j - 1] = previous[j - 1] - partial * previous[k - j - 1];
        }
        phi.push(partial);
        pacf.push(partial);
    }
    pacf
}

/// Starting point: sample mean, clamped sample PACF for AR, zero for MA.
fn start_params(y: &[f64], mean: f64, p: usize, q: usize) -> Vec<f64> {
    let mut params = Vec::with_capacity(1 + p + q);
    params.push(mean);
    params.extend(sample_pacf(y, mean, p).into_iter().map(|r| {
        let r = r.clamp(-MAX_START_PACF, MAX_START_PACF);
        r / (1.0 - r * r).sqrt()
    }));
    params.extend(std::iter::repeat_n(0.0, q));
    params
}
