//! Time-series analysis of hourly message counts.
//!
//! - [`adf`] - Augmented Dickey-Fuller stationarity test
//! - [`arima`] - ARIMA(p,0,q) model fitted by exact maximum likelihood
//!
//! Models plug into the pipeline through the [`ForecastModel`] /
//! [`FittedModel`] pair: `fit` consumes a series and returns a fitted
//! model, which can then forecast any number of hours ahead.

pub mod adf;
pub mod arima;
pub(crate) mod linalg;
pub(crate) mod optimize;

use std::fmt::Debug;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::resample::HourlySeries;
use crate::error::Result;

pub use adf::{CriticalValues, StationarityResult, adf_test};
pub use arima::{ArimaModel, FittedArima};

/// One forecast hour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Start of the forecast hour.
    pub timestamp: NaiveDateTime,
    /// Expected number of messages; may be fractional or negative.
    pub predicted_count: f64,
}

/// Ordered hourly forecast.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Wraps forecast points already in hour order.
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    /// All points.
    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Predicted counts only.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_count).collect()
    }

    /// Number of forecast hours.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` for a zero-step forecast.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Estimates and fit statistics of a fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Model label, e.g. `ARIMA(1,0,1)`.
    pub model: String,
    /// Estimated mean of the series.
    pub constant: f64,
    /// Autoregressive coefficients.
    pub ar: Vec<f64>,
    /// Moving-average coefficients.
    pub ma: Vec<f64>,
    /// Innovation variance.
    pub sigma2: f64,
    /// Maximised log-likelihood.
    pub log_likelihood: f64,
    /// Akaike information criterion.
    pub aic: f64,
    /// Bayesian information criterion.
    pub bic: f64,
    /// Hannan-Quinn information criterion.
    pub hqic: f64,
    /// Observations used in the fit.
    pub nobs: usize,
    /// Optimizer iterations.
    pub iterations: usize,
}

/// A model that can be fitted to an hourly series.
pub trait ForecastModel: Debug {
    /// The fitted model produced by [`fit`](ForecastModel::fit).
    type Fitted: FittedModel;

    /// Human-readable model label.
    fn name(&self) -> String;

    /// Estimates the model on `series`.
    fn fit(&self, series: &HourlySeries) -> Result<Self::Fitted>;
}

/// A fitted model.
pub trait FittedModel: Debug {
    /// Forecasts `steps` hours past the end of the training series.
    fn forecast(&self, steps: usize) -> Result<ForecastResult>;

    /// Parameter estimates and fit statistics.
    fn summary(&self) -> ModelSummary;
}
