//! Configuration types for the parser and the forecasting pipeline.
//!
//! These are plain builder-style structs with no CLI framework dependency.
//! Every value has a default matching the behaviour of the command-line tool.
//!
//! - [`TranscriptConfig`] - transcript parsing settings
//! - [`StationarityConfig`] - Augmented Dickey-Fuller test settings
//! - [`ForecastConfig`] - ARIMA order, horizon and optimizer settings
//! - [`AnalysisConfig`] - all of the above, for [`analyze_file`](crate::pipeline::analyze_file)
//!
//! # Example
//!
//! ```rust
//! use chatcast::config::{AnalysisConfig, ForecastConfig, StationarityConfig};
//!
//! let config = AnalysisConfig::new()
//!     .with_stationarity(StationarityConfig::new().with_significance(0.01))
//!     .with_forecast(ForecastConfig::new().with_horizon(48));
//!
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ChatcastError, Result};

/// Timestamp layout of bracketed EU-style exports: `15.01.24, 10:30:45`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d.%m.%y, %H:%M:%S";

/// Configuration for transcript parsing.
///
/// # Example
///
/// ```rust
/// use chatcast::config::TranscriptConfig;
///
/// let config = TranscriptConfig::new().with_skip_leading(0);
/// assert_eq!(config.skip_leading, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Number of leading matched records to discard (default: 2).
    ///
    /// Exports open with an encryption notice and a group-creation notice
    /// that are formatted like regular messages.
    pub skip_leading: usize,

    /// chrono format string for the bracketed timestamp.
    pub timestamp_format: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            skip_leading: 2,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl TranscriptConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many leading records are discarded.
    #[must_use]
    pub fn with_skip_leading(mut self, count: usize) -> Self {
        self.skip_leading = count;
        self
    }

    /// Sets the timestamp format string.
    #[must_use]
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }
}

/// Configuration for the Augmented Dickey-Fuller test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StationarityConfig {
    /// p-value at or below which the series counts as stationary (default: 0.05).
    pub significance: f64,

    /// Upper bound for the lag search. `None` uses `ceil(12 * (n/100)^(1/4))`.
    pub max_lag: Option<usize>,
}

impl Default for StationarityConfig {
    fn default() -> Self {
        Self {
            significance: 0.05,
            max_lag: None,
        }
    }
}

impl StationarityConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the significance level.
    #[must_use]
    pub fn with_significance(mut self, significance: f64) -> Self {
        self.significance = significance;
        self
    }

    /// Caps the lag search.
    #[must_use]
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }

    /// Checks that the significance level is a probability.
    pub fn validate(&self) -> Result<()> {
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(ChatcastError::invalid_config(
                "significance",
                format!("must be in (0, 1), got {}", self.significance),
            ));
        }
        Ok(())
    }
}

/// ARIMA model order `(p, d, q)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// Autoregressive order.
    pub p: usize,
    /// Differencing order. Only `0` is supported.
    pub d: usize,
    /// Moving-average order.
    pub q: usize,
}

impl ArimaOrder {
    /// Creates an order triple.
    pub const fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl Default for ArimaOrder {
    fn default() -> Self {
        Self::new(1, 0, 1)
    }
}

impl std::fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Configuration for model fitting and forecasting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of hourly steps to forecast (the CLI passes 20).
    pub horizon: usize,

    /// Model order (default: `(1, 0, 1)`).
    pub order: ArimaOrder,

    /// Nelder-Mead iteration limit (default: 5000).
    pub max_iterations: usize,

    /// Convergence tolerance on both the simplex spread and the objective (default: 1e-6).
    pub tolerance: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 20,
            order: ArimaOrder::default(),
            max_iterations: 5000,
            tolerance: 1e-6,
        }
    }
}

impl ForecastConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the forecast horizon.
    #[must_use]
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Sets the model order.
    #[must_use]
    pub fn with_order(mut self, order: ArimaOrder) -> Self {
        self.order = order;
        self
    }

    /// Sets the optimizer iteration limit.
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Checks the order and optimizer settings.
    pub fn validate(&self) -> Result<()> {
        if self.order.d != 0 {
            return Err(ChatcastError::invalid_config(
                "order",
                format!("differencing order must be 0, got {}", self.order.d),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ChatcastError::invalid_config(
                "max_iterations",
                "must be greater than zero",
            ));
        }
        if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
            return Err(ChatcastError::invalid_config(
                "tolerance",
                format!("must be positive, got {}", self.tolerance),
            ));
        }
        Ok(())
    }
}

/// Everything [`analyze_file`](crate::pipeline::analyze_file) needs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Transcript parsing settings.
    pub transcript: TranscriptConfig,
    /// Stationarity test settings.
    pub stationarity: StationarityConfig,
    /// Forecast settings.
    pub forecast: ForecastConfig,
}

impl AnalysisConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the transcript settings.
    #[must_use]
    pub fn with_transcript(mut self, transcript: TranscriptConfig) -> Self {
        self.transcript = transcript;
        self
    }

    /// Replaces the stationarity settings.
    #[must_use]
    pub fn with_stationarity(mut self, stationarity: StationarityConfig) -> Self {
        self.stationarity = stationarity;
        self
    }

    /// Replaces the forecast settings.
    #[must_use]
    pub fn with_forecast(mut self, forecast: ForecastConfig) -> Self {
        self.forecast = forecast;
        self
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<()> {
        self.stationarity.validate()?;
        self.forecast.validate()
    }
}
