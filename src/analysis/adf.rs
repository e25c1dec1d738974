//! Augmented Dickey-Fuller unit-root test.
//!
//! The test regresses the first difference of the series on a constant, the
//! lagged level, and `k` lagged differences:
//!
//! ```text
//! Δy_t = α + β y_{t-1} + γ_1 Δy_{t-1} + … + γ_k Δy_{t-k} + ε_t
//! ```
//!
//! The statistic is the t-value of `β`. `k` is chosen by minimising AIC over
//! `0..=max_lag` on a common estimation sample, then the regression is re-run
//! on the longest sample the chosen lag allows. p-values use MacKinnon's
//! (1994) response surface and critical values MacKinnon's (2010) tables,
//! both for the constant-only case with a single series.
//!
//! A series whose values are all equal cannot be regressed at all; it is
//! reported as non-stationary with a NaN statistic and a p-value of 1.

use std::f64::consts::SQRT_2;

use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;
use tracing::debug;

use crate::analysis::linalg::{OlsFit, ols};
use crate::config::StationarityConfig;
use crate::error::{ChatcastError, Result};

const STAGE: &str = "ADF regression";

/// Statistic above which the p-value is 1.
const TAU_MAX: f64 = 2.74;
/// Statistic below which the p-value is 0.
const TAU_MIN: f64 = -18.83;
/// Boundary between the small-p and large-p polynomials.
const TAU_STAR: f64 = -1.61;
/// Small-p polynomial coefficients, lowest degree first.
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
/// Large-p polynomial coefficients, lowest degree first.
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// Critical value response surfaces `c0 + c1/n + c2/n² + c3/n³` for 1%, 5%, 10%.
const TAU_CRIT: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

/// Critical values of the test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    /// 1% level.
    #[serde(rename = "1%")]
    pub one_percent: f64,
    /// 5% level.
    #[serde(rename = "5%")]
    pub five_percent: f64,
    /// 10% level.
    #[serde(rename = "10%")]
    pub ten_percent: f64,
}

impl CriticalValues {
    /// `(label, value)` pairs from the strictest level to the loosest.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("1%", self.one_percent),
            ("5%", self.five_percent),
            ("10%", self.ten_percent),
        ]
        .into_iter()
    }
}

/// Outcome of the Augmented Dickey-Fuller test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationarityResult {
    /// t-value of the lagged level; NaN for a constant series.
    pub statistic: f64,
    /// MacKinnon approximate p-value.
    pub p_value: f64,
    /// Number of lagged differences in the final regression.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub nobs: usize,
    /// Critical values for `nobs`.
    pub critical_values: CriticalValues,
    /// Minimum AIC of the lag search, absent for a constant series.
    pub ic_best: Option<f64>,
    /// Significance level the p-value was compared against.
    pub significance: f64,
    /// `p_value <= significance`.
    pub is_stationary: bool,
}

impl StationarityResult {
    /// One-line human-readable verdict.
    pub fn verdict(&self) -> &'static str {
        if self.is_stationary {
            "stationary (reject the unit-root null hypothesis)"
        } else {
            "non-stationary (fail to reject the unit-root null hypothesis)"
        }
    }
}

/// MacKinnon (1994) approximate p-value for the constant-only ADF statistic.
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return 1.0;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let z = if statistic <= TAU_STAR {
        polyval(&TAU_SMALL_P, statistic)
    } else {
        polyval(&TAU_LARGE_P, statistic)
    };
    normal_cdf(z)
}

/// MacKinnon (2010) critical values for a regression with `nobs` observations.
pub fn mackinnon_critical_values(nobs: usize) -> CriticalValues {
    let n = nobs as f64;
    let at = |c: &[f64; 4]| c[0] + c[1] / n + c[2] / n.powi(2) + c[3] / n.powi(3);
    CriticalValues {
        one_percent: at(&TAU_CRIT[0]),
        five_percent: at(&TAU_CRIT[1]),
        ten_percent: at(&TAU_CRIT[2]),
    }
}

/// Default upper bound of the lag search, `ceil(12 * (n/100)^(1/4))`.
pub fn default_max_lag(nobs: usize) -> usize {
    (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize
}

/// Runs the Augmented Dickey-Fuller test on `values`.
///
/// Needs at least four observations. A singular regression is a fatal
/// [`ChatcastError::Numerical`] error.
pub fn adf_test(values: &[f64], config: &StationarityConfig) -> Result<StationarityResult> {
    config.validate()?;

    let n = values.len();
    // Constant term plus one spare degree of freedom per lag
    let cap = (n / 2).checked_sub(2).ok_or(ChatcastError::InsufficientData {
        stage: "ADF test",
        required: 4,
        actual: n,
    })?;
    let max_lag = config.max_lag.unwrap_or_else(|| default_max_lag(n)).min(cap);

    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if lo == hi {
        debug!(n, "constant series, skipping ADF regression");
        let nobs = n - 1;
        return Ok(StationarityResult {
            statistic: f64::NAN,
            p_value: 1.0,
            used_lag: 0,
            nobs,
            critical_values: mackinnon_critical_values(nobs),
            ic_best: None,
            significance: config.significance,
            is_stationary: false,
        });
    }

    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=max_lag {
        let fit = adf_regression(values, &diffs, max_lag, lag)?;
        let aic = fit.aic();
        if !aic.is_finite() {
            return Err(ChatcastError::numerical(
                STAGE,
                format!("non-finite AIC at lag {lag}"),
            ));
        }
        if best.is_none_or(|(best_aic, _)| aic < best_aic) {
            best = Some((aic, lag));
        }
    }
    let (ic_best, used_lag) =
        best.ok_or_else(|| ChatcastError::numerical(STAGE, "lag search produced no candidates"))?;

    let fit = adf_regression(values, &diffs, used_lag, used_lag)?;
    let statistic = fit.t_value(1);
    if !statistic.is_finite() {
        return Err(ChatcastError::numerical(
            STAGE,
            "test statistic is not finite (perfect fit)",
        ));
    }

    let p_value = mackinnon_p_value(statistic);
    debug!(max_lag, used_lag, statistic, p_value, "ADF test finished");

    Ok(StationarityResult {
        statistic,
        p_value,
        used_lag,
        nobs: fit.nobs,
        critical_values: mackinnon_critical_values(fit.nobs),
        ic_best: Some(ic_best),
        significance: config.significance,
        is_stationary: p_value <= config.significance,
    })
}

/// Regresses `Δy_t` on `[1, y_{t-1}, Δy_{t-1}, …, Δy_{t-lag}]`.
///
/// The sample starts after the first `sample_lag` differences so that fits
/// with different `lag` values share the same observations.
fn adf_regression(values: &[f64], diffs: &[f64], sample_lag: usize, lag: usize) -> Result<OlsFit> {
    let mut y = Vec::with_capacity(diffs.len() - sample_lag);
    let mut rows = Vec::with_capacity(diffs.len() - sample_lag);

    for t in sample_lag..diffs.len() {
        let mut row = Vec::with_capacity(lag + 2);
        row.push(1.0);
        row.push(values[t]);
        row.extend((1..=lag).map(|j| diffs[t - j]));
        rows.push(row);
        y.push(diffs[t]);
    }

    ols(&y, &rows).ok_or_else(|| {
        ChatcastError::numerical(STAGE, format!("singular design matrix at lag {lag}"))
    })
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Deterministic uniform noise in `[0, 1)`.
    fn lcg(seed: u64, n: usize) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 11) as f64 / (1u64 << 53) as f64
            })
            .collect()
    }

    #[test]
    fn test_p_value_matches_critical_values() {
        assert_abs_diff_eq!(mackinnon_p_value(-2.86154), 0.05, epsilon = 0.002);
        assert_abs_diff_eq!(mackinnon_p_value(-3.43035), 0.01, epsilon = 0.002);
    }

    #[test]
    fn test_p_value_bounds() {
        assert_eq!(mackinnon_p_value(3.0), 1.0);
        assert_eq!(mackinnon_p_value(-20.0), 0.0);
        assert_eq!(mackinnon_p_value(f64::NAN), 1.0);
        let mid = mackinnon_p_value(-1.0);
        assert!(mid > 0.5 && mid < 1.0);
    }

    #[test]
    fn test_p_value_above_tau_star() {
        assert_abs_diff_eq!(mackinnon_p_value(-1.0), 0.7533, epsilon = 0.002);
        assert_abs_diff_eq!(mackinnon_p_value(0.0), 0.9585, epsilon = 0.002);
    }

    #[test]
    fn test_p_value_is_continuous_at_tau_star() {
        let below = mackinnon_p_value(TAU_STAR - 1e-4);
        let above = mackinnon_p_value(TAU_STAR + 1e-4);
        assert!((below - above).abs() < 0.01, "p({TAU_STAR}) jumps from {below} to {above}");
    }

    #[test]
    fn test_p_value_is_monotonic() {
        let mut previous = 0.0;
        for i in 0..200 {
            let stat = -18.0 + f64::from(i) * 0.1;
            let p = mackinnon_p_value(stat);
            assert!(p >= previous - 1e-12, "p-value decreased at {stat}");
            previous = p;
        }
    }

    #[test]
    fn test_critical_values_large_sample() {
        let cv = mackinnon_critical_values(1_000_000);
        assert_abs_diff_eq!(cv.one_percent, -3.43035, epsilon = 1e-4);
        assert_abs_diff_eq!(cv.five_percent, -2.86154, epsilon = 1e-4);
        assert_abs_diff_eq!(cv.ten_percent, -2.56677, epsilon = 1e-4);
        let labels: Vec<&str> = cv.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["1%", "5%", "10%"]);
    }

    #[test]
    fn test_critical_values_small_sample_are_wider() {
        let small = mackinnon_critical_values(50);
        let large = mackinnon_critical_values(5000);
        assert!(small.one_percent < large.one_percent);
        assert!(small.five_percent < large.five_percent);
    }

    #[test]
    fn test_default_max_lag() {
        assert_eq!(default_max_lag(100), 12);
        assert_eq!(default_max_lag(300), 16);
    }

    #[test]
    fn test_white_noise_is_stationary() {
        let values: Vec<f64> = lcg(7, 300).iter().map(|u| (u * 6.0).floor()).collect();
        let result = adf_test(&values, &StationarityConfig::default()).unwrap();
        assert!(result.is_stationary, "statistic {}", result.statistic);
        assert!(result.statistic < result.critical_values.five_percent);
        assert!(result.p_value <= 0.05);
        assert_eq!(result.nobs, 300 - 1 - result.used_lag);
        assert!(result.ic_best.is_some());
    }

    #[test]
    fn test_explosive_series_is_not_stationary() {
        let noise = lcg(11, 200);
        let values: Vec<f64> = noise
            .iter()
            .enumerate()
            .map(|(t, u)| 10.0 * 1.02_f64.powi(t as i32) + (u - 0.5))
            .collect();
        let result = adf_test(&values, &StationarityConfig::default()).unwrap();
        assert!(result.p_value > 0.05);
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let values = vec![3.0; 48];
        let result = adf_test(&values, &StationarityConfig::default()).unwrap();
        assert!(result.statistic.is_nan());
        assert_eq!(result.p_value, 1.0);
        assert!(result.ic_best.is_none());
    }

    #[test]
    fn test_too_short_series() {
        let err = adf_test(&[1.0, 2.0, 0.0], &StationarityConfig::default()).unwrap_err();
        assert!(matches!(err, ChatcastError::InsufficientData { actual: 3, .. }));
    }

    #[test]
    fn test_explicit_max_lag_is_respected() {
        let values: Vec<f64> = lcg(3, 120).iter().map(|u| (u * 4.0).floor()).collect();
        let result = adf_test(&values, &StationarityConfig::new().with_max_lag(0)).unwrap();
        assert_eq!(result.used_lag, 0);
        assert_eq!(result.nobs, 119);
    }

    #[test]
    fn test_significance_threshold_is_inclusive() {
        // Random walk keeps the p-value away from 0 and 1
        let values: Vec<f64> = lcg(5, 200)
            .iter()
            .scan(0.0, |level, u| {
                *level += u - 0.5;
                Some(*level)
            })
            .collect();
        let result = adf_test(&values, &StationarityConfig::default()).unwrap();
        let strict = adf_test(
            &values,
            &StationarityConfig::new().with_significance(result.p_value),
        )
        .unwrap();
        assert!(strict.is_stationary);
    }
}
