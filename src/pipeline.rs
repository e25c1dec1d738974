//! End-to-end analysis: resample, test for stationarity, forecast.
//!
//! The forecast is guarded: a model is only fitted when the ADF test rejects
//! the unit root. A non-stationary series ends the run normally with
//! [`ForecastOutcome::Withheld`]; it is not an error.
//!
//! [`forecast_series`] returns stage failures as errors. [`analyze_file`]
//! keeps the statistics it already computed and records the failure as
//! [`ForecastOutcome::Failed`] instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use chatcast::config::AnalysisConfig;
//! use chatcast::pipeline::{ForecastOutcome, analyze_file};
//!
//! let report = analyze_file("WhatsApp_data.txt".as_ref(), &AnalysisConfig::default())?;
//! match &report.outcome {
//!     ForecastOutcome::Produced { forecast, .. } => println!("{} hours forecast", forecast.len()),
//!     ForecastOutcome::Withheld { reason, .. } => println!("{reason}"),
//!     ForecastOutcome::Failed { reason, .. } => eprintln!("forecast failed: {reason}"),
//! }
//! # Ok::<(), chatcast::ChatcastError>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analysis::arima::ArimaModel;
use crate::analysis::{
    FittedModel, ForecastModel, ForecastResult, ModelSummary, StationarityResult, adf_test,
};
use crate::config::{AnalysisConfig, StationarityConfig};
use crate::core::resample::{HourlySeries, resample_hourly};
use crate::core::stats::{ActivityMatrix, ActivityStats};
use crate::error::{ChatcastError, Result};
use crate::message::TimedRecord;
use crate::parser::{ParsedTranscript, TranscriptParser};

/// Diagnostic attached to a withheld forecast.
pub const NON_STATIONARY_REASON: &str = "non-stationary, no forecast produced";

/// Result of the guarded forecasting stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    /// The series was stationary and a forecast was produced.
    Produced {
        /// ADF test result.
        stationarity: StationarityResult,
        /// Fitted model summary.
        model: ModelSummary,
        /// The hourly forecast.
        forecast: ForecastResult,
    },
    /// The series was not stationary; no model was fitted.
    Withheld {
        /// ADF test result.
        stationarity: StationarityResult,
        /// Why the forecast was withheld.
        reason: String,
    },
    /// The stationarity test or the model fit failed.
    Failed {
        /// ADF test result, if the test itself succeeded.
        stationarity: Option<StationarityResult>,
        /// The stage error.
        reason: String,
    },
}

impl ForecastOutcome {
    fn failed(stationarity: Option<StationarityResult>, error: &ChatcastError) -> Self {
        warn!(%error, "forecast stage failed");
        ForecastOutcome::Failed {
            stationarity,
            reason: error.to_string(),
        }
    }

    /// The stationarity test result, if the test ran.
    pub fn stationarity(&self) -> Option<&StationarityResult> {
        match self {
            ForecastOutcome::Produced { stationarity, .. }
            | ForecastOutcome::Withheld { stationarity, .. } => Some(stationarity),
            ForecastOutcome::Failed { stationarity, .. } => stationarity.as_ref(),
        }
    }

    /// The forecast, if one was produced.
    pub fn forecast(&self) -> Option<&ForecastResult> {
        match self {
            ForecastOutcome::Produced { forecast, .. } => Some(forecast),
            ForecastOutcome::Withheld { .. } | ForecastOutcome::Failed { .. } => None,
        }
    }

    /// Returns `true` if a forecast was produced.
    pub fn is_produced(&self) -> bool {
        matches!(self, ForecastOutcome::Produced { .. })
    }

    /// Returns `true` if a stage failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, ForecastOutcome::Failed { .. })
    }
}

/// Tests `series` for stationarity and, if it passes, fits `model` and
/// forecasts `horizon` hours.
pub fn forecast_series<M: ForecastModel>(
    series: &HourlySeries,
    stationarity: &StationarityConfig,
    model: &M,
    horizon: usize,
) -> Result<ForecastOutcome> {
    let result = adf_test(&series.values(), stationarity)?;
    guarded_forecast(series, result, model, horizon)
}

/// Fits and forecasts only when `result` is stationary.
fn guarded_forecast<M: ForecastModel>(
    series: &HourlySeries,
    result: StationarityResult,
    model: &M,
    horizon: usize,
) -> Result<ForecastOutcome> {
    info!(
        statistic = result.statistic,
        p_value = result.p_value,
        used_lag = result.used_lag,
        stationary = result.is_stationary,
        "stationarity test finished"
    );

    if !result.is_stationary {
        warn!(p_value = result.p_value, "{NON_STATIONARY_REASON}");
        return Ok(ForecastOutcome::Withheld {
            stationarity: result,
            reason: NON_STATIONARY_REASON.to_string(),
        });
    }

    let fitted = model.fit(series)?;
    let forecast = fitted.forecast(horizon)?;
    info!(model = %model.name(), horizon, "forecast produced");

    Ok(ForecastOutcome::Produced {
        stationarity: result,
        model: fitted.summary(),
        forecast,
    })
}

/// Resamples `records` hourly and runs [`forecast_series`].
pub fn predict_message_volume<M: ForecastModel>(
    records: &[TimedRecord],
    stationarity: &StationarityConfig,
    model: &M,
    horizon: usize,
) -> Result<ForecastOutcome> {
    let series = resample_hourly(records)?;
    forecast_series(&series, stationarity, model, horizon)
}

/// Everything one analysis run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Lines that matched the message pattern, leading notices included.
    pub matched_lines: usize,
    /// Non-empty lines that did not match.
    pub skipped_lines: usize,
    /// Descriptive statistics.
    pub stats: ActivityStats,
    /// Sender × hour-of-day counts.
    pub activity: ActivityMatrix,
    /// Hourly message counts.
    pub series: HourlySeries,
    /// Stationarity verdict and forecast, or the stage failure.
    pub outcome: ForecastOutcome,
}

/// Reads, parses and analyses one transcript file.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;
    let parser = TranscriptParser::with_config(config.transcript.clone());
    let parsed = parser.parse(path)?;
    info!(path = %path.display(), records = parsed.records.len(), "transcript parsed");
    analyze_parsed(&parser, parsed, config).map_err(|e| e.with_path(path))
}

/// Parses and analyses transcript text.
pub fn analyze_str(content: &str, config: &AnalysisConfig) -> Result<AnalysisReport> {
    config.validate()?;
    let parser = TranscriptParser::with_config(config.transcript.clone());
    let parsed = parser.parse_str(content)?;
    analyze_parsed(&parser, parsed, config)
}

fn analyze_parsed(
    parser: &TranscriptParser,
    parsed: ParsedTranscript,
    config: &AnalysisConfig,
) -> Result<AnalysisReport> {
    let records = parser.parse_timestamps(&parsed.records)?;

    let stats = ActivityStats::compute(&records);
    let activity = ActivityMatrix::compute(&records);
    info!(total = stats.total_messages, senders = activity.senders.len(), "statistics computed");

    let series = resample_hourly(&records)?;
    info!(hours = series.len(), "hourly series built");

    let model = ArimaModel::from_config(&config.forecast);
    let outcome = match adf_test(&series.values(), &config.stationarity) {
        Ok(result) => {
            guarded_forecast(&series, result.clone(), &model, config.forecast.horizon)
                .unwrap_or_else(|e| ForecastOutcome::failed(Some(result), &e))
        }
        Err(e) => ForecastOutcome::failed(None, &e),
    };

    Ok(AnalysisReport {
        matched_lines: parsed.matched_lines,
        skipped_lines: parsed.skipped_lines,
        stats,
        activity,
        series,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatcastError;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

    /// Fails the test if the pipeline ever fits it.
    #[derive(Debug)]
    struct UnreachableModel;

    #[derive(Debug)]
    struct UnreachableFit;

    impl ForecastModel for UnreachableModel {
        type Fitted = UnreachableFit;

        fn name(&self) -> String {
            "unreachable".into()
        }

        fn fit(&self, _series: &HourlySeries) -> Result<UnreachableFit> {
            panic!("model must not be fitted on a non-stationary series");
        }
    }

    impl FittedModel for UnreachableFit {
        fn forecast(&self, _steps: usize) -> Result<ForecastResult> {
            unreachable!()
        }

        fn summary(&self) -> ModelSummary {
            unreachable!()
        }
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// `counts[i]` messages in hour `i`.
    fn records_from_counts(counts: &[u64]) -> Vec<TimedRecord> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(i, &c)| {
                (0..c).map(move |m| {
                    TimedRecord::new(
                        start() + TimeDelta::hours(i as i64) + TimeDelta::minutes(m as i64),
                        if m % 2 == 0 { "Alice" } else { "Bob" },
                        "msg",
                    )
                })
            })
            .collect()
    }

    fn noisy_counts(n: usize) -> Vec<u64> {
        let mut state: u64 = 17;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                (state >> 61) % 6
            })
            .collect()
    }

    #[test]
    fn test_flat_series_withholds_forecast() {
        let records = records_from_counts(&[1; 48]);
        let outcome =
            predict_message_volume(&records, &StationarityConfig::default(), &UnreachableModel, 20)
                .unwrap();

        assert!(!outcome.is_produced());
        assert!(outcome.forecast().is_none());
        assert!(!outcome.stationarity().unwrap().is_stationary);
        match outcome {
            ForecastOutcome::Withheld { reason, .. } => assert_eq!(reason, NON_STATIONARY_REASON),
            other => panic!("expected a withheld forecast, got {other:?}"),
        }
    }

    #[test]
    fn test_stationary_series_produces_forecast() {
        let counts = noisy_counts(300);
        let records = records_from_counts(&counts);
        let outcome = predict_message_volume(
            &records,
            &StationarityConfig::default(),
            &ArimaModel::default(),
            20,
        )
        .unwrap();

        let forecast = outcome.forecast().expect("forecast produced");
        assert_eq!(forecast.len(), 20);
        let last = start() + TimeDelta::hours(counts.len() as i64 - 1);
        assert_eq!(forecast.points()[0].timestamp, last + TimeDelta::hours(1));
        assert!(forecast.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_records_is_error() {
        let err = predict_message_volume(&[], &StationarityConfig::default(), &UnreachableModel, 5)
            .unwrap_err();
        assert!(matches!(err, ChatcastError::EmptySeries));
    }

    #[test]
    fn test_short_series_is_error() {
        let records = records_from_counts(&[2, 1, 3]);
        let err = predict_message_volume(&records, &StationarityConfig::default(), &UnreachableModel, 5)
            .unwrap_err();
        assert!(matches!(err, ChatcastError::InsufficientData { .. }));
    }

    /// Transcript text with `counts[i]` messages in hour `i`.
    fn analyze_text(counts: &[u64]) -> String {
        let mut text = String::from(
            "[01.03.24, 00:00:00] Group: Messages are end-to-end encrypted.\n\
             [01.03.24, 00:00:01] Group: Alice created this group\n",
        );
        for (i, &count) in counts.iter().enumerate() {
            let hour = start() + TimeDelta::hours(i as i64);
            for m in 0..count {
                let ts = hour + TimeDelta::minutes(m as i64);
                let sender = if m % 3 == 0 { "Bob" } else { "Alice" };
                text.push_str(&format!("[{}] {sender}: hello\n", ts.format("%d.%m.%y, %H:%M:%S")));
            }
        }
        text
    }

    #[test]
    fn test_analyze_str_reports_everything() {
        let mut text = analyze_text(&noisy_counts(300));
        text.push_str("a continuation line\n");

        let report = analyze_str(&text, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.skipped_lines, 1);
        assert_eq!(report.stats.total_messages as u64, report.series.total());
        assert_eq!(report.activity.total(), report.stats.total_messages);
        assert_eq!(report.matched_lines, report.stats.total_messages + 2);
        assert!(report.outcome.is_produced());
    }

    #[test]
    fn test_analyze_str_keeps_stats_when_series_is_too_short() {
        let text = "\
[01.01.23, 08:00:00] Group: Messages are end-to-end encrypted.
[01.01.23, 08:00:01] Group: Alice created this group
[01.01.23, 09:00:00] Alice: hi
[01.01.23, 09:05:00] Bob: hey";
        let report = analyze_str(text, &AnalysisConfig::default()).unwrap();

        assert_eq!(report.stats.total_messages, 2);
        assert_eq!(report.series.len(), 1);
        assert!(report.outcome.is_failed());
        assert!(report.outcome.stationarity().is_none());
        match &report.outcome {
            ForecastOutcome::Failed { reason, .. } => {
                assert!(reason.contains("needs at least 4 observations"));
            }
            other => panic!("expected a failed outcome, got {other:?}"),
        }
    }

    #[test]
    fn test_model_failure_keeps_stationarity() {
        let text = analyze_text(&noisy_counts(300));
        let config = AnalysisConfig::new()
            .with_forecast(crate::config::ForecastConfig::new().with_max_iterations(1));
        let report = analyze_str(&text, &config).unwrap();

        assert!(report.outcome.is_failed());
        assert!(report.outcome.forecast().is_none());
        assert!(report.outcome.stationarity().unwrap().is_stationary);
        let json = serde_json::to_value(&report.outcome).unwrap();
        assert_eq!(json["status"], "failed");
    }

    #[test]
    fn test_analyze_str_rejects_bad_config() {
        let config = AnalysisConfig::new()
            .with_stationarity(StationarityConfig::new().with_significance(2.0));
        let err = analyze_str("", &config).unwrap_err();
        assert!(matches!(err, ChatcastError::InvalidConfig { .. }));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let records = records_from_counts(&[1; 48]);
        let outcome =
            predict_message_volume(&records, &StationarityConfig::default(), &UnreachableModel, 20)
                .unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "withheld");
        assert_eq!(json["reason"], NON_STATIONARY_REASON);
    }
}
