//! Integration tests for the full analysis pipeline.
//!
//! Transcripts are generated on the fly from hourly message counts and
//! written to temporary files, then run through [`analyze_file`].

use std::fs;
use std::path::PathBuf;

use chatcast::prelude::*;
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use tempfile::{TempDir, tempdir};

// ============================================================================
// Fixtures
// ============================================================================

const SENDERS: [&str; 3] = ["Alice", "Bob", "Carol"];

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Builds a transcript with `counts[i]` messages in hour `i`, preceded by the
/// two system notices every export starts with.
fn transcript(counts: &[u64]) -> String {
    let mut text = String::from(
        "[15.01.24, 00:00:00] Team: Messages and calls are end-to-end encrypted.\n\
         [15.01.24, 00:00:00] Team: Alice created group \"Team\"\n",
    );
    let mut n = 0usize;
    for (i, &count) in counts.iter().enumerate() {
        let hour = start() + TimeDelta::hours(i as i64);
        for m in 0..count {
            let ts = hour + TimeDelta::seconds(m as i64 * 30);
            let sender = SENDERS[n % SENDERS.len()];
            let body = if n % 5 == 0 { "nice 😀" } else { "ok" };
            text.push_str(&format!(
                "[{}] {}: {} {}\n",
                ts.format("%d.%m.%y, %H:%M:%S"),
                sender,
                body,
                n
            ));
            n += 1;
        }
    }
    text
}

/// Deterministic counts in `0..6`.
fn noisy_counts(seed: u64, n: usize) -> Vec<u64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) % 6
        })
        .collect()
}

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_stationary_transcript_produces_forecast() {
    let dir = tempdir().unwrap();
    let counts = noisy_counts(99, 300);
    let path = write_fixture(&dir, "chat.txt", &transcript(&counts));

    let report = analyze_file(&path, &AnalysisConfig::default()).unwrap();

    let total: u64 = counts.iter().sum();
    assert_eq!(report.stats.total_messages as u64, total);
    assert_eq!(report.series.total(), total);
    assert_eq!(report.matched_lines, total as usize + 2);
    assert_eq!(report.skipped_lines, 0);

    let stationarity = report.outcome.stationarity().unwrap();
    assert!(stationarity.is_stationary);

    let forecast = report.outcome.forecast().expect("forecast produced");
    assert_eq!(forecast.len(), 20);
    let last = report.series.last().unwrap().hour;
    assert_eq!(forecast.points()[0].timestamp, last + TimeDelta::hours(1));
    assert_eq!(forecast.points()[19].timestamp, last + TimeDelta::hours(20));
}

#[test]
fn test_flat_transcript_withholds_forecast() {
    let dir = tempdir().unwrap();
    let path = write_fixture(&dir, "flat.txt", &transcript(&[2; 72]));

    let report = analyze_file(&path, &AnalysisConfig::default()).unwrap();

    assert_eq!(report.stats.total_messages, 144);
    assert!(!report.outcome.is_produced());
    assert!(report.outcome.forecast().is_none());
    match &report.outcome {
        ForecastOutcome::Withheld { reason, stationarity } => {
            assert!(reason.contains("non-stationary"));
            assert!((stationarity.p_value - 1.0).abs() < f64::EPSILON);
        }
        other => panic!("flat series must not be forecast: {other:?}"),
    }
}

#[test]
fn test_growing_activity_withholds_forecast() {
    let dir = tempdir().unwrap();
    let counts: Vec<u64> = (0..150u32)
        .map(|i| (1.03_f64.powi(i as i32)).round() as u64 + u64::from(i % 2))
        .collect();
    let path = write_fixture(&dir, "growing.txt", &transcript(&counts));

    let report = analyze_file(&path, &AnalysisConfig::default()).unwrap();
    assert!(!report.outcome.stationarity().unwrap().is_stationary);
    assert!(report.outcome.forecast().is_none());
}

#[test]
fn test_custom_horizon() {
    let dir = tempdir().unwrap();
    let path = write_fixture(&dir, "chat.txt", &transcript(&noisy_counts(7, 240)));
    let config = AnalysisConfig::new().with_forecast(ForecastConfig::new().with_horizon(48));

    let report = analyze_file(&path, &config).unwrap();
    assert_eq!(report.outcome.forecast().unwrap().len(), 48);
}

#[test]
fn test_activity_statistics_from_file() {
    let dir = tempdir().unwrap();
    let content = "\
[01.01.23, 08:00:00] Group: Messages are end-to-end encrypted.
[01.01.23, 08:00:01] Group: Alice created this group
[01.01.23, 09:00:00] Alice: hi
[01.01.23, 09:05:00] Bob: hey";
    let path = write_fixture(&dir, "tiny.txt", content);

    let parser = TranscriptParser::new();
    let parsed = parser.parse(&path).unwrap();
    let records = parser.parse_timestamps(&parsed.records).unwrap();
    let stats = ActivityStats::compute(&records);

    assert_eq!(stats.total_messages, 2);
    let busiest = stats.busiest_hour.unwrap();
    assert_eq!((busiest.hour, busiest.count), (9, 2));
    let sender = stats.busiest_sender.unwrap();
    assert_eq!(sender.sender, "Alice");
    assert!((sender.percent - 50.0).abs() < f64::EPSILON);
}

#[test]
fn test_two_message_transcript_reports_statistics() {
    let dir = tempdir().unwrap();
    let content = "\
[01.01.23, 08:00:00] Group: Messages are end-to-end encrypted.
[01.01.23, 08:00:01] Group: Alice created this group
[01.01.23, 09:00:00] Alice: hi
[01.01.23, 09:05:00] Bob: hey";
    let path = write_fixture(&dir, "tiny.txt", content);

    let report = analyze_file(&path, &AnalysisConfig::default()).unwrap();

    assert_eq!(report.stats.total_messages, 2);
    let busiest = report.stats.busiest_hour.unwrap();
    assert_eq!((busiest.hour, busiest.count), (9, 2));
    let sender = report.stats.busiest_sender.as_ref().unwrap();
    assert_eq!(sender.sender, "Alice");
    assert!((sender.percent - 50.0).abs() < f64::EPSILON);
    assert_eq!(report.series.values(), vec![2.0]);

    assert!(report.outcome.is_failed());
    assert!(report.outcome.forecast().is_none());
}

#[test]
fn test_activity_matrix_matches_statistics() {
    let dir = tempdir().unwrap();
    let path = write_fixture(&dir, "chat.txt", &transcript(&noisy_counts(3, 200)));

    let report = analyze_file(&path, &AnalysisConfig::default()).unwrap();
    assert_eq!(report.activity.senders, vec!["Alice", "Bob", "Carol"]);
    assert_eq!(report.activity.total(), report.stats.total_messages);

    for hour in 0..24 {
        let column: usize = report.activity.counts.iter().map(|row| row[hour]).sum();
        assert_eq!(column, report.stats.hourly_histogram[hour]);
    }
}

#[test]
fn test_exports_round_trip() {
    let dir = tempdir().unwrap();
    let path = write_fixture(&dir, "chat.txt", &transcript(&noisy_counts(99, 300)));
    let report = analyze_file(&path, &AnalysisConfig::default()).unwrap();
    let forecast = report.outcome.forecast().unwrap();

    let csv_path = dir.path().join("forecast.csv");
    write_to_format(forecast, &csv_path, OutputFormat::Csv).unwrap();
    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(
        reader.headers().unwrap(),
        &csv::StringRecord::from(vec!["timestamp", "predicted_count"])
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 20);
    for row in &rows {
        assert!(row[1].parse::<f64>().unwrap().is_finite());
    }

    let json_path = dir.path().join("series.json");
    write_to_format(&report.series, &json_path, OutputFormat::Json).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), report.series.len());
}

#[test]
fn test_report_serializes() {
    let dir = tempdir().unwrap();
    let path = write_fixture(&dir, "flat.txt", &transcript(&[1; 30]));
    let report = analyze_file(&path, &AnalysisConfig::default()).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["outcome"]["status"], "withheld");
    assert_eq!(json["stats"]["total_messages"], 30);
    assert!(json["outcome"]["stationarity"]["critical_values"]["5%"].is_number());
}

#[test]
fn test_forecast_with_other_model_order() {
    let counts = noisy_counts(11, 250);
    let dir = tempdir().unwrap();
    let path = write_fixture(&dir, "chat.txt", &transcript(&counts));

    let parser = TranscriptParser::new();
    let parsed = parser.parse(&path).unwrap();
    let records = parser.parse_timestamps(&parsed.records).unwrap();

    let model = ArimaModel::new(ArimaOrder::new(2, 0, 0));
    let outcome =
        predict_message_volume(&records, &StationarityConfig::default(), &model, 5).unwrap();
    match outcome {
        ForecastOutcome::Produced { model, forecast, .. } => {
            assert_eq!(model.model, "ARIMA(2,0,0)");
            assert_eq!(model.ar.len(), 2);
            assert_eq!(forecast.len(), 5);
        }
        other => panic!("noise should be stationary: {other:?}"),
    }
}
