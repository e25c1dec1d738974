//! End-to-end CLI tests for chatcast.
//!
//! These tests run the actual binary against generated transcripts and
//! check its console output, exit status and export files.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test --test cli_e2e
//! ```

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

// ============================================================================
// Test Fixtures
// ============================================================================

const HEADER: &str = "\
[15.01.24, 00:00:00] Team: Messages and calls are end-to-end encrypted.
[15.01.24, 00:00:00] Team: Alice created group \"Team\"
";

/// Writes a transcript with `counts[i]` messages in hour `i` of 15 Jan 2024
/// onwards.
fn write_transcript(dir: &TempDir, name: &str, counts: &[u64]) -> PathBuf {
    let senders = ["Alice", "Bob", "Carol"];
    let mut text = String::from(HEADER);
    let mut n = 0usize;
    for (i, &count) in counts.iter().enumerate() {
        let day = 15 + i / 24;
        let hour = i % 24;
        for m in 0..count {
            text.push_str(&format!(
                "[{day:02}.01.24, {hour:02}:{:02}:{:02}] {}: message {n} 😀\n",
                m / 2,
                (m % 2) * 30,
                senders[n % senders.len()],
            ));
            n += 1;
        }
    }
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

fn noisy_counts(n: usize) -> Vec<u64> {
    let mut state: u64 = 99;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) % 6
        })
        .collect()
}

fn chatcast() -> Command {
    Command::cargo_bin("chatcast").unwrap()
}

// ============================================================================
// Console output
// ============================================================================

#[test]
fn test_stationary_chat_prints_forecast() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "chat.txt", &noisy_counts(300));

    chatcast()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Augmented Dickey-Fuller"))
        .stdout(predicate::str::contains("Verdict:          stationary"))
        .stdout(predicate::str::contains("ARIMA(1,0,1) fit"))
        .stdout(predicate::str::contains("Forecast (20 hours)"))
        .stdout(predicate::str::contains("Most active:      Alice"));
}

#[test]
fn test_flat_chat_withholds_forecast() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "flat.txt", &[2; 48]);

    chatcast()
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Forecast withheld"))
        .stdout(predicate::str::contains("non-stationary"))
        .stdout(predicate::str::contains("Forecast (").not());
}

#[test]
fn test_periods_flag() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "chat.txt", &noisy_counts(300));

    chatcast()
        .arg(&input)
        .args(["-n", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Forecast (5 hours)"));
}

#[test]
fn test_json_report() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "chat.txt", &noisy_counts(300));

    let output = chatcast().arg(&input).arg("--json").output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["outcome"]["status"], "produced");
    assert_eq!(report["outcome"]["forecast"]["points"].as_array().unwrap().len(), 20);
    assert!(report["stats"]["total_messages"].as_u64().unwrap() > 0);
}

// ============================================================================
// Exports
// ============================================================================

#[test]
fn test_csv_exports() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "chat.txt", &noisy_counts(300));
    let forecast = dir.path().join("forecast.csv");
    let series = dir.path().join("series.csv");
    let heatmap = dir.path().join("heatmap.csv");

    chatcast()
        .arg(&input)
        .arg("--forecast-out")
        .arg(&forecast)
        .arg("--series-out")
        .arg(&series)
        .arg("--heatmap-out")
        .arg(&heatmap)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote CSV"));

    let forecast = fs::read_to_string(&forecast).unwrap();
    assert!(forecast.starts_with("timestamp,predicted_count\n"));
    assert_eq!(forecast.lines().count(), 21);

    let series = fs::read_to_string(&series).unwrap();
    assert!(series.starts_with("hour,count\n"));
    assert!(series.lines().count() > 250);

    let heatmap = fs::read_to_string(&heatmap).unwrap();
    assert!(heatmap.starts_with("sender,0,1,2,"));
    assert_eq!(heatmap.lines().count(), 4);
}

#[test]
fn test_export_format_follows_extension() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "chat.txt", &noisy_counts(300));
    let series = dir.path().join("series.json");

    chatcast()
        .arg(&input)
        .arg("--series-out")
        .arg(&series)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote JSON"));

    let rows: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&series).unwrap()).unwrap();
    assert!(rows.as_array().unwrap()[0]["count"].is_number());
}

#[test]
fn test_unknown_export_extension() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "chat.txt", &noisy_counts(300));

    chatcast()
        .arg(&input)
        .arg("--series-out")
        .arg(dir.path().join("series.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown file extension"));
}

#[test]
fn test_json_exports() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "chat.txt", &noisy_counts(300));
    let forecast = dir.path().join("forecast.json");

    chatcast()
        .arg(&input)
        .args(["-f", "json", "-n", "3"])
        .arg("--forecast-out")
        .arg(&forecast)
        .assert()
        .success();

    let rows: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&forecast).unwrap()).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows[0]["timestamp"].is_string());
    assert!(rows[0]["predicted_count"].is_number());
}

#[test]
fn test_withheld_forecast_skips_export() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "flat.txt", &[2; 48]);
    let forecast = dir.path().join("forecast.csv");

    chatcast()
        .arg(&input)
        .arg("--forecast-out")
        .arg(&forecast)
        .assert()
        .success()
        .stderr(predicate::str::contains("No forecast to write"));

    assert!(!forecast.exists());
}

// ============================================================================
// Errors and flags
// ============================================================================

#[test]
fn test_two_message_chat_prints_statistics() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tiny.txt");
    fs::write(
        &input,
        "[01.01.23, 08:00:00] Group: Messages are end-to-end encrypted.\n\
         [01.01.23, 08:00:01] Group: Alice created this group\n\
         [01.01.23, 09:00:00] Alice: hi\n\
         [01.01.23, 09:05:00] Bob: hey\n",
    )
    .unwrap();

    chatcast()
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Busiest hour:     09:00 (2 messages)"))
        .stdout(predicate::str::contains("Most active:      Alice (1 messages, 50.00%)"))
        .stdout(predicate::str::contains("Total messages:   2"))
        .stderr(predicate::str::contains("needs at least 4 observations"));
}

#[test]
fn test_missing_input_file() {
    chatcast()
        .arg("/nonexistent/chat.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_transcript_without_messages() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.txt");
    fs::write(&input, "nothing to see here\n").unwrap();

    chatcast()
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse transcript"));
}

#[test]
fn test_invalid_significance() {
    let dir = tempdir().unwrap();
    let input = write_transcript(&dir, "chat.txt", &noisy_counts(100));

    chatcast()
        .arg(&input)
        .args(["--significance", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("significance"));
}

#[test]
fn test_help() {
    chatcast()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--forecast-out"))
        .stdout(predicate::str::contains("--periods"));
}

#[test]
fn test_version() {
    chatcast()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
