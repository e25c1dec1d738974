//! Hourly resampling of message timestamps.
//!
//! [`resample_hourly`] buckets messages into `[h:00:00, h+1:00:00)` intervals
//! and returns a contiguous [`HourlySeries`]: every hour between the earliest
//! and the latest message appears exactly once, zero-count hours included.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{ChatcastError, Result};
use crate::message::TimedRecord;

/// One hourly bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyCount {
    /// Start of the bucket (minutes and seconds are zero).
    pub hour: NaiveDateTime,
    /// Messages sent within the bucket.
    pub count: u64,
}

/// A gap-free series of hourly buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlySeries {
    buckets: Vec<HourlyCount>,
}

impl HourlySeries {
    /// Builds a series from counts starting at `start`.
    ///
    /// `start` is truncated to the hour; bucket `i` begins `i` hours later.
    pub fn from_counts(start: NaiveDateTime, counts: &[u64]) -> Self {
        let start = floor_hour(start);
        let buckets = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| HourlyCount {
                hour: start + TimeDelta::hours(i as i64),
                count,
            })
            .collect();
        Self { buckets }
    }

    /// All buckets in hour order.
    pub fn buckets(&self) -> &[HourlyCount] {
        &self.buckets
    }

    /// Counts as `f64`, the input of the stationarity test and the model.
    pub fn values(&self) -> Vec<f64> {
        self.buckets.iter().map(|b| b.count as f64).collect()
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` when the series has no buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// First bucket, if any.
    pub fn first(&self) -> Option<&HourlyCount> {
        self.buckets.first()
    }

    /// Last bucket, if any.
    pub fn last(&self) -> Option<&HourlyCount> {
        self.buckets.last()
    }

    /// Sum of all bucket counts.
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.count).sum()
    }
}

/// Truncates a timestamp to the start of its hour.
pub fn floor_hour(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN) + TimeDelta::hours(i64::from(ts.hour()))
}

/// Resamples `records` into a contiguous hourly count series.
///
/// The series runs from the hour of the earliest message to the hour of
/// the latest one, inclusive; records need not be sorted. Fails with
/// [`ChatcastError::EmptySeries`] when `records` is empty.
pub fn resample_hourly(records: &[TimedRecord]) -> Result<HourlySeries> {
    let (first, last) = records
        .iter()
        .map(|r| r.timestamp)
        .fold(None, |acc: Option<(NaiveDateTime, NaiveDateTime)>, ts| match acc {
            None => Some((ts, ts)),
            Some((lo, hi)) => Some((lo.min(ts), hi.max(ts))),
        })
        .ok_or(ChatcastError::EmptySeries)?;

    let start = floor_hour(first);
    let span = (floor_hour(last) - start).num_hours() as usize + 1;

    let mut counts = vec![0u64; span];
    for record in records {
        let offset = (floor_hour(record.timestamp) - start).num_hours() as usize;
        counts[offset] += 1;
    }

    Ok(HourlySeries::from_counts(start, &counts))
}
