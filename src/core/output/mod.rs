//! Export writers for the analysis tables.
//!
//! Three results can be exported, each as CSV or JSON:
//!
//! | Table | CSV columns | JSON row |
//! |-------|-------------|----------|
//! | [`ForecastResult`] | `timestamp,predicted_count` | `{"timestamp", "predicted_count"}` |
//! | [`HourlySeries`] | `hour,count` | `{"hour", "count"}` |
//! | [`ActivityMatrix`] | `sender,0,1,…,23` | `{"sender", "hours": [24 counts]}` |
//!
//! - [`write_csv`] / [`to_csv`] - requires `csv-output` feature
//! - [`write_json`] / [`to_json`] - requires `json-output` feature
//!
//! # Example
//!
//! ```rust,no_run
//! # #[cfg(feature = "csv-output")]
//! # fn main() -> chatcast::Result<()> {
//! use chatcast::core::output::{to_csv, write_csv};
//! use chatcast::core::resample::HourlySeries;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let series = HourlySeries::from_counts(start, &[3, 0, 5]);
//!
//! write_csv(&series, "series.csv".as_ref())?;
//! let csv_string = to_csv(&series)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "csv-output"))]
//! # fn main() {}
//! ```

#[cfg(feature = "csv-output")]
mod csv_writer;
#[cfg(feature = "json-output")]
mod json_writer;

#[cfg(feature = "csv-output")]
pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use json_writer::{to_json, write_json};

use serde::Serialize;

use crate::analysis::ForecastResult;
use crate::core::resample::HourlySeries;
use crate::core::stats::ActivityMatrix;

/// Timestamp layout used in every export.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A result that can be exported as rows.
pub trait Table {
    /// One exported row.
    type Row: Serialize;

    /// CSV column names.
    fn header(&self) -> Vec<String>;

    /// Rows in output order.
    fn rows(&self) -> Vec<Self::Row>;

    /// CSV cells of one row, matching [`header`](Table::header).
    fn cells(row: &Self::Row) -> Vec<String>;
}

/// Exported forecast hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    /// Start of the forecast hour.
    pub timestamp: String,
    /// Expected number of messages.
    pub predicted_count: f64,
}

/// Exported hourly bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesRow {
    /// Start of the bucket.
    pub hour: String,
    /// Messages in the bucket.
    pub count: u64,
}

/// Exported activity-matrix row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRow {
    /// Sender display name.
    pub sender: String,
    /// Message counts for hours 0 through 23.
    pub hours: [usize; 24],
}

impl Table for ForecastResult {
    type Row = ForecastRow;

    fn header(&self) -> Vec<String> {
        vec!["timestamp".into(), "predicted_count".into()]
    }

    fn rows(&self) -> Vec<ForecastRow> {
        self.points()
            .iter()
            .map(|p| ForecastRow {
                timestamp: p.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                predicted_count: p.predicted_count,
            })
            .collect()
    }

    fn cells(row: &ForecastRow) -> Vec<String> {
        vec![row.timestamp.clone(), row.predicted_count.to_string()]
    }
}

impl Table for HourlySeries {
    type Row = SeriesRow;

    fn header(&self) -> Vec<String> {
        vec!["hour".into(), "count".into()]
    }

    fn rows(&self) -> Vec<SeriesRow> {
        self.buckets()
            .iter()
            .map(|b| SeriesRow {
                hour: b.hour.format(TIMESTAMP_FORMAT).to_string(),
                count: b.count,
            })
            .collect()
    }

    fn cells(row: &SeriesRow) -> Vec<String> {
        vec![row.hour.clone(), row.count.to_string()]
    }
}

impl Table for ActivityMatrix {
    type Row = ActivityRow;

    fn header(&self) -> Vec<String> {
        std::iter::once("sender".to_string())
            .chain((0..24).map(|h| h.to_string()))
            .collect()
    }

    fn rows(&self) -> Vec<ActivityRow> {
        ActivityMatrix::rows(self)
            .map(|(sender, hours)| ActivityRow {
                sender: sender.to_string(),
                hours: *hours,
            })
            .collect()
    }

    fn cells(row: &ActivityRow) -> Vec<String> {
        std::iter::once(row.sender.clone())
            .chain(row.hours.iter().map(ToString::to_string))
            .collect()
    }
}
