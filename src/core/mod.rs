//! Core transformations of parsed messages.
//!
//! This module contains:
//! - [`stats`] - Activity statistics and the sender × hour matrix
//! - [`resample`] - Contiguous hourly count series
//! - [`output`] - Export writers (CSV, JSON)
//!
//! # Quick Start
//!
//! ```rust
//! use chatcast::core::{ActivityStats, resample_hourly};
//! use chatcast::message::TimedRecord;
//! use chrono::NaiveDate;
//!
//! let ts = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 30, 0).unwrap();
//! let records = vec![TimedRecord::new(ts, "Alice", "Morning 😀")];
//!
//! let stats = ActivityStats::compute(&records);
//! assert_eq!(stats.busiest_hour.unwrap().hour, 9);
//!
//! let series = resample_hourly(&records)?;
//! assert_eq!(series.total(), 1);
//! # Ok::<(), chatcast::ChatcastError>(())
//! ```

pub mod output;
pub mod resample;
pub mod stats;

pub use resample::{HourlyCount, HourlySeries, resample_hourly};
pub use stats::{ActivityMatrix, ActivityStats};

#[cfg(feature = "csv-output")]
pub use output::{to_csv, write_csv};
#[cfg(feature = "json-output")]
pub use output::{to_json, write_json};
