//! # Chatcast
//!
//! A Rust library for analysing exported group-chat transcripts and
//! forecasting hourly message volume.
//!
//! ## Overview
//!
//! Chatcast reads a bracketed WhatsApp export
//! (`[dd.mm.yy, HH:MM:SS] Sender: text`) and produces:
//! - **Activity statistics** - busiest/quietest hour and sender, totals, top emoji
//! - **Activity matrix** - sender × hour-of-day counts for a heatmap
//! - **Hourly series** - contiguous message counts per hour
//! - **Stationarity test** - Augmented Dickey-Fuller with MacKinnon p-values
//! - **Forecast** - ARIMA(1,0,1) hourly forecast, produced only for a
//!   stationary series
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatcast::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let report = analyze_file("WhatsApp_data.txt".as_ref(), &AnalysisConfig::default())?;
//!
//!     println!("{} messages", report.stats.total_messages);
//!     if let Some(forecast) = report.outcome.forecast() {
//!         write_csv(forecast, "forecast.csv".as_ref())?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Step by Step
//!
//! Every stage is a pure function of its input and can be called on its own:
//!
//! ```rust,no_run
//! use chatcast::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let parser = TranscriptParser::new();
//! let parsed = parser.parse("WhatsApp_data.txt".as_ref())?;
//! let records = parser.parse_timestamps(&parsed.records)?;
//!
//! let stats = ActivityStats::compute(&records);
//! let outcome = predict_message_volume(
//!     &records,
//!     &StationarityConfig::default(),
//!     &ArimaModel::default(),
//!     20,
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`] - transcript parsing ([`TranscriptParser`](parser::TranscriptParser))
//! - [`message`] - [`MessageRecord`] and [`TimedRecord`](message::TimedRecord)
//! - [`core`] - statistics, hourly resampling, export writers
//! - [`analysis`] - ADF test, ARIMA model, [`ForecastModel`](analysis::ForecastModel) trait
//! - [`pipeline`] - guarded forecast and [`analyze_file`](pipeline::analyze_file)
//! - [`config`] - builder-style configuration
//! - [`format`] - [`OutputFormat`](format::OutputFormat) selection
//! - [`error`] - unified error types ([`ChatcastError`], [`Result`])
//! - [`prelude`] - convenient re-exports

pub mod analysis;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod message;
pub mod parser;
pub mod pipeline;

// Re-export the main types at the crate root for convenience
pub use error::{ChatcastError, Result};
pub use message::MessageRecord;

/// Convenient re-exports for common usage.
///
/// Import everything you need with a single line:
///
/// ```rust
/// use chatcast::prelude::*;
/// ```
pub mod prelude {
    // Records
    pub use crate::message::{MessageRecord, TimedRecord};

    // Error types
    pub use crate::error::{ChatcastError, Result};

    // Parsing
    pub use crate::parser::{ParsedTranscript, TranscriptParser};

    // Configuration
    pub use crate::config::{
        AnalysisConfig, ArimaOrder, ForecastConfig, StationarityConfig, TranscriptConfig,
    };

    // Statistics and resampling
    pub use crate::core::{ActivityMatrix, ActivityStats, HourlySeries, resample_hourly};

    // Models
    pub use crate::analysis::{
        ArimaModel, FittedModel, ForecastModel, ForecastResult, StationarityResult, adf_test,
    };

    // Pipeline
    pub use crate::pipeline::{
        AnalysisReport, ForecastOutcome, analyze_file, predict_message_volume,
    };

    // Output
    #[cfg(feature = "csv-output")]
    pub use crate::core::output::{to_csv, write_csv};
    #[cfg(feature = "json-output")]
    pub use crate::core::output::{to_json, write_json};
    pub use crate::format::{OutputFormat, write_to_format};
}
