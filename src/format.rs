//! Export format selection.
//!
//! [`OutputFormat`] has no CLI framework dependency. The binary maps its
//! `--format` argument onto it, or detects it from the export path.
//!
//! # Example
//!
//! ```rust,no_run
//! # fn example() -> chatcast::Result<()> {
//! use chatcast::core::resample::HourlySeries;
//! use chatcast::format::{OutputFormat, write_to_format};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! let series = HourlySeries::from_counts(start, &[3, 0, 5]);
//!
//! let path = "series.json".as_ref();
//! let format = OutputFormat::from_path(path)?;
//! assert_eq!(format, OutputFormat::Json);
//! write_to_format(&series, path, format)?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::output::Table;
use crate::error::{ChatcastError, Result};

/// Export file format.
///
/// # Example
///
/// ```rust
/// use chatcast::format::OutputFormat;
/// use std::str::FromStr;
///
/// let format = OutputFormat::from_str("json").unwrap();
/// assert_eq!(format, OutputFormat::Json);
/// assert_eq!(format.extension(), "json");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Comma-separated values with a header line (default)
    #[default]
    Csv,

    /// Pretty-printed JSON array of row objects
    Json,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["csv", "json"]
    }

    /// Detects format from a file path based on extension.
    ///
    /// # Example
    ///
    /// ```rust
    /// use chatcast::format::OutputFormat;
    ///
    /// let format = OutputFormat::from_path("forecast.CSV".as_ref()).unwrap();
    /// assert_eq!(format, OutputFormat::Csv);
    /// ```
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(ChatcastError::InvalidFormat {
                format: "output",
                message: format!(
                    "Unknown file extension: '.{ext}'. Expected one of: {}",
                    OutputFormat::all_names().join(", ")
                ),
            }),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "CSV"),
            OutputFormat::Json => write!(f, "JSON"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Writes a table to a file in the specified format.
///
/// # Errors
///
/// Returns an error if:
/// - The required feature for the format is not enabled
/// - The file cannot be written
#[allow(unused_variables)]
pub fn write_to_format<T: Table>(table: &T, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        #[cfg(feature = "csv-output")]
        OutputFormat::Csv => crate::core::output::write_csv(table, path),
        #[cfg(feature = "json-output")]
        OutputFormat::Json => crate::core::output::write_json(table, path),
        #[allow(unreachable_patterns)]
        _ => Err(missing_feature(format)),
    }
}

#[allow(dead_code)]
fn missing_feature(format: OutputFormat) -> ChatcastError {
    ChatcastError::InvalidFormat {
        format: "output",
        message: format!(
            "Output format {format} requires the '{}' feature to be enabled",
            match format {
                OutputFormat::Csv => "csv-output",
                OutputFormat::Json => "json-output",
            }
        ),
    }
}
