//! Unified error types for chatcast.
//!
//! This module provides a single [`ChatcastError`] enum that covers every
//! failure the pipeline can report. A non-stationary series is *not* an
//! error: it is reported as [`ForecastOutcome::Withheld`](crate::pipeline::ForecastOutcome).
//!
//! # Error Taxonomy
//!
//! - **Input errors** ([`Io`](ChatcastError::Io), [`InputNotFound`](ChatcastError::InputNotFound),
//!   [`Parse`](ChatcastError::Parse)) are raised before any analysis runs
//! - **Data errors** ([`EmptySeries`](ChatcastError::EmptySeries),
//!   [`InsufficientData`](ChatcastError::InsufficientData)) mean a stage got too little input
//! - **Numerical errors** ([`Numerical`](ChatcastError::Numerical)) are fatal
//!   for the run; no partial forecast is returned

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatcast operations.
///
/// # Example
///
/// ```rust
/// use chatcast::error::Result;
/// use chatcast::MessageRecord;
///
/// fn my_function() -> Result<Vec<MessageRecord>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatcastError>;

/// The error type for all chatcast operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatcastError {
    /// An I/O error occurred while reading the transcript or writing an export.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The input path does not point to a readable file.
    #[error("Input file not found: {}", path.display())]
    InputNotFound {
        /// The path that was rejected
        path: PathBuf,
    },

    /// Failed to parse the transcript.
    #[error("Failed to parse transcript{}: {source}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Parse {
        /// The underlying parse error
        #[source]
        source: ParseErrorKind,
        /// The file path, if available
        path: Option<PathBuf>,
    },

    /// The resampler received no records.
    #[error("Cannot build an hourly series from an empty message list")]
    EmptySeries,

    /// A stage needs more observations than it was given.
    #[error("{stage} needs at least {required} observations, got {actual}")]
    InsufficientData {
        /// Pipeline stage that rejected the input
        stage: &'static str,
        /// Minimum number of observations
        required: usize,
        /// Number of observations supplied
        actual: usize,
    },

    /// A regression or model fit failed numerically.
    #[error("{stage} failed: {message}")]
    Numerical {
        /// Pipeline stage that failed
        stage: &'static str,
        /// What went wrong
        message: String,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig {
        /// Name of the offending field
        field: &'static str,
        /// Why it was rejected
        message: String,
    },

    /// Unknown or unavailable export format.
    #[error("Invalid {format} format: {message}")]
    InvalidFormat {
        /// Which format was being resolved
        format: &'static str,
        /// What went wrong
        message: String,
    },

    /// CSV writing error.
    #[cfg(feature = "csv-output")]
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[cfg(feature = "json-output")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kinds of transcript parse errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Fewer matching lines than the leading system notices to drop.
    #[error("found {found} message line(s), expected at least {required}")]
    TooFewMessages {
        /// Number of lines that matched the message pattern
        found: usize,
        /// Number of leading records that must be dropped
        required: usize,
    },

    /// A record timestamp did not match the transcript format.
    #[error("record {index} has timestamp '{value}', expected format '{expected}'")]
    InvalidTimestamp {
        /// Zero-based index of the record after dropping system notices
        index: usize,
        /// The raw timestamp text
        value: String,
        /// The chrono format string that was tried
        expected: String,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatcastError {
    /// Creates a parse error without path context.
    pub fn parse(source: ParseErrorKind) -> Self {
        ChatcastError::Parse { source, path: None }
    }

    /// Creates a numerical failure for the given stage.
    pub fn numerical(stage: &'static str, message: impl Into<String>) -> Self {
        ChatcastError::Numerical {
            stage,
            message: message.into(),
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(field: &'static str, message: impl Into<String>) -> Self {
        ChatcastError::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    /// Attaches a file path to a parse error; other variants pass through.
    #[must_use]
    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            ChatcastError::Parse { source, .. } => ChatcastError::Parse {
                source,
                path: Some(path.into()),
            },
            other => other,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatcastError::Io(_))
    }

    /// Returns `true` if this is a parse error.
    pub fn is_parse(&self) -> bool {
        matches!(self, ChatcastError::Parse { .. })
    }

    /// Returns `true` if this is a numerical failure.
    pub fn is_numerical(&self) -> bool {
        matches!(self, ChatcastError::Numerical { .. })
    }

    /// Returns `true` if the error was raised before any analysis ran.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ChatcastError::Io(_) | ChatcastError::InputNotFound { .. } | ChatcastError::Parse { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
