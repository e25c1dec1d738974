//! Message record types produced by the transcript parser.
//!
//! Parsing happens in two steps, and each step has its own type:
//!
//! - [`MessageRecord`] holds the three captured fields exactly as they
//!   appeared in the transcript, timestamp included as raw text.
//! - [`TimedRecord`] is the same message after its timestamp has been
//!   parsed into a [`NaiveDateTime`].
//!
//! # Examples
//!
//! ```
//! use chatcast::MessageRecord;
//!
//! let record = MessageRecord::new("01.01.23, 09:00:00", "Alice", "hi");
//! assert_eq!(record.sender(), "Alice");
//! assert_eq!(record.text(), "hi");
//!
//! let timed = record.to_timed("%d.%m.%y, %H:%M:%S").unwrap();
//! assert_eq!(timed.hour(), 9);
//! ```

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// One matched transcript line.
///
/// Timestamps are kept as written; the transcript has no timezone
/// information, so no conversion is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Raw timestamp text captured between the brackets.
    pub timestamp: String,

    /// Display name of the author, up to the first `": "`.
    pub sender: String,

    /// Remainder of the line after the sender.
    pub text: String,
}

impl MessageRecord {
    /// Creates a new record from its three captured fields.
    pub fn new(
        timestamp: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            sender: sender.into(),
            text: text.into(),
        }
    }

    /// Returns the raw timestamp text.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the message text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Parses the raw timestamp with `format` and returns a timed copy.
    ///
    /// Returns `None` when the timestamp does not match the format.
    pub fn to_timed(&self, format: &str) -> Option<TimedRecord> {
        NaiveDateTime::parse_from_str(self.timestamp.trim(), format)
            .ok()
            .map(|timestamp| TimedRecord {
                timestamp,
                sender: self.sender.clone(),
                text: self.text.clone(),
            })
    }
}

/// A message whose timestamp has been parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedRecord {
    /// Wall-clock time the message was sent.
    pub timestamp: NaiveDateTime,

    /// Display name of the author.
    pub sender: String,

    /// Message text.
    pub text: String,
}

impl TimedRecord {
    /// Creates a timed record directly.
    pub fn new(timestamp: NaiveDateTime, sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            text: text.into(),
        }
    }

    /// Hour of day (0–23) the message was sent in.
    pub fn hour(&self) -> usize {
        self.timestamp.hour() as usize
    }
}
