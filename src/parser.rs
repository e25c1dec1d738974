//! Transcript parser for bracketed WhatsApp exports.
//!
//! Each line is searched for `[<timestamp>] <sender>: <message>`. Lines that
//! do not match are skipped, and that includes the continuation lines of
//! multi-line messages: they are **not** reattached to the previous message.
//! The number of skipped lines is reported in
//! [`ParsedTranscript::skipped_lines`].
//!
//! The first records of every export are system notices (end-to-end
//! encryption, group creation) and are dropped unconditionally.
//!
//! # Example
//!
//! ```rust
//! use chatcast::parser::TranscriptParser;
//!
//! let text = "\
//! [01.01.23, 08:00:00] Group: Messages are end-to-end encrypted.
//! [01.01.23, 08:00:01] Group: Alice created this group
//! [01.01.23, 09:00:00] Alice: hi
//! [01.01.23, 09:05:00] Bob: hey";
//!
//! let parsed = TranscriptParser::new().parse_str(text)?;
//! assert_eq!(parsed.records.len(), 2);
//! assert_eq!(parsed.records[0].sender, "Alice");
//! # Ok::<(), chatcast::ChatcastError>(())
//! ```

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TranscriptConfig;
use crate::error::{ChatcastError, ParseErrorKind, Result};
use crate::message::{MessageRecord, TimedRecord};

/// Bracketed timestamp, sender up to the first `": "`, rest of the line.
const MESSAGE_PATTERN: &str = r"\[(.*?)\]\s(.*?):\s(.*)";

/// Output of [`TranscriptParser::parse_str`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTranscript {
    /// Matched records in file order, leading notices removed.
    pub records: Vec<MessageRecord>,

    /// Number of lines that matched the message pattern.
    pub matched_lines: usize,

    /// Number of non-empty lines that did not match and were dropped.
    pub skipped_lines: usize,
}

/// Parser for bracketed transcript exports.
///
/// # Example
///
/// ```rust,no_run
/// use chatcast::parser::TranscriptParser;
///
/// let parsed = TranscriptParser::new().parse("WhatsApp_data.txt".as_ref())?;
/// println!("{} messages", parsed.records.len());
/// # Ok::<(), chatcast::ChatcastError>(())
/// ```
#[derive(Debug, Clone)]
pub struct TranscriptParser {
    config: TranscriptConfig,
    regex: Regex,
}

impl TranscriptParser {
    /// Creates a new parser with default configuration.
    pub fn new() -> Self {
        Self::with_config(TranscriptConfig::default())
    }

    /// Creates a parser with custom configuration.
    pub fn with_config(config: TranscriptConfig) -> Self {
        Self {
            config,
            regex: Regex::new(MESSAGE_PATTERN).unwrap(),
        }
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &TranscriptConfig {
        &self.config
    }

    /// Reads the whole file, then parses it.
    ///
    /// The file handle is released before parsing starts.
    pub fn parse(&self, path: &Path) -> Result<ParsedTranscript> {
        let content = fs::read_to_string(path)?;
        self.parse_str(&content).map_err(|e| e.with_path(path))
    }

    /// Parses transcript text.
    ///
    /// Fails with [`ParseErrorKind::TooFewMessages`] when fewer lines match
    /// than there are leading notices to drop.
    pub fn parse_str(&self, content: &str) -> Result<ParsedTranscript> {
        let mut matched: Vec<MessageRecord> = Vec::new();
        let mut skipped_lines = 0;

        for (line_no, line) in content.lines().enumerate() {
            if let Some(caps) = self.regex.captures(line) {
                let timestamp = caps.get(1).map_or("", |m| m.as_str());
                let sender = caps.get(2).map_or("", |m| m.as_str());
                let text = caps.get(3).map_or("", |m| m.as_str());
                matched.push(MessageRecord::new(timestamp, sender, text));
            } else if !line.trim().is_empty() {
                // Continuation lines are dropped, not appended
                debug!(line = line_no + 1, "skipping unmatched transcript line");
                skipped_lines += 1;
            }
        }

        let matched_lines = matched.len();
        let skip = self.config.skip_leading;
        if matched_lines < skip {
            return Err(ChatcastError::parse(ParseErrorKind::TooFewMessages {
                found: matched_lines,
                required: skip,
            }));
        }

        let records: Vec<MessageRecord> = matched.into_iter().skip(skip).collect();
        debug!(
            matched = matched_lines,
            skipped = skipped_lines,
            kept = records.len(),
            "parsed transcript"
        );

        Ok(ParsedTranscript {
            records,
            matched_lines,
            skipped_lines,
        })
    }

    /// Parses every record timestamp with the configured format.
    ///
    /// The first failure aborts the whole conversion.
    pub fn parse_timestamps(&self, records: &[MessageRecord]) -> Result<Vec<TimedRecord>> {
        parse_timestamps(records, &self.config.timestamp_format)
    }
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts raw records into [`TimedRecord`]s using `format`.
///
/// Returns [`ParseErrorKind::InvalidTimestamp`] for the first record whose
/// timestamp does not parse.
pub fn parse_timestamps(records: &[MessageRecord], format: &str) -> Result<Vec<TimedRecord>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record.to_timed(format).ok_or_else(|| {
                ChatcastError::parse(ParseErrorKind::InvalidTimestamp {
                    index,
                    value: record.timestamp.clone(),
                    expected: format.to_string(),
                })
            })
        })
        .collect()
}
