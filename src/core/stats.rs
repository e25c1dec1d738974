//! Descriptive activity statistics.
//!
//! All statistics are computed from [`TimedRecord`]s and are independent of
//! each other. Tie-breaking is deterministic:
//!
//! - busiest/quietest hour: the smallest hour wins
//! - busiest/quietest sender and most frequent emoji: the first one encountered wins
//!
//! Hours without any message are excluded from the quietest-hour search.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::message::TimedRecord;

/// Inclusive code point ranges treated as emoji.
const EMOJI_RANGES: [(u32, u32); 8] = [
    (0x1F600, 0x1F64F), // Emoticons
    (0x1F300, 0x1F5FF), // Miscellaneous Symbols and Pictographs
    (0x1F910, 0x1F95F), // Clothing and Accessories
    (0x1F980, 0x1F9EF), // Food, Drink, and Cooking
    (0x1F680, 0x1F6FF), // Transport and Map Symbols
    (0x1F700, 0x1F77F), // Alchemical Symbols
    (0x1F780, 0x1F7FF), // Geometric Shapes Extended
    (0x1F900, 0x1F9FF), // Supplemental Symbols and Pictographs
];

/// Returns `true` if `c` falls in one of the emoji ranges.
///
/// ```
/// use chatcast::core::stats::is_emoji;
///
/// assert!(is_emoji('😀'));
/// assert!(!is_emoji('A'));
/// ```
pub fn is_emoji(c: char) -> bool {
    let code = u32::from(c);
    EMOJI_RANGES
        .iter()
        .any(|&(start, end)| (start..=end).contains(&code))
}

/// An hour of day with its message count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourActivity {
    /// Hour of day, 0–23.
    pub hour: usize,
    /// Messages sent during that hour across all days.
    pub count: usize,
}

/// A sender with its message count and share of all messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderActivity {
    /// Sender display name.
    pub sender: String,
    /// Number of messages sent.
    pub count: usize,
    /// Share of all messages in percent, rounded half-up to 2 decimals.
    pub percent: f64,
}

/// The most frequent emoji and how often it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiCount {
    /// The emoji character.
    pub emoji: char,
    /// Number of occurrences across all messages.
    pub count: usize,
}

/// Activity statistics for a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityStats {
    /// Message counts per hour of day.
    pub hourly_histogram: [usize; 24],
    /// Message counts per sender in first-encountered order.
    pub sender_histogram: Vec<(String, usize)>,
    /// Hour with the most messages.
    pub busiest_hour: Option<HourActivity>,
    /// Hour with the fewest messages, among hours with at least one.
    pub quietest_hour: Option<HourActivity>,
    /// Sender with the most messages.
    pub busiest_sender: Option<SenderActivity>,
    /// Sender with the fewest messages.
    pub quietest_sender: Option<SenderActivity>,
    /// Number of records analysed.
    pub total_messages: usize,
    /// Most frequently used emoji, if any message contains one.
    pub top_emoji: Option<EmojiCount>,
}

impl ActivityStats {
    /// Computes every statistic from `records`.
    pub fn compute(records: &[TimedRecord]) -> Self {
        let hourly_histogram = hourly_histogram(records);
        let sender_histogram = sender_histogram(records);
        let total_messages = records.len();

        Self {
            busiest_hour: busiest_hour(&hourly_histogram),
            quietest_hour: quietest_hour(&hourly_histogram),
            busiest_sender: busiest_sender(&sender_histogram, total_messages),
            quietest_sender: quietest_sender(&sender_histogram, total_messages),
            top_emoji: most_frequent_emoji(records.iter().map(|r| r.text.as_str())),
            hourly_histogram,
            sender_histogram,
            total_messages,
        }
    }
}

/// Counts messages per hour of day.
pub fn hourly_histogram(records: &[TimedRecord]) -> [usize; 24] {
    let mut histogram = [0usize; 24];
    for record in records {
        histogram[record.hour()] += 1;
    }
    histogram
}

/// Counts messages per sender, preserving first-encountered order.
pub fn sender_histogram(records: &[TimedRecord]) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut histogram: Vec<(String, usize)> = Vec::new();

    for record in records {
        match index.get(record.sender.as_str()) {
            Some(&i) => histogram[i].1 += 1,
            None => {
                index.insert(record.sender.as_str(), histogram.len());
                histogram.push((record.sender.clone(), 1));
            }
        }
    }

    histogram
}

/// Hour with the highest count; ties go to the smallest hour.
pub fn busiest_hour(histogram: &[usize; 24]) -> Option<HourActivity> {
    let mut best: Option<HourActivity> = None;
    for (hour, &count) in histogram.iter().enumerate() {
        if count > 0 && best.is_none_or(|b| count > b.count) {
            best = Some(HourActivity { hour, count });
        }
    }
    best
}

/// Hour with the lowest non-zero count; ties go to the smallest hour.
pub fn quietest_hour(histogram: &[usize; 24]) -> Option<HourActivity> {
    let mut best: Option<HourActivity> = None;
    for (hour, &count) in histogram.iter().enumerate() {
        if count > 0 && best.is_none_or(|b| count < b.count) {
            best = Some(HourActivity { hour, count });
        }
    }
    best
}

/// Sender with the most messages; ties go to the first encountered.
pub fn busiest_sender(histogram: &[(String, usize)], total: usize) -> Option<SenderActivity> {
    pick_sender(histogram, total, |count, best| count > best)
}

/// Sender with the fewest messages; ties go to the first encountered.
pub fn quietest_sender(histogram: &[(String, usize)], total: usize) -> Option<SenderActivity> {
    pick_sender(histogram, total, |count, best| count < best)
}

fn pick_sender(
    histogram: &[(String, usize)],
    total: usize,
    better: impl Fn(usize, usize) -> bool,
) -> Option<SenderActivity> {
    let mut best: Option<&(String, usize)> = None;
    for entry in histogram {
        if best.is_none_or(|b| better(entry.1, b.1)) {
            best = Some(entry);
        }
    }
    best.map(|(sender, count)| SenderActivity {
        sender: sender.clone(),
        count: *count,
        percent: percent_of(*count, total),
    })
}

/// `count / total * 100`, rounded half-up to 2 decimals.
///
/// Rounding is done on integers so that exact halves are not lost to
/// binary floating point.
pub fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let count = count as u128;
    let total = total as u128;
    let hundredths = (count * 20_000 + total) / (2 * total);
    hundredths as f64 / 100.0
}

/// Finds the most frequent emoji across `texts`; ties go to the first encountered.
pub fn most_frequent_emoji<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<EmojiCount> {
    let mut index: HashMap<char, usize> = HashMap::new();
    let mut counts: Vec<EmojiCount> = Vec::new();

    for text in texts {
        for emoji in text.chars().filter(|&c| is_emoji(c)) {
            match index.get(&emoji) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(emoji, counts.len());
                    counts.push(EmojiCount { emoji, count: 1 });
                }
            }
        }
    }

    let mut best: Option<EmojiCount> = None;
    for entry in counts {
        if best.is_none_or(|b| entry.count > b.count) {
            best = Some(entry);
        }
    }
    best
}

/// Sender × hour-of-day message counts, the input of an activity heatmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityMatrix {
    /// Senders in first-encountered order.
    pub senders: Vec<String>,
    /// One row of 24 hourly counts per sender.
    pub counts: Vec<[usize; 24]>,
}

impl ActivityMatrix {
    /// Builds the matrix from `records`.
    pub fn compute(records: &[TimedRecord]) -> Self {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut senders = Vec::new();
        let mut counts: Vec<[usize; 24]> = Vec::new();

        for record in records {
            let row = *index.entry(record.sender.as_str()).or_insert_with(|| {
                senders.push(record.sender.clone());
                counts.push([0; 24]);
                counts.len() - 1
            });
            counts[row][record.hour()] += 1;
        }

        Self { senders, counts }
    }

    /// Returns the row for `sender`, if present.
    pub fn row(&self, sender: &str) -> Option<&[usize; 24]> {
        self.senders
            .iter()
            .position(|s| s == sender)
            .map(|i| &self.counts[i])
    }

    /// Sum of all cells.
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Iterates over `(sender, row)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[usize; 24])> {
        self.senders.iter().map(String::as_str).zip(self.counts.iter())
    }
}
