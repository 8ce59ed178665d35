//! Popup view model and display formatting

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::store::{SessionRecord, StoreSnapshot};

/// Placeholder row shown when the history is empty
pub const EMPTY_HISTORY: &str = "No records yet";

/// One rendered history row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRow {
    pub date: String,
    pub duration: String,
    /// Key for deleting this row
    pub timestamp: i64,
}

impl RecordRow {
    pub fn from_record(record: &SessionRecord) -> Self {
        Self {
            date: format_date(record.date),
            duration: format_compact_time(record.duration),
            timestamp: record.timestamp,
        }
    }
}

/// Everything the popup shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupView {
    /// Live time of the current run
    pub current: String,
    /// `"Total: …"` line
    pub total: String,
    pub is_running: bool,
    /// Label of the start/stop button
    pub button: String,
    pub records: Vec<RecordRow>,
    /// Set instead of rows when there is no history
    pub empty_message: Option<String>,
}

impl PopupView {
    pub fn new() -> Self {
        Self {
            current: format_compact_time(0),
            total: total_label(0),
            is_running: false,
            button: "Start".to_string(),
            records: Vec::new(),
            empty_message: Some(EMPTY_HISTORY.to_string()),
        }
    }

    pub fn set_running(&mut self, running: bool) {
        self.is_running = running;
        self.button = if running { "Stop" } else { "Start" }.to_string();
    }

    pub fn set_current(&mut self, seconds: u64) {
        self.current = format_compact_time(seconds);
    }

    pub fn set_total(&mut self, seconds: i64) {
        self.total = total_label(seconds);
    }

    pub fn set_records(&mut self, records: &[SessionRecord]) {
        self.records = records.iter().map(RecordRow::from_record).collect();
        self.empty_message = if records.is_empty() {
            Some(EMPTY_HISTORY.to_string())
        } else {
            None
        };
    }

    pub fn apply_snapshot(&mut self, snapshot: &StoreSnapshot) {
        self.set_total(snapshot.total_time);
        self.set_records(&snapshot.records);
    }
}

impl Default for PopupView {
    fn default() -> Self {
        Self::new()
    }
}

fn total_label(seconds: i64) -> String {
    // a negative total only comes from inconsistent stored data
    format!("Total: {}", format_compact_time(seconds.max(0) as u64))
}

/// `"1h 0m 5s"` style duration. Minutes appear once hours do; seconds are
/// dropped when zero unless nothing else is shown.
pub fn format_compact_time(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 || hours > 0 {
        parts.push(format!("{}m", minutes));
    }
    if secs > 0 || (hours == 0 && minutes == 0) {
        parts.push(format!("{}s", secs));
    }

    parts.join(" ")
}

/// `"18 Oct, 2026 3:07 PM"` in local time
pub fn format_date(millis: i64) -> String {
    format_date_in(millis, &Local)
}

pub fn format_date_in<Tz>(millis: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match tz.timestamp_millis_opt(millis).single() {
        Some(date) => date.format("%-d %b, %Y %-I:%M %p").to_string(),
        None => String::new(),
    }
}
