//! Data models for the repetition queue

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates;

/// Priority substituted for missing or malformed priority fields.
pub const DEFAULT_PRIORITY: f64 = 30.0;

/// Interval substituted for missing or malformed interval fields.
pub const DEFAULT_INTERVAL: f64 = 1.0;

/// One schedulable repetition: a row in a queue document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rep {
    /// Bracketed wiki-link to the reviewed note or block
    pub link: String,
    /// Review priority in `[0, 100]`; lower sorts first
    pub priority: f64,
    /// Free-text annotation, single line, no `|`
    pub notes: String,
    /// Current review interval in days
    pub interval: f64,
    /// Date on or after which the rep is eligible for review
    pub due: NaiveDate,
}

impl Rep {
    /// Build a rep, coercing out-of-range fields to their defaults.
    pub fn new(
        link: impl Into<String>,
        priority: f64,
        notes: &str,
        interval: f64,
        due: Option<NaiveDate>,
    ) -> Self {
        Self {
            link: link.into(),
            priority: valid_priority(priority).unwrap_or(DEFAULT_PRIORITY),
            notes: sanitize_notes(notes),
            interval: valid_interval(interval).unwrap_or(DEFAULT_INTERVAL),
            due: due.unwrap_or_else(dates::epoch),
        }
    }

    pub fn is_due(&self, today: NaiveDate) -> bool {
        today >= self.due
    }
}

/// Strip characters that would break the row format.
pub fn sanitize_notes(notes: &str) -> String {
    notes
        .chars()
        .filter(|c| *c != '|' && *c != '\n' && *c != '\r')
        .collect()
}

pub fn valid_priority(priority: f64) -> Option<f64> {
    if priority.is_finite() && (0.0..=100.0).contains(&priority) {
        Some(priority)
    } else {
        None
    }
}

pub fn valid_interval(interval: f64) -> Option<f64> {
    if interval.is_finite() && interval > 0.0 {
        Some(interval)
    } else {
        None
    }
}

/// Parse a priority table field, falling back to the default.
pub fn parse_priority(field: &str) -> f64 {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(valid_priority)
        .unwrap_or(DEFAULT_PRIORITY)
}

/// Parse an interval table field, falling back to the default.
pub fn parse_interval(field: &str) -> f64 {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(valid_interval)
        .unwrap_or(DEFAULT_INTERVAL)
}

/// Parse an ISO date table field, falling back to the epoch sentinel.
pub fn parse_due(field: &str) -> NaiveDate {
    NaiveDate::parse_from_str(field.trim(), "%Y-%m-%d").unwrap_or_else(|_| dates::epoch())
}

/// Round to two decimal places, the precision priorities are stored at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Shortest decimal form of a stored number (`30` not `30.0`).
pub fn format_number(value: f64) -> String {
    if value == value.trunc() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
