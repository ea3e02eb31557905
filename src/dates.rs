//! Date parsing and day arithmetic
//!
//! Queue documents carry ISO `YYYY-MM-DD` dates. User-facing entry points
//! also accept natural-language phrases ("tomorrow", "in 3 days") through
//! an optional capability, so the engine itself never depends on a
//! natural-language library.

use chrono::{Duration, NaiveDate};
use regex::Regex;

/// Epoch sentinel used when a date field is missing or malformed.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

/// Whole days from `from` to `to` (negative if `to` is earlier).
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Optional natural-language date capability.
///
/// Implementations resolve phrases relative to their own notion of "today";
/// returning `None` falls through to the next parser.
pub trait NaturalDateSource {
    fn parse(&self, input: &str) -> Option<NaiveDate>;
}

/// ISO-first date parser with an optional natural-language fallback.
pub struct DateParser {
    natural: Option<Box<dyn NaturalDateSource>>,
}

impl DateParser {
    pub fn new() -> Self {
        Self { natural: None }
    }

    pub fn with_natural_source(source: Box<dyn NaturalDateSource>) -> Self {
        Self {
            natural: Some(source),
        }
    }

    /// Parse strict ISO first, then the natural-language capability.
    pub fn parse(&self, input: &str) -> Option<NaiveDate> {
        let input = input.trim();
        if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
            return Some(date);
        }
        self.natural.as_ref().and_then(|n| n.parse(input))
    }
}

impl Default for DateParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in relative-phrase source: today, tomorrow, yesterday,
/// "in N days|weeks|months".
pub struct RelativeDateSource {
    today: NaiveDate,
}

impl RelativeDateSource {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl NaturalDateSource for RelativeDateSource {
    fn parse(&self, input: &str) -> Option<NaiveDate> {
        let input = input.trim().to_lowercase();
        match input.as_str() {
            "today" | "now" => return Some(self.today),
            "tomorrow" => return Some(add_days(self.today, 1)),
            "yesterday" => return Some(add_days(self.today, -1)),
            _ => {}
        }

        let re = Regex::new(r"^in (\d+) (day|week|month)s?$").unwrap();
        let caps = re.captures(&input)?;
        let count: i64 = caps[1].parse().ok()?;
        let days = match &caps[2] {
            "day" => count,
            "week" => count * 7,
            "month" => count * 30,
            _ => return None,
        };
        Some(add_days(self.today, days))
    }
}
