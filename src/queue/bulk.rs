//! Batch distribution
//!
//! Adding many links at once spreads priorities and first-review dates
//! linearly across the batch, skipping links the queue already holds. The
//! output feeds `QueueManager::add`, which re-runs its own per-item checks;
//! that duplication is intentional defense in depth.

use chrono::NaiveDate;
use thiserror::Error;

use super::models::{round2, valid_priority, Rep};
use super::table::ReviewTable;
use crate::dates;
use crate::links;

#[derive(Error, Debug, PartialEq)]
pub enum BulkError {
    #[error("Invalid priority range: {min} ..= {max}")]
    InvalidPriorityRange { min: f64, max: f64 },

    #[error("Invalid date range: {min} ..= {max}")]
    InvalidDateRange { min: NaiveDate, max: NaiveDate },
}

pub type Result<T> = std::result::Result<T, BulkError>;

/// Build one rep per link not already present in `table`, with linearly
/// interpolated priority and due date. Dates step cumulatively: the first
/// rep lands one step after `date_min`, the last lands on `date_max`.
pub fn distribute(
    table: &ReviewTable,
    link_targets: &[String],
    priority_range: (f64, f64),
    date_range: (NaiveDate, NaiveDate),
) -> Result<Vec<Rep>> {
    let (pri_min, pri_max) = priority_range;
    if valid_priority(pri_min).is_none() || valid_priority(pri_max).is_none() || pri_min > pri_max {
        return Err(BulkError::InvalidPriorityRange {
            min: pri_min,
            max: pri_max,
        });
    }

    let (date_min, date_max) = date_range;
    if date_min > date_max {
        return Err(BulkError::InvalidDateRange {
            min: date_min,
            max: date_max,
        });
    }

    let to_add: Vec<&String> = link_targets
        .iter()
        .filter(|link| !table.has_rep_with_link(link))
        .collect();
    if to_add.is_empty() {
        log::debug!("Nothing to add (excluding duplicates).");
        return Ok(Vec::new());
    }

    let count = to_add.len();
    let pri_step = (pri_max - pri_min) / count as f64;
    let date_step = dates::days_between(date_min, date_max) as f64 / count.max(1) as f64;

    let reps = to_add
        .into_iter()
        .enumerate()
        .map(|(i, link)| {
            let priority = round2(pri_min + i as f64 * pri_step);
            let offset = ((i + 1) as f64 * date_step).round() as i64;
            let due = dates::add_days(date_min, offset);
            Rep::new(links::add_brackets(link), priority, "", 1.0, Some(due))
        })
        .collect();
    Ok(reps)
}
