//! Repetition queue engine
//!
//! This module provides:
//! - The `Rep` row model and its validation defaults
//! - `ReviewTable`: the persisted markdown-table document format
//! - The two scheduling strategies (priority-spread and interval-growth)
//! - `QueueManager`: whole-document operations (advance, dismiss, add, …)
//! - Batch distribution of priorities and dates over a set of links

pub mod bulk;
pub mod manager;
pub mod models;
pub mod scheduler;
pub mod table;

pub use bulk::{distribute, BulkError};
pub use manager::{
    AddReport, AdvanceOutcome, DismissOutcome, QueueError, QueueManager, SkipReason,
};
pub use models::Rep;
pub use scheduler::{Scheduler, SchedulerKind};
pub use table::{ReviewTable, SortedView};
