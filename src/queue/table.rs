//! The queue document: a markdown table plus a scheduler config block
//!
//! Format, line-oriented:
//!
//! ```text
//! ---
//! scheduler: afactor
//! afactor: 2.0
//! interval: 1.0
//! ---
//! | Link | Priority | Notes | Interval | Next Rep Date |
//! |------|----------|-------|----------|---------------|
//! | [[Note]] | 30 | first pass | 1 | 2024-06-01 |
//! ```
//!
//! Priority-spread documents drop the interval and date columns. Parsing
//! never fails: malformed numeric and date fields fall back to documented
//! defaults so one bad row can't take the queue down.

use chrono::NaiveDate;

use super::models::{format_number, parse_due, parse_interval, parse_priority, sanitize_notes, Rep};
use super::scheduler::{Scheduler, SchedulerKind};
use crate::links;
use crate::settings::QueueSettings;
use crate::vault::LinkResolver;

const AFACTOR_HEADER: &str = "| Link | Priority | Notes | Interval | Next Rep Date |\n\
                              |------|----------|-------|----------|---------------|";
const SIMPLE_HEADER: &str = "| Link | Priority | Notes |\n\
                             |------|----------|-------|";

/// In-memory view of one persisted queue document.
#[derive(Debug, Clone)]
pub struct ReviewTable {
    scheduler: Scheduler,
    reps: Vec<Rep>,
}

impl ReviewTable {
    pub fn new(scheduler: Scheduler) -> Self {
        Self {
            scheduler,
            reps: Vec::new(),
        }
    }

    // ==================== Parse / serialize ====================

    /// Parse a queue document. A missing config block falls back to the
    /// settings default scheduler.
    pub fn parse(text: &str, settings: &QueueSettings) -> Self {
        let (config, body) = split_config_block(text);
        let scheduler = match config {
            Some(yaml) => Scheduler::from_config_yaml(yaml, settings),
            None => Scheduler::from_kind(settings.default_scheduler, settings),
        };

        let mut table = Self::new(scheduler);
        let data_lines = body
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .skip(2); // column names + separator

        // Rows bypass `add_rep`: re-running the priority spread while
        // loading would rewrite priorities the document already holds.
        for line in data_lines {
            if let Some(rep) = table.parse_row(line) {
                table.reps.push(rep);
            }
        }
        table
    }

    fn parse_row(&self, line: &str) -> Option<Rep> {
        if !line.starts_with('|') {
            return None;
        }
        let fields: Vec<&str> = line
            .trim_matches('|')
            .split('|')
            .map(str::trim)
            .collect();
        let link = fields.first().copied().unwrap_or_default();
        if link.is_empty() {
            return None;
        }

        let priority = parse_priority(fields.get(1).copied().unwrap_or_default());
        let notes = sanitize_notes(fields.get(2).copied().unwrap_or_default());
        let (interval, due) = match self.scheduler.kind() {
            SchedulerKind::Simple => (1.0, None),
            SchedulerKind::AFactor => (
                parse_interval(fields.get(3).copied().unwrap_or_default()),
                Some(parse_due(fields.get(4).copied().unwrap_or_default())),
            ),
        };
        Some(Rep::new(link, priority, &notes, interval, due))
    }

    /// Serialize in current array order. The canonical policy is
    /// sort-then-serialize; `QueueManager` sorts before every persist.
    pub fn serialize(&self) -> String {
        let mut out = String::new();
        out.push_str("---\n");
        out.push_str(&self.scheduler.config_yaml());
        out.push_str("---\n");
        out.push_str(self.header());
        out.push('\n');
        for rep in &self.reps {
            out.push_str(&self.format_row(rep));
            out.push('\n');
        }
        out
    }

    fn header(&self) -> &'static str {
        match self.scheduler.kind() {
            SchedulerKind::Simple => SIMPLE_HEADER,
            SchedulerKind::AFactor => AFACTOR_HEADER,
        }
    }

    fn format_row(&self, rep: &Rep) -> String {
        match self.scheduler.kind() {
            SchedulerKind::Simple => format!(
                "| {} | {} | {} |",
                rep.link,
                format_number(rep.priority),
                rep.notes
            ),
            SchedulerKind::AFactor => format!(
                "| {} | {} | {} | {} | {} |",
                rep.link,
                format_number(rep.priority),
                rep.notes,
                format_number(rep.interval),
                rep.due.format("%Y-%m-%d")
            ),
        }
    }

    /// The text a freshly created queue document gets.
    pub fn initial_text(scheduler: Scheduler) -> String {
        Self::new(scheduler).serialize()
    }

    // ==================== Mutation ====================

    /// Insert a rep through the active scheduler (priority-spread queues
    /// renumber all priorities on insertion).
    pub fn add_rep(&mut self, rep: Rep) {
        self.scheduler.insert(&mut self.reps, rep);
    }

    /// Re-insert a completed rep with recomputed scheduling fields.
    pub fn schedule_completed(&mut self, rep: Rep, today: NaiveDate) {
        self.scheduler.schedule(&mut self.reps, rep, today);
    }

    /// Drop reps whose target note no longer exists; returns how many were
    /// removed so the caller knows whether to persist.
    pub fn remove_stale(&mut self, resolver: &dyn LinkResolver, context: &str) -> usize {
        let before = self.reps.len();
        self.reps.retain(|rep| {
            let keep = resolver.note_exists(&rep.link, context);
            if !keep {
                log::debug!("Removing stale repetition: {}", rep.link);
            }
            keep
        });
        before - self.reps.len()
    }

    // ==================== Queries ====================

    pub fn has_rep_with_link(&self, link: &str) -> bool {
        self.reps.iter().any(|rep| links::links_match(&rep.link, link))
    }

    pub fn reps(&self) -> &[Rep] {
        &self.reps
    }

    pub fn len(&self) -> usize {
        self.reps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reps.is_empty()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_rep_due(&self, rep: &Rep, today: NaiveDate) -> bool {
        self.scheduler.is_rep_due(rep, today)
    }

    /// Sort for review and return the only handle that exposes
    /// current/next reads, so stale-order reads are unrepresentable.
    pub fn sorted(&mut self, today: NaiveDate) -> SortedView<'_> {
        let scheduler = self.scheduler.clone();
        scheduler.sort(&mut self.reps, today);
        SortedView { table: self }
    }
}

/// Review-ordered view over a table. Holding the view pins the order;
/// `current` and `next` are the first two entries.
pub struct SortedView<'a> {
    table: &'a mut ReviewTable,
}

impl SortedView<'_> {
    pub fn current(&self) -> Option<&Rep> {
        self.table.reps.first()
    }

    pub fn next(&self) -> Option<&Rep> {
        self.table.reps.get(1)
    }

    pub fn current_mut(&mut self) -> Option<&mut Rep> {
        self.table.reps.first_mut()
    }

    /// Pop the current rep off the front of the table.
    pub fn remove_current(&mut self) -> Option<Rep> {
        if self.table.reps.is_empty() {
            None
        } else {
            Some(self.table.reps.remove(0))
        }
    }
}

fn split_config_block(text: &str) -> (Option<&str>, &str) {
    let rest = match text.strip_prefix("---") {
        Some(rest) => rest,
        None => return (None, text),
    };
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    match rest.find("\n---") {
        Some(end) => {
            let config = &rest[..end + 1];
            let body = &rest[end + 4..];
            (Some(config), body.strip_prefix('\n').unwrap_or(body))
        }
        None => (None, text),
    }
}
