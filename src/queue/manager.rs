//! Queue orchestration
//!
//! Every operation is one read-modify-write pass over the queue document:
//! load the whole table, mutate it in memory, write the whole table back.
//! There is no partial write and no locking; the design assumes a single
//! in-flight operation per document. Empty or missing queues are ordinary
//! outcomes, not errors — operations report them as typed outcome values
//! and the embedder turns those into user-visible notices.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;

use super::bulk::{self, BulkError};
use super::models::{round2, Rep};
use super::scheduler::Scheduler;
use super::table::ReviewTable;
use crate::settings::QueueSettings;
use crate::vault::{DocumentStore, LinkResolver, Navigator, VaultError};

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Bulk(#[from] BulkError),
}

pub type Result<T> = std::result::Result<T, QueueError>;

/// Result of `advance`.
#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    /// Navigated to this rep
    Loaded(Rep),
    /// The queue has reps, but none is due
    NothingDue,
    /// The queue is missing or empty
    QueueEmpty,
}

/// Result of `dismiss_current`.
#[derive(Debug, Clone, PartialEq)]
pub enum DismissOutcome {
    Dismissed(Rep),
    NothingDue,
    QueueEmpty,
}

/// Why an item in an `add` batch was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A rep with the same normalized link already exists
    Duplicate,
    /// The link or notes field contains the column delimiter
    Delimiter,
}

/// Per-item report for an `add` batch.
#[derive(Debug, Clone, Default)]
pub struct AddReport {
    pub added: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Orchestrates one queue document's lifecycle against the vault.
pub struct QueueManager {
    store: Arc<dyn DocumentStore>,
    resolver: Arc<dyn LinkResolver>,
    navigator: Arc<dyn Navigator>,
    settings: QueueSettings,
    queue_path: String,
    today_override: Option<NaiveDate>,
}

impl QueueManager {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn LinkResolver>,
        navigator: Arc<dyn Navigator>,
        settings: QueueSettings,
        queue_path: impl Into<String>,
    ) -> Self {
        Self {
            store,
            resolver,
            navigator,
            settings,
            queue_path: queue_path.into(),
            today_override: None,
        }
    }

    /// Pin "today" for deterministic scheduling in tests.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today_override = Some(today);
        self
    }

    pub fn queue_path(&self) -> &str {
        &self.queue_path
    }

    fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    // ==================== Load / persist ====================

    /// Read and parse the queue document. Stale links are garbage-collected
    /// and, if any were removed, the cleaned table is persisted right away
    /// so the on-disk document catches up lazily.
    pub fn load(&self) -> Result<Option<ReviewTable>> {
        let text = match self.store.read(&self.queue_path) {
            Ok(text) => text,
            Err(VaultError::NotFound(_)) => {
                log::debug!("Failed to load queue table: {}", self.queue_path);
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let mut table = ReviewTable::parse(&text, &self.settings);
        let removed = table.remove_stale(self.resolver.as_ref(), &self.queue_path);
        if removed > 0 {
            log::info!("Removed {} repetitions with missing notes", removed);
            self.persist(&mut table)?;
        }
        table.sorted(self.today());
        Ok(Some(table))
    }

    /// Sort, then write the whole document back.
    fn persist(&self, table: &mut ReviewTable) -> Result<()> {
        table.sorted(self.today());
        self.store.write(&self.queue_path, &table.serialize())?;
        Ok(())
    }

    fn ensure_queue_exists(&self) -> Result<()> {
        let scheduler = Scheduler::from_kind(self.settings.default_scheduler, &self.settings);
        self.store
            .create_if_not_exists(&self.queue_path, &ReviewTable::initial_text(scheduler))?;
        Ok(())
    }

    // ==================== Review operations ====================

    /// Remove the current rep without rescheduling it.
    pub fn dismiss_current(&self) -> Result<DismissOutcome> {
        let mut table = match self.load()? {
            Some(table) if !table.is_empty() => table,
            _ => {
                log::debug!("No repetitions!");
                return Ok(DismissOutcome::QueueEmpty);
            }
        };

        let today = self.today();
        let scheduler = table.scheduler().clone();
        let current = {
            let mut view = table.sorted(today);
            let current = match view.current() {
                Some(current) => current.clone(),
                None => return Ok(DismissOutcome::QueueEmpty),
            };
            if !scheduler.is_rep_due(&current, today) {
                log::debug!("No due repetition to dismiss.");
                return Ok(DismissOutcome::NothingDue);
            }
            view.remove_current();
            current
        };

        self.persist(&mut table)?;
        log::info!(
            "Dismissed repetition: {}",
            self.resolver.display_link(&current.link)
        );
        Ok(DismissOutcome::Dismissed(current))
    }

    /// Open the current rep's note, if one is due.
    pub fn go_to_current(&self) -> Result<Option<Rep>> {
        let mut table = match self.load()? {
            Some(table) if !table.is_empty() => table,
            _ => {
                log::info!("No more repetitions!");
                return Ok(None);
            }
        };

        let today = self.today();
        let scheduler = table.scheduler().clone();
        let view = table.sorted(today);
        match view.current() {
            Some(current) if scheduler.is_rep_due(current, today) => {
                let current = current.clone();
                self.open_rep(&current);
                Ok(Some(current))
            }
            _ => {
                log::info!("No more repetitions!");
                Ok(None)
            }
        }
    }

    /// Complete the current repetition: reschedule it through the table's
    /// strategy and move on to the next due rep.
    pub fn advance(&self) -> Result<AdvanceOutcome> {
        let mut table = match self.load()? {
            Some(table) if !table.is_empty() => table,
            _ => {
                log::info!("No more repetitions!");
                return Ok(AdvanceOutcome::QueueEmpty);
            }
        };

        let today = self.today();
        let scheduler = table.scheduler().clone();
        let (current, next) = {
            let mut view = table.sorted(today);
            let current = match view.current() {
                Some(current) => current.clone(),
                None => return Ok(AdvanceOutcome::QueueEmpty),
            };
            if !scheduler.is_rep_due(&current, today) {
                log::info!("No more repetitions!");
                return Ok(AdvanceOutcome::NothingDue);
            }
            let next = view.next().cloned();
            view.remove_current();
            (current, next)
        };

        table.schedule_completed(current, today);

        // Both strategies append the completed rep, so its just-updated
        // self is the last array entry; it is the fallback when there is
        // no due next rep.
        let candidate = match next {
            Some(next) if scheduler.is_rep_due(&next, today) => Some(next),
            _ => table.reps().last().cloned(),
        };

        let outcome = match candidate {
            Some(rep) if scheduler.is_rep_due(&rep, today) => {
                self.open_rep(&rep);
                AdvanceOutcome::Loaded(rep)
            }
            _ => {
                log::info!("No more repetitions!");
                AdvanceOutcome::NothingDue
            }
        };

        // The table changed in the scheduling step regardless of where
        // navigation landed.
        self.persist(&mut table)?;
        Ok(outcome)
    }

    /// Nudge the current rep's priority by `delta`, clamped to `[0, 100]`.
    /// Returns the stored priority.
    pub fn change_priority(&self, delta: f64) -> Result<Option<f64>> {
        let mut table = match self.load()? {
            Some(table) if !table.is_empty() => table,
            _ => {
                log::debug!("No repetitions!");
                return Ok(None);
            }
        };

        let today = self.today();
        let new_priority = {
            let mut view = table.sorted(today);
            match view.current_mut() {
                Some(current) => {
                    current.priority = round2((current.priority + delta).clamp(0.0, 100.0));
                    current.priority
                }
                None => return Ok(None),
            }
        };

        self.persist(&mut table)?;
        log::info!("Updated priority: {}", new_priority);
        Ok(Some(new_priority))
    }

    // ==================== Adding ====================

    /// Add a batch of reps, creating the queue document if it doesn't
    /// exist. Each item is checked again here even when it came from the
    /// bulk distributor; the duplication is intentional.
    pub fn add(&self, reps: Vec<Rep>) -> Result<AddReport> {
        self.ensure_queue_exists()?;
        let mut table = match self.load()? {
            Some(table) => table,
            None => ReviewTable::new(Scheduler::from_kind(
                self.settings.default_scheduler,
                &self.settings,
            )),
        };

        let mut report = AddReport::default();
        for rep in reps {
            let display = self.resolver.display_link(&rep.link);
            if rep.link.contains('|') || rep.link.contains('\n') || rep.notes.contains('|') {
                log::debug!("Invalid link or notes (contains delimiter): {}", display);
                report.skipped.push((rep.link, SkipReason::Delimiter));
                continue;
            }
            if table.has_rep_with_link(&rep.link) {
                log::debug!("Already in your queue: {}", display);
                report.skipped.push((rep.link, SkipReason::Duplicate));
                continue;
            }
            log::info!("Added to queue: {}", display);
            report.added.push(rep.link.clone());
            table.add_rep(rep);
        }

        if !report.added.is_empty() {
            self.persist(&mut table)?;
        }
        Ok(report)
    }

    /// Distribute priorities and dates across a batch of link targets,
    /// then add the result.
    pub fn add_bulk(
        &self,
        link_targets: &[String],
        priority_range: (f64, f64),
        date_range: (NaiveDate, NaiveDate),
    ) -> Result<AddReport> {
        self.ensure_queue_exists()?;
        let table = match self.load()? {
            Some(table) => table,
            None => ReviewTable::new(Scheduler::from_kind(
                self.settings.default_scheduler,
                &self.settings,
            )),
        };
        let reps = bulk::distribute(&table, link_targets, priority_range, date_range)?;
        self.add(reps)
    }

    // ==================== Navigation ====================

    /// Open the queue document itself, creating it if missing.
    pub fn open_queue(&self) -> Result<()> {
        self.ensure_queue_exists()?;
        self.navigator.open_link(&self.queue_path);
        Ok(())
    }

    fn open_rep(&self, rep: &Rep) {
        log::info!(
            "Loading repetition: {}",
            self.resolver.display_link(&rep.link)
        );
        self.navigator.open_link(&rep.link);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::scheduler::SchedulerKind;
    use crate::vault::MemoryVault;
    use std::sync::Mutex;

    struct RecordingNavigator {
        opened: Mutex<Vec<String>>,
    }

    impl RecordingNavigator {
        fn new() -> Self {
            Self {
                opened: Mutex::new(Vec::new()),
            }
        }

        fn opened(&self) -> Vec<String> {
            self.opened.lock().unwrap().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn open_link(&self, link: &str) {
            self.opened.lock().unwrap().push(link.to_string());
        }
    }

    struct Fixture {
        vault: Arc<MemoryVault>,
        navigator: Arc<RecordingNavigator>,
        manager: QueueManager,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 5, 10)
    }

    fn fixture(kind: SchedulerKind) -> Fixture {
        let vault = Arc::new(MemoryVault::new());
        let navigator = Arc::new(RecordingNavigator::new());
        let settings = QueueSettings {
            default_scheduler: kind,
            ..QueueSettings::default()
        };
        let manager = QueueManager::new(
            vault.clone(),
            vault.clone(),
            navigator.clone(),
            settings,
            "queue.md",
        )
        .with_today(today());
        Fixture {
            vault,
            navigator,
            manager,
        }
    }

    fn note(fixture: &Fixture, name: &str) {
        fixture
            .vault
            .write(&format!("{}.md", name), "content")
            .unwrap();
    }

    fn afactor_doc(rows: &str) -> String {
        format!(
            "---\nscheduler: afactor\nafactor: 2.0\ninterval: 1.0\n---\n\
             | Link | Priority | Notes | Interval | Next Rep Date |\n\
             |------|----------|-------|----------|---------------|\n{}",
            rows
        )
    }

    // ==================== advance ====================

    #[test]
    fn advance_reschedules_and_navigates_to_next() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        note(&f, "B");
        f.vault
            .write(
                "queue.md",
                &afactor_doc("| [[A]] | 10 |  | 1 | 2024-05-10 |\n| [[B]] | 20 |  | 1 | 2024-05-01 |\n"),
            )
            .unwrap();

        let outcome = f.manager.advance().unwrap();
        match outcome {
            AdvanceOutcome::Loaded(rep) => assert_eq!(rep.link, "[[B]]"),
            other => panic!("expected Loaded, got {:?}", other),
        }
        assert_eq!(f.navigator.opened(), vec!["[[B]]".to_string()]);

        // A was rescheduled: due tomorrow, interval doubled.
        let text = f.vault.read("queue.md").unwrap();
        assert!(text.contains("| [[A]] | 10 |  | 2 | 2024-05-11 |"));
        assert!(text.contains("| [[B]] | 20 |  | 1 | 2024-05-01 |"));
    }

    #[test]
    fn advance_sole_rep_reschedules_and_reports_nothing_due() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        f.vault
            .write("queue.md", &afactor_doc("| [[A]] | 10 |  | 1 | 2024-05-10 |\n"))
            .unwrap();

        let outcome = f.manager.advance().unwrap();
        assert_eq!(outcome, AdvanceOutcome::NothingDue);
        assert!(f.navigator.opened().is_empty());

        let text = f.vault.read("queue.md").unwrap();
        assert!(text.contains("| [[A]] | 10 |  | 2 | 2024-05-11 |"));
    }

    #[test]
    fn advance_not_due_mutates_nothing() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        let doc = afactor_doc("| [[A]] | 10 |  | 1 | 2024-06-01 |\n");
        f.vault.write("queue.md", &doc).unwrap();

        let outcome = f.manager.advance().unwrap();
        assert_eq!(outcome, AdvanceOutcome::NothingDue);
        assert_eq!(f.vault.read("queue.md").unwrap(), doc);
    }

    #[test]
    fn advance_empty_or_missing_queue() {
        let f = fixture(SchedulerKind::AFactor);
        assert_eq!(f.manager.advance().unwrap(), AdvanceOutcome::QueueEmpty);

        f.vault.write("queue.md", &afactor_doc("")).unwrap();
        assert_eq!(f.manager.advance().unwrap(), AdvanceOutcome::QueueEmpty);
    }

    #[test]
    fn advance_simple_queue_cycles_reps() {
        let f = fixture(SchedulerKind::Simple);
        note(&f, "A");
        note(&f, "B");
        f.manager
            .add(vec![
                Rep::new("[[A]]", 30.0, "", 1.0, None),
                Rep::new("[[B]]", 30.0, "", 1.0, None),
            ])
            .unwrap();

        // A is current (49.95 < 99.9); advancing cycles to B and swaps
        // the spread.
        let outcome = f.manager.advance().unwrap();
        match outcome {
            AdvanceOutcome::Loaded(rep) => assert_eq!(rep.link, "[[B]]"),
            other => panic!("expected Loaded, got {:?}", other),
        }
        let text = f.vault.read("queue.md").unwrap();
        assert!(text.contains("| [[B]] | 49.95 |  |"));
        assert!(text.contains("| [[A]] | 99.9 |  |"));
    }

    // ==================== dismiss ====================

    #[test]
    fn dismiss_removes_due_current() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        note(&f, "B");
        f.vault
            .write(
                "queue.md",
                &afactor_doc("| [[A]] | 10 |  | 1 | 2024-05-01 |\n| [[B]] | 20 |  | 1 | 2024-05-01 |\n"),
            )
            .unwrap();

        match f.manager.dismiss_current().unwrap() {
            DismissOutcome::Dismissed(rep) => assert_eq!(rep.link, "[[A]]"),
            other => panic!("expected Dismissed, got {:?}", other),
        }
        let text = f.vault.read("queue.md").unwrap();
        assert!(!text.contains("[[A]]"));
        assert!(text.contains("[[B]]"));
    }

    #[test]
    fn dismiss_future_current_is_a_noop_on_disk() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        let doc = afactor_doc("| [[A]] | 10 |  | 1 | 2024-06-01 |\n");
        f.vault.write("queue.md", &doc).unwrap();

        assert_eq!(
            f.manager.dismiss_current().unwrap(),
            DismissOutcome::NothingDue
        );
        assert_eq!(f.vault.read("queue.md").unwrap(), doc);
    }

    #[test]
    fn dismiss_empty_queue() {
        let f = fixture(SchedulerKind::AFactor);
        assert_eq!(
            f.manager.dismiss_current().unwrap(),
            DismissOutcome::QueueEmpty
        );
    }

    // ==================== go_to_current ====================

    #[test]
    fn go_to_current_opens_due_rep() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        f.vault
            .write("queue.md", &afactor_doc("| [[A]] | 10 |  | 1 | 2024-05-01 |\n"))
            .unwrap();

        let rep = f.manager.go_to_current().unwrap().unwrap();
        assert_eq!(rep.link, "[[A]]");
        assert_eq!(f.navigator.opened(), vec!["[[A]]".to_string()]);
    }

    #[test]
    fn go_to_current_nothing_due() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        f.vault
            .write("queue.md", &afactor_doc("| [[A]] | 10 |  | 1 | 2024-06-01 |\n"))
            .unwrap();

        assert!(f.manager.go_to_current().unwrap().is_none());
        assert!(f.navigator.opened().is_empty());
    }

    // ==================== change_priority ====================

    #[test]
    fn change_priority_clamps_to_bounds() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        f.vault
            .write("queue.md", &afactor_doc("| [[A]] | 50 |  | 1 | 2024-05-01 |\n"))
            .unwrap();

        assert_eq!(f.manager.change_priority(1000.0).unwrap(), Some(100.0));
        assert_eq!(f.manager.change_priority(-1000.0).unwrap(), Some(0.0));
        assert_eq!(f.manager.change_priority(0.1).unwrap(), Some(0.1));

        let text = f.vault.read("queue.md").unwrap();
        assert!(text.contains("| [[A]] | 0.1 |  | 1 | 2024-05-01 |"));
    }

    #[test]
    fn change_priority_on_empty_queue() {
        let f = fixture(SchedulerKind::AFactor);
        assert_eq!(f.manager.change_priority(5.0).unwrap(), None);
    }

    // ==================== add ====================

    #[test]
    fn add_creates_queue_document_with_config() {
        let f = fixture(SchedulerKind::Simple);
        note(&f, "A");
        let report = f
            .manager
            .add(vec![Rep::new("[[A]]", 30.0, "", 1.0, None)])
            .unwrap();

        assert_eq!(report.added, vec!["[[A]]".to_string()]);
        let text = f.vault.read("queue.md").unwrap();
        assert!(text.starts_with("---\nscheduler: simple\n---\n"));
        // A sole rep in a priority-spread queue lands at the ceiling.
        assert!(text.contains("| [[A]] | 99.9 |  |"));
    }

    #[test]
    fn add_second_rep_respreads_priorities() {
        let f = fixture(SchedulerKind::Simple);
        note(&f, "A");
        note(&f, "B");
        f.manager
            .add(vec![Rep::new("[[A]]", 30.0, "", 1.0, None)])
            .unwrap();
        f.manager
            .add(vec![Rep::new("[[B]]", 30.0, "", 1.0, None)])
            .unwrap();

        let text = f.vault.read("queue.md").unwrap();
        assert!(text.contains("| [[A]] | 49.95 |  |"));
        assert!(text.contains("| [[B]] | 99.9 |  |"));
    }

    #[test]
    fn add_skips_duplicates_and_delimiters_but_keeps_going() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "A");
        note(&f, "B");
        f.manager
            .add(vec![Rep::new("[[A]]", 30.0, "", 1.0, None)])
            .unwrap();

        let report = f
            .manager
            .add(vec![
                Rep::new("A", 30.0, "", 1.0, None), // same link, no brackets
                Rep::new("[[Bad|Pipe]]", 30.0, "", 1.0, None),
                Rep::new("[[B]]", 30.0, "", 1.0, None),
            ])
            .unwrap();

        assert_eq!(report.added, vec!["[[B]]".to_string()]);
        assert_eq!(
            report.skipped,
            vec![
                ("A".to_string(), SkipReason::Duplicate),
                ("[[Bad|Pipe]]".to_string(), SkipReason::Delimiter),
            ]
        );

        let text = f.vault.read("queue.md").unwrap();
        assert_eq!(text.matches("[[A]]").count(), 1);
        assert!(text.contains("[[B]]"));
        assert!(!text.contains("Bad"));
    }

    #[test]
    fn add_bulk_distributes_and_persists() {
        let f = fixture(SchedulerKind::AFactor);
        for n in ["X", "Y", "Z"] {
            note(&f, n);
        }
        let report = f
            .manager
            .add_bulk(
                &["X".to_string(), "Y".to_string(), "Z".to_string()],
                (0.0, 90.0),
                (date(2024, 5, 10), date(2024, 5, 13)),
            )
            .unwrap();

        assert_eq!(report.added.len(), 3);
        let text = f.vault.read("queue.md").unwrap();
        assert!(text.contains("| [[X]] | 0 |  | 1 | 2024-05-11 |"));
        assert!(text.contains("| [[Y]] | 30 |  | 1 | 2024-05-12 |"));
        assert!(text.contains("| [[Z]] | 60 |  | 1 | 2024-05-13 |"));
    }

    #[test]
    fn add_bulk_rejects_bad_priority_range() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "X");
        let err = f
            .manager
            .add_bulk(
                &["X".to_string()],
                (90.0, 10.0),
                (date(2024, 5, 10), date(2024, 5, 11)),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            QueueError::Bulk(BulkError::InvalidPriorityRange { .. })
        ));
    }

    // ==================== load / GC ====================

    #[test]
    fn load_garbage_collects_and_persists() {
        let f = fixture(SchedulerKind::AFactor);
        note(&f, "Kept");
        f.vault
            .write(
                "queue.md",
                &afactor_doc(
                    "| [[Kept]] | 10 |  | 1 | 2024-05-01 |\n| [[Gone]] | 20 |  | 1 | 2024-05-01 |\n",
                ),
            )
            .unwrap();

        let table = f.manager.load().unwrap().unwrap();
        assert_eq!(table.len(), 1);

        // The cleaned table hit the disk even though nothing else ran.
        let text = f.vault.read("queue.md").unwrap();
        assert!(!text.contains("[[Gone]]"));
        assert!(text.contains("[[Kept]]"));
    }

    #[test]
    fn load_missing_document_is_none() {
        let f = fixture(SchedulerKind::AFactor);
        assert!(f.manager.load().unwrap().is_none());
    }

    // ==================== open_queue ====================

    #[test]
    fn open_queue_creates_then_navigates() {
        let f = fixture(SchedulerKind::AFactor);
        f.manager.open_queue().unwrap();
        assert!(f.vault.exists("queue.md"));
        assert_eq!(f.navigator.opened(), vec!["queue.md".to_string()]);
    }
}
