//! melete — incremental review queue engine for markdown note vaults
//!
//! A queue is one persisted, human-readable markdown table of
//! "repetitions": links to notes (or blocks) the user wants to revisit,
//! each with a priority, an optional note, and — for interval-growth
//! queues — a review interval and a due date. The engine owns the
//! document format, the two scheduling strategies, due/next selection,
//! stale-link garbage collection, and batch distribution. Everything
//! else (UI, date pickers, the host editor) stays behind the `vault`
//! collaborator traits.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use melete::queue::QueueManager;
//! use melete::settings::QueueSettings;
//! use melete::vault::{FileVault, LogNavigator};
//!
//! let vault = Arc::new(FileVault::new("/path/to/vault".into()));
//! let settings = QueueSettings::default();
//! let queue_path = settings.default_queue_path();
//! let queue = QueueManager::new(
//!     vault.clone(),
//!     vault.clone(),
//!     Arc::new(LogNavigator),
//!     settings,
//!     queue_path,
//! );
//! queue.advance()?;
//! # Ok::<(), melete::queue::QueueError>(())
//! ```

pub mod blocks;
pub mod dates;
pub mod links;
pub mod queue;
pub mod settings;
pub mod vault;

pub use queue::{QueueManager, Rep, ReviewTable, Scheduler, SchedulerKind};
pub use settings::QueueSettings;
