//! Queue-wide defaults
//!
//! Threaded explicitly into `QueueManager` and the bulk adder; nothing in
//! the crate reads ambient state.

use serde::{Deserialize, Serialize};

use crate::queue::scheduler::SchedulerKind;

/// Immutable defaults for queue construction and field validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueSettings {
    /// Priority assigned when a field is missing or malformed
    #[serde(default = "default_priority")]
    pub default_priority: f64,
    /// Starting interval (days) for new repetitions
    #[serde(default = "default_interval")]
    pub default_interval: f64,
    /// Interval multiplier for interval-growth queues
    #[serde(default = "default_afactor")]
    pub default_afactor: f64,
    /// Scheduler used when a queue document has no config block
    #[serde(default)]
    pub default_scheduler: SchedulerKind,
    /// Folder (relative to the vault root) where queue documents live
    #[serde(default = "default_queue_folder")]
    pub queue_folder: String,
    /// Default queue document name, without extension
    #[serde(default = "default_queue_file")]
    pub queue_file: String,
}

fn default_priority() -> f64 {
    30.0
}

fn default_interval() -> f64 {
    1.0
}

fn default_afactor() -> f64 {
    2.0
}

fn default_queue_folder() -> String {
    "IW-Queues".to_string()
}

fn default_queue_file() -> String {
    "IW-Queue".to_string()
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            default_priority: default_priority(),
            default_interval: default_interval(),
            default_afactor: default_afactor(),
            default_scheduler: SchedulerKind::default(),
            queue_folder: default_queue_folder(),
            queue_file: default_queue_file(),
        }
    }
}

impl QueueSettings {
    /// Default queue document path relative to the vault root.
    pub fn default_queue_path(&self) -> String {
        format!("{}/{}.md", self.queue_folder, self.queue_file)
    }
}
