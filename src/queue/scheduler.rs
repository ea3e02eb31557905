//! Scheduling strategies
//!
//! A queue document names its scheduler in the config block, so the
//! document is self-describing. The two strategies are a tagged enum
//! dispatched through `insert` / `schedule` / `sort`; both algorithms are
//! pure over the rep array, which keeps them unit-testable without a
//! vault.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::models::{round2, Rep};
use crate::dates;
use crate::settings::QueueSettings;

/// Priorities are spread over `(0, 99.9]`, never touching the bounds.
const SPREAD_CEILING: f64 = 99.9;

/// Which strategy a queue document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerKind {
    /// Priority-spread: no due dates, priorities renumbered on every insert
    Simple,
    /// Interval-growth: geometric intervals and future due dates
    #[default]
    AFactor,
}

/// Config block persisted at the top of a queue document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchedulerConfig {
    scheduler: SchedulerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    afactor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    interval: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Scheduler {
    Simple,
    AFactor {
        /// Interval multiplier applied on every completed review
        afactor: f64,
        /// Starting interval (days) for reps the document doesn't specify
        interval: f64,
    },
}

impl Scheduler {
    /// Interval-growth scheduler with validated parameters; out-of-range
    /// values fall back to the defaults (2.0, 1.0).
    pub fn afactor(afactor: f64, interval: f64) -> Self {
        Self::AFactor {
            afactor: valid_growth(afactor).unwrap_or(2.0),
            interval: valid_growth(interval).unwrap_or(1.0),
        }
    }

    pub fn from_kind(kind: SchedulerKind, settings: &QueueSettings) -> Self {
        match kind {
            SchedulerKind::Simple => Self::Simple,
            SchedulerKind::AFactor => {
                Self::afactor(settings.default_afactor, settings.default_interval)
            }
        }
    }

    pub fn kind(&self) -> SchedulerKind {
        match self {
            Self::Simple => SchedulerKind::Simple,
            Self::AFactor { .. } => SchedulerKind::AFactor,
        }
    }

    // ==================== Config block ====================

    /// Parse a config block body (the YAML between the `---` fences).
    /// Malformed config falls back to the settings default, like every
    /// other field in the document format.
    pub fn from_config_yaml(yaml: &str, settings: &QueueSettings) -> Self {
        match serde_yaml::from_str::<SchedulerConfig>(yaml) {
            Ok(config) => match config.scheduler {
                SchedulerKind::Simple => Self::Simple,
                SchedulerKind::AFactor => Self::afactor(
                    config.afactor.unwrap_or(settings.default_afactor),
                    config.interval.unwrap_or(settings.default_interval),
                ),
            },
            Err(err) => {
                log::debug!("Bad scheduler config, using default: {}", err);
                Self::from_kind(settings.default_scheduler, settings)
            }
        }
    }

    /// Config block body for serialization.
    pub fn config_yaml(&self) -> String {
        let config = match *self {
            Self::Simple => SchedulerConfig {
                scheduler: SchedulerKind::Simple,
                afactor: None,
                interval: None,
            },
            Self::AFactor { afactor, interval } => SchedulerConfig {
                scheduler: SchedulerKind::AFactor,
                afactor: Some(afactor),
                interval: Some(interval),
            },
        };
        // Serializing a flat struct of numbers cannot fail.
        serde_yaml::to_string(&config).unwrap_or_default()
    }

    // ==================== Strategy operations ====================

    /// Insert a new rep. Priority-spread queues renumber every priority on
    /// insertion; interval-growth queues keep the rep's own fields.
    pub fn insert(&self, reps: &mut Vec<Rep>, rep: Rep) {
        reps.push(rep);
        if let Self::Simple = self {
            redistribute(reps);
        }
    }

    /// Re-insert a rep whose review was just completed, recomputing its
    /// scheduling fields.
    pub fn schedule(&self, reps: &mut Vec<Rep>, mut rep: Rep, today: NaiveDate) {
        match *self {
            Self::Simple => {
                self.insert(reps, rep);
            }
            Self::AFactor { afactor, .. } => {
                rep.due = dates::add_days(today, rep.interval.round() as i64);
                rep.interval *= afactor;
                reps.push(rep);
            }
        }
    }

    /// Order reps for review. Both strategies sort ascending by priority;
    /// interval-growth additionally moves due reps ahead of not-yet-due
    /// ones in a second stable pass, so each group keeps its priority
    /// order.
    pub fn sort(&self, reps: &mut [Rep], today: NaiveDate) {
        reps.sort_by(priority_cmp);
        if let Self::AFactor { .. } = self {
            reps.sort_by(|a, b| due_first_cmp(a, b, today));
        }
    }

    /// Under priority-spread every rep is always due.
    pub fn is_rep_due(&self, rep: &Rep, today: NaiveDate) -> bool {
        match self {
            Self::Simple => true,
            Self::AFactor { .. } => rep.is_due(today),
        }
    }
}

/// Renumber priorities evenly across `(0, 99.9]` in the array's current
/// order. Deliberately no pre-sort: the pass reflects whatever order the
/// backing array holds.
fn redistribute(reps: &mut [Rep]) {
    let n = reps.len();
    if n == 0 {
        return;
    }
    let step = SPREAD_CEILING / n as f64;
    for (i, rep) in reps.iter_mut().enumerate() {
        rep.priority = round2(step * (i + 1) as f64);
    }
}

fn priority_cmp(a: &Rep, b: &Rep) -> Ordering {
    a.priority.partial_cmp(&b.priority).unwrap_or(Ordering::Equal)
}

fn due_first_cmp(a: &Rep, b: &Rep, today: NaiveDate) -> Ordering {
    match (a.is_due(today), b.is_due(today)) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn valid_growth(value: f64) -> Option<f64> {
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}
