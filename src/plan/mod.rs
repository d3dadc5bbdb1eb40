//! Execution plan derived from a specification.
//!
//! Tasks are generated from specification sections ([`generator`]), linked
//! back to them by derivation path, and reclassified when the specification
//! changes ([`impact`], [`updater`]). Tasks are never deleted; retired work
//! is marked `deprecated`.

pub mod generator;
pub mod impact;
pub mod updater;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use generator::{generate_plan, DataProfile};
pub use impact::{assess_impact, format_impact, ChangeImpact, ImpactReport, PlannedTransition};
pub use updater::{update_plan_from_diff, update_task_status, PlanUpdate};

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Pending,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
    /// Waiting on something outside the plan.
    Blocked,
    /// Was done, but the specification it came from changed.
    NeedsReview,
    /// Not done yet, and its basis changed; regenerate before executing.
    Updated,
    /// Its basis was removed from the specification. Terminal.
    Deprecated,
}

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [TaskStatus; 7] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Blocked,
        TaskStatus::NeedsReview,
        TaskStatus::Updated,
        TaskStatus::Deprecated,
    ];

    /// Snake-case label, as stored.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
            TaskStatus::NeedsReview => "needs_review",
            TaskStatus::Updated => "updated",
            TaskStatus::Deprecated => "deprecated",
        }
    }

    /// Statuses only the plan updater may assign.
    #[must_use]
    pub fn is_reserved(self) -> bool {
        matches!(self, TaskStatus::NeedsReview | TaskStatus::Updated | TaskStatus::Deprecated)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|st| st.as_str() == wanted).ok_or_else(|| {
            let names: Vec<&str> = Self::ALL.iter().map(|st| st.as_str()).collect();
            format!("unknown status '{s}' (expected one of: {})", names.join(", "))
        })
    }
}

/// One recorded status transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Status before.
    pub from: TaskStatus,
    /// Status after.
    pub to: TaskStatus,
    /// When it happened.
    pub at: DateTime<Utc>,
    /// Who or what caused it.
    pub reason: String,
}

/// A unit of work in the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable id (`T001`, `T002`, ...).
    pub id: String,
    /// Phase label, e.g. `discovery` or `modeling`.
    pub phase: String,
    /// What to do.
    pub description: String,
    /// Current status.
    pub status: TaskStatus,
    /// Specification paths the task was derived from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived_from: Vec<String>,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task last changed.
    pub updated_at: DateTime<Utc>,
    /// Append-only status history.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<StatusChange>,
}

impl Task {
    /// Creates a pending task.
    #[must_use]
    pub fn new(
        id: String,
        phase: &str,
        description: String,
        derived_from: Vec<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            phase: phase.to_string(),
            description,
            status: TaskStatus::Pending,
            derived_from,
            created_at: now,
            updated_at: now,
            history: Vec::new(),
        }
    }

    /// Moves to `to`, recording the transition.
    pub(crate) fn transition(&mut self, to: TaskStatus, at: DateTime<Utc>, reason: String) {
        self.history.push(StatusChange { from: self.status, to, at, reason });
        self.status = to;
        self.updated_at = at;
    }
}

/// Tasks derived from one specification version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier.
    pub id: String,
    /// Specification version the plan was generated from or last synced to.
    pub spec_version: u32,
    /// Domain section of the specification; its changes map to its own phase.
    pub domain_section: String,
    /// When the plan was generated.
    pub generated_at: DateTime<Utc>,
    /// Tasks in creation order.
    pub tasks: Vec<Task>,
}

impl Plan {
    /// Finds a task by id.
    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// The id the next created task should get.
    #[must_use]
    pub fn next_task_id(&self) -> String {
        let max = self
            .tasks
            .iter()
            .filter_map(|t| t.id.strip_prefix('T').and_then(|n| n.parse::<u32>().ok()))
            .max()
            .unwrap_or(0);
        task_id(max + 1)
    }

    /// Number of tasks in each status, skipping zero counts.
    #[must_use]
    pub fn status_counts(&self) -> Vec<(TaskStatus, usize)> {
        TaskStatus::ALL
            .into_iter()
            .map(|st| (st, self.tasks.iter().filter(|t| t.status == st).count()))
            .filter(|(_, n)| *n > 0)
            .collect()
    }

    /// Renders the plan as an aligned task table.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = vec![format!(
            "Plan {} (spec v{}, {} tasks)",
            self.id,
            self.spec_version,
            self.tasks.len()
        )];
        for t in &self.tasks {
            lines.push(format!(
                "  {:<5} {:<12} {:<13} {}",
                t.id,
                t.phase,
                t.status.as_str(),
                t.description
            ));
        }
        let counts: Vec<String> =
            self.status_counts().iter().map(|(st, n)| format!("{st}: {n}")).collect();
        if !counts.is_empty() {
            lines.push(format!("  [{}]", counts.join(", ")));
        }
        lines.join("\n")
    }
}

pub(crate) fn task_id(n: u32) -> String {
    format!("T{n:03}")
}
