//! Applying specification changes and execution progress to a plan.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::diff::Diff;
use crate::error::{Error, Result};

use super::generator::{describe, phase_for};
use super::impact::assess_impact;
use super::{Plan, Task, TaskStatus};

/// Result of [`update_plan_from_diff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanUpdate {
    /// The updated plan.
    pub plan: Plan,
    /// `(task id, from, to)` for every reclassified task.
    pub reclassified: Vec<(String, TaskStatus, TaskStatus)>,
    /// Ids of tasks synthesized for added paths.
    pub added: Vec<String>,
}

/// Reclassifies tasks affected by `diff` and appends tasks for added paths
/// no task covers. Unaffected tasks are returned exactly as they were.
#[must_use]
pub fn update_plan_from_diff(diff: &Diff, plan: &Plan, now: DateTime<Utc>) -> PlanUpdate {
    let report = assess_impact(diff, plan);
    let mut updated = plan.clone();
    let mut reclassified = Vec::new();

    for t in &report.transitions {
        if let Some(task) = updated.tasks.iter_mut().find(|task| task.id == t.task_id) {
            task.transition(t.to, now, format!("specification changed: {}", t.reason));
            info!(task = %task.id, from = %t.from, to = %t.to, "reclassified task");
            reclassified.push((t.task_id.clone(), t.from, t.to));
        }
    }

    let mut added = Vec::new();
    for path in &report.untracked_additions {
        let Some(change) = diff.get(path) else {
            continue;
        };
        let section = path.split('.').next().unwrap_or_default();
        let Some(phase) = phase_for(section, &plan.domain_section) else {
            continue;
        };
        let id = updated.next_task_id();
        let value = change.after.clone().unwrap_or_default();
        let description = describe(&phase, path, &value);
        updated.tasks.push(Task::new(id.clone(), &phase, description, vec![path.clone()], now));
        info!(task = %id, %path, "added task for new specification path");
        added.push(id);
    }

    PlanUpdate { plan: updated, reclassified, added }
}

/// Records execution progress on one task.
///
/// The execution driver may set `pending`, `in_progress`, `done` and
/// `blocked`. The other statuses belong to the plan updater, and deprecated
/// tasks cannot change at all. Setting the current status is a no-op.
///
/// # Errors
///
/// Returns `TaskNotFound` or `InvalidStatusTransition`.
pub fn update_task_status(
    plan: &Plan,
    id: &str,
    status: TaskStatus,
    now: DateTime<Utc>,
) -> Result<Plan> {
    let current = plan.task(id).ok_or_else(|| Error::TaskNotFound { id: id.to_string() })?.status;
    if status.is_reserved() || current == TaskStatus::Deprecated {
        return Err(Error::InvalidStatusTransition {
            id: id.to_string(),
            from: current.to_string(),
            to: status.to_string(),
        });
    }
    let mut updated = plan.clone();
    if current == status {
        return Ok(updated);
    }
    if let Some(task) = updated.tasks.iter_mut().find(|t| t.id == id) {
        task.transition(status, now, "execution".to_string());
    }
    Ok(updated)
}
