//! Mapping specification changes to the tasks they affect.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use crate::diff::{ChangeKind, Diff};
use crate::spec::path::{path_is_within, paths_overlap};

use super::generator::phase_for;
use super::{Plan, Task, TaskStatus};

/// Tasks touched by one change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeImpact {
    /// Changed path.
    pub path: String,
    /// Kind of change.
    pub kind: ChangeKind,
    /// Ids of live (non-deprecated) tasks whose derivation overlaps `path`.
    pub task_ids: Vec<String>,
}

/// A status change the updater will make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTransition {
    /// Task id.
    pub task_id: String,
    /// Current status.
    pub from: TaskStatus,
    /// New status.
    pub to: TaskStatus,
    /// Changed paths that caused it, e.g. `modeling.target_variable modified`.
    pub reason: String,
}

/// Which tasks a diff affects and what happens to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImpactReport {
    /// One entry per change, in diff order.
    pub changes: Vec<ChangeImpact>,
    /// Status changes, in task order.
    pub transitions: Vec<PlannedTransition>,
    /// Added paths in plannable sections that no live task covers; each
    /// gets a new task.
    pub untracked_additions: Vec<String>,
}

impl ImpactReport {
    /// Every affected task id, including those whose status is kept.
    #[must_use]
    pub fn affected_task_ids(&self) -> BTreeSet<&str> {
        self.changes.iter().flat_map(|c| c.task_ids.iter().map(String::as_str)).collect()
    }

    /// `true` when nothing in the plan changes.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.transitions.is_empty() && self.untracked_additions.is_empty()
    }
}

fn overlaps(task: &Task, path: &str) -> bool {
    task.derived_from.iter().any(|d| paths_overlap(d, path))
}

/// Maps each change to the tasks derived from an overlapping path and
/// decides each affected task's new status:
///
/// - every derivation path inside a removed path: `deprecated`
/// - otherwise `done` becomes `needs_review`, and `pending` or
///   `in_progress` become `updated`
/// - `blocked`, `needs_review` and `updated` tasks keep their status
///
/// Deprecated tasks are retired and never matched.
#[must_use]
pub fn assess_impact(diff: &Diff, plan: &Plan) -> ImpactReport {
    let live: Vec<&Task> =
        plan.tasks.iter().filter(|t| t.status != TaskStatus::Deprecated).collect();

    let changes: Vec<ChangeImpact> = diff
        .changes
        .iter()
        .map(|c| ChangeImpact {
            path: c.path.clone(),
            kind: c.kind,
            task_ids: live.iter().filter(|t| overlaps(t, &c.path)).map(|t| t.id.clone()).collect(),
        })
        .collect();

    let mut transitions = Vec::new();
    for task in &live {
        let hits: Vec<&ChangeImpact> =
            changes.iter().filter(|c| c.task_ids.contains(&task.id)).collect();
        if hits.is_empty() {
            continue;
        }
        let removed = !task.derived_from.is_empty()
            && task.derived_from.iter().all(|d| {
                hits.iter().any(|c| c.kind == ChangeKind::Removed && path_is_within(d, &c.path))
            });
        let to = if removed {
            TaskStatus::Deprecated
        } else {
            match task.status {
                TaskStatus::Done => TaskStatus::NeedsReview,
                TaskStatus::Pending | TaskStatus::InProgress => TaskStatus::Updated,
                _ => continue,
            }
        };
        let reason = hits
            .iter()
            .map(|c| format!("{} {}", c.path, c.kind.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        transitions.push(PlannedTransition {
            task_id: task.id.clone(),
            from: task.status,
            to,
            reason,
        });
    }

    let untracked_additions = changes
        .iter()
        .filter(|c| c.kind == ChangeKind::Added && c.task_ids.is_empty())
        .filter(|c| {
            let section = c.path.split('.').next().unwrap_or_default();
            phase_for(section, &plan.domain_section).is_some()
        })
        .map(|c| c.path.clone())
        .collect();

    ImpactReport { changes, transitions, untracked_additions }
}

/// Human-readable summary of an impact report.
#[must_use]
pub fn format_impact(report: &ImpactReport) -> String {
    if report.changes.is_empty() {
        return "No changes; plan unaffected.".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} change(s) affect {} task(s):",
        report.changes.len(),
        report.affected_task_ids().len()
    );
    for c in &report.changes {
        let tasks =
            if c.task_ids.is_empty() { "no tasks".to_string() } else { c.task_ids.join(", ") };
        let _ = writeln!(out, "  {} {} -> {tasks}", c.kind.as_str(), c.path);
    }
    for t in &report.transitions {
        let _ = writeln!(out, "  {}: {} -> {} ({})", t.task_id, t.from, t.to, t.reason);
    }
    for path in &report.untracked_additions {
        let _ = writeln!(out, "  new task for {path}");
    }
    if report.is_noop() {
        out.push_str("  (no status changes)\n");
    }
    out.trim_end().to_string()
}
