//! Initial plan generation from a specification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::diff::inline_value;
use crate::spec::path::key_label;
use crate::spec::Specification;

use super::{task_id, Plan, Task};

/// Read-only summary of one data source, produced by an external profiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataProfile {
    /// File or table name.
    pub source: String,
    /// Row count.
    #[serde(default)]
    pub rows: u64,
    /// Column count.
    #[serde(default)]
    pub columns: u64,
    /// Detected problems, one task each.
    #[serde(default)]
    pub quality_issues: Vec<String>,
}

/// Phase label for a top-level section; `None` for sections that never
/// produce tasks (`metadata`, `notes`) or are unknown.
#[must_use]
pub fn phase_for(section: &str, domain_section: &str) -> Option<String> {
    let phase = match section {
        "problem" => "discovery",
        "data_sources" => "data",
        "deliverables" => "delivery",
        "constraints" => "planning",
        s if s == domain_section => s,
        _ => return None,
    };
    Some(phase.to_string())
}

/// Sections that produce tasks, in plan order.
fn plannable_sections(domain_section: &str) -> [&str; 5] {
    ["problem", "data_sources", domain_section, "deliverables", "constraints"]
}

/// Builds a fresh plan: one task per direct child of each plannable section
/// (one task for a scalar or list section), then one data task per
/// profiled quality issue.
#[must_use]
pub fn generate_plan(
    spec: &Specification,
    profiles: &[DataProfile],
    plan_id: &str,
    now: DateTime<Utc>,
) -> Plan {
    let mut tasks = Vec::new();
    let mut next = 1;
    let mut push = |tasks: &mut Vec<Task>, phase: &str, description: String, path: String| {
        tasks.push(Task::new(task_id(next), phase, description, vec![path], now));
        next += 1;
    };

    for section in plannable_sections(&spec.domain_section) {
        let (Some(value), Some(phase)) =
            (spec.content.get(section), phase_for(section, &spec.domain_section))
        else {
            continue;
        };
        match value {
            Value::Mapping(children) if !children.is_empty() => {
                for (key, child) in children {
                    let path = format!("{section}.{}", key_label(key));
                    push(&mut tasks, &phase, describe(&phase, &path, child), path);
                }
            }
            other => {
                push(&mut tasks, &phase, describe(&phase, section, other), section.to_string());
            }
        }
    }

    for profile in profiles {
        for issue in &profile.quality_issues {
            push(
                &mut tasks,
                "data",
                format!("Resolve data quality issue in {}: {issue}", profile.source),
                "data_sources".to_string(),
            );
        }
    }

    debug!(tasks = tasks.len(), version = spec.version, "generated plan");
    Plan {
        id: plan_id.to_string(),
        spec_version: spec.version,
        domain_section: spec.domain_section.clone(),
        generated_at: now,
        tasks,
    }
}

/// Task description for the value at `path`.
pub(crate) fn describe(phase: &str, path: &str, value: &Value) -> String {
    let verb = match phase {
        "discovery" => "Clarify",
        "data" => "Prepare",
        "delivery" => "Deliver",
        "planning" => "Plan for",
        _ => "Implement",
    };
    let label = path.rsplit('.').next().unwrap_or(path).replace('_', " ");
    match summarize(value) {
        Some(summary) => format!("{verb} {label}: {summary}"),
        None => format!("{verb} {label}"),
    }
}

fn summarize(value: &Value) -> Option<String> {
    const LIMIT: usize = 60;
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => inline_value(other),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Value::Mapping(m) => format!("{} fields", m.len()),
        other => inline_value(other),
    };
    if text.chars().count() > LIMIT {
        let cut: String = text.chars().take(LIMIT - 3).collect();
        Some(format!("{cut}..."))
    } else {
        Some(text)
    }
}
