//! Structural diffing of specification snapshots.
//!
//! Mappings are walked recursively; every other value (including lists) is
//! compared as a whole.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::spec::path::key_label;
use crate::spec::Specification;

/// What happened at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Present only in the newer snapshot.
    Added,
    /// Present only in the older snapshot.
    Removed,
    /// Present in both with different values.
    Modified,
}

impl ChangeKind {
    /// Lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

/// A single difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    /// Dotted key path.
    pub path: String,
    /// Kind of change.
    pub kind: ChangeKind,
    /// Value in the older snapshot (absent for `Added`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    /// Value in the newer snapshot (absent for `Removed`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
}

/// All differences between two snapshots, sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diff {
    /// The individual changes.
    pub changes: Vec<Change>,
}

impl Diff {
    /// `true` when the snapshots are identical.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// The set of changed paths.
    #[must_use]
    pub fn paths(&self) -> BTreeSet<&str> {
        self.changes.iter().map(|c| c.path.as_str()).collect()
    }

    /// Looks up the change recorded at exactly `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Change> {
        self.changes.iter().find(|c| c.path == path)
    }
}

/// Computes the structural delta between two specification versions.
///
/// Only `content` is compared; version numbers and timestamps are ignored.
#[must_use]
pub fn compute_diff(before: &Specification, after: &Specification) -> Diff {
    diff_mappings(&before.content, &after.content)
}

/// Computes the structural delta between two document bodies.
#[must_use]
pub fn diff_mappings(before: &Mapping, after: &Mapping) -> Diff {
    let mut changes = Vec::new();
    walk(before, after, "", &mut changes);
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Diff { changes }
}

fn walk(before: &Mapping, after: &Mapping, prefix: &str, out: &mut Vec<Change>) {
    for (key, old) in before {
        let path = join(prefix, key);
        match after.get(key) {
            None => out.push(Change {
                path,
                kind: ChangeKind::Removed,
                before: Some(old.clone()),
                after: None,
            }),
            Some(new) => compare(old, new, path, out),
        }
    }
    for (key, new) in after {
        if !before.contains_key(key) {
            out.push(Change {
                path: join(prefix, key),
                kind: ChangeKind::Added,
                before: None,
                after: Some(new.clone()),
            });
        }
    }
}

fn compare(old: &Value, new: &Value, path: String, out: &mut Vec<Change>) {
    match (old, new) {
        (Value::Mapping(a), Value::Mapping(b)) => walk(a, b, &path, out),
        _ if old == new => {}
        _ => out.push(Change {
            path,
            kind: ChangeKind::Modified,
            before: Some(old.clone()),
            after: Some(new.clone()),
        }),
    }
}

fn join(prefix: &str, key: &Value) -> String {
    let label = key_label(key);
    if prefix.is_empty() {
        label
    } else {
        format!("{prefix}.{label}")
    }
}

/// Renders a value on one line for diff output.
#[must_use]
pub fn inline_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        other => serde_json::to_string(other).unwrap_or_else(|_| "<unprintable>".to_string()),
    }
}

/// Formats a `Diff` for human-readable display.
#[must_use]
pub fn format_diff(diff: &Diff) -> String {
    if diff.is_empty() {
        return "No changes.".to_string();
    }

    let mut lines = Vec::new();
    for change in &diff.changes {
        match (change.kind, &change.before, &change.after) {
            (ChangeKind::Added, _, Some(after)) => {
                lines.push(format!("+ {}: {}", change.path, inline_value(after)));
            }
            (ChangeKind::Removed, Some(before), _) => {
                lines.push(format!("- {}: {}", change.path, inline_value(before)));
            }
            (ChangeKind::Modified, Some(before), Some(after)) => {
                lines.push(format!(
                    "~ {}: {} -> {}",
                    change.path,
                    inline_value(before),
                    inline_value(after)
                ));
            }
            (kind, _, _) => lines.push(format!("? {} ({})", change.path, kind.as_str())),
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    const BASE: &str = "\
modeling:
  problem_type: classification
  target_variable: churn_90d
  metrics: [auc, f1]
deliverables: [model, report]
";

    #[test]
    fn identical_documents_have_no_changes() {
        assert!(diff_mappings(&doc(BASE), &doc(BASE)).is_empty());
    }

    #[test]
    fn modified_leaf_is_a_single_change() {
        let after = BASE.replace("churn_90d", "churn_60d");
        let d = diff_mappings(&doc(BASE), &doc(&after));
        assert_eq!(d.len(), 1);
        let c = d.get("modeling.target_variable").unwrap();
        assert_eq!(c.kind, ChangeKind::Modified);
        assert_eq!(c.before, Some(Value::from("churn_90d")));
        assert_eq!(c.after, Some(Value::from("churn_60d")));
    }

    #[test]
    fn lists_are_atomic() {
        let after = BASE.replace("[auc, f1]", "[auc, f1, precision]");
        let d = diff_mappings(&doc(BASE), &doc(&after));
        assert_eq!(d.paths().into_iter().collect::<Vec<_>>(), vec!["modeling.metrics"]);
        assert_eq!(d.changes[0].kind, ChangeKind::Modified);
    }

    #[test]
    fn added_section_reported_once_at_its_root() {
        let after = format!("{BASE}constraints:\n  deadline: 2025-06-30\n  budget: low\n");
        let d = diff_mappings(&doc(BASE), &doc(&after));
        assert_eq!(d.len(), 1);
        let c = d.get("constraints").unwrap();
        assert_eq!(c.kind, ChangeKind::Added);
        assert!(c.before.is_none());
    }

    #[test]
    fn removed_key_has_no_after_value() {
        let after = concat!(
            "modeling:\n  problem_type: classification\n  metrics: [auc, f1]\n",
            "deliverables: [model, report]\n"
        );
        let d = diff_mappings(&doc(BASE), &doc(after));
        let c = d.get("modeling.target_variable").unwrap();
        assert_eq!(c.kind, ChangeKind::Removed);
        assert!(c.after.is_none());
    }

    #[test]
    fn mapping_replaced_by_scalar_is_modified() {
        let after = "modeling: tbd\ndeliverables: [model, report]\n";
        let d = diff_mappings(&doc(BASE), &doc(after));
        assert_eq!(d.len(), 1);
        assert_eq!(d.get("modeling").unwrap().kind, ChangeKind::Modified);
    }

    #[test]
    fn format_lists_each_change() {
        let after = BASE
            .replace("churn_90d", "churn_60d")
            .replace("deliverables: [model, report]\n", "");
        let out = format_diff(&diff_mappings(&doc(BASE), &doc(&after)));
        assert!(out.contains("~ modeling.target_variable: \"churn_90d\" -> \"churn_60d\""));
        assert!(out.contains("- deliverables: [\"model\",\"report\"]"));
        assert_eq!(format_diff(&Diff::default()), "No changes.");
    }
}
