//! Dot-separated section paths into a specification document.

use std::fmt;
use std::str::FromStr;

use serde_yaml::{Mapping, Value};

use crate::error::{Error, Result};

/// A validated, non-empty sequence of keys such as `modeling.target_variable`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionPath {
    segments: Vec<String>,
}

impl SectionPath {
    /// Parses a dotted path. Empty paths and empty segments are rejected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSectionPath` for malformed input.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid(raw, "path is empty", Vec::new()));
        }
        let segments: Vec<String> = trimmed.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.trim().is_empty() || s.trim() != s) {
            return Err(invalid(raw, "path contains an empty or padded segment", Vec::new()));
        }
        Ok(Self { segments })
    }

    /// The keys, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The top-level section name.
    #[must_use]
    pub fn section(&self) -> &str {
        &self.segments[0]
    }
}

impl fmt::Display for SectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for SectionPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Segment-wise prefix check on raw dotted strings.
///
/// `modeling` overlaps `modeling.target_variable`; `model` does not.
#[must_use]
pub fn paths_overlap(a: &str, b: &str) -> bool {
    let a: Vec<&str> = a.split('.').collect();
    let b: Vec<&str> = b.split('.').collect();
    a.iter().zip(&b).all(|(x, y)| x == y)
}

/// `true` when `prefix` equals `path` or is a dotted ancestor of it.
#[must_use]
pub fn path_is_within(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('.'))
}

/// Renders a mapping key as a path segment.
pub(crate) fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "~".to_string(),
        other => serde_yaml::to_string(other).unwrap_or_default().trim().to_string(),
    }
}

/// Resolves `path` inside `doc`.
///
/// # Errors
///
/// Returns `InvalidSectionPath` listing every path present in `doc` when a
/// segment is missing or traverses a non-mapping value.
pub fn get_section<'a>(doc: &'a Mapping, path: &SectionPath) -> Result<&'a Value> {
    let mut current: Option<&Value> = None;
    let mut map = doc;
    for (i, segment) in path.segments.iter().enumerate() {
        let Some(value) = map.get(segment.as_str()) else {
            return Err(invalid(
                &path.to_string(),
                &format!("no key '{segment}'"),
                available_paths(doc),
            ));
        };
        current = Some(value);
        if i + 1 < path.segments.len() {
            let Value::Mapping(child) = value else {
                return Err(invalid(
                    &path.to_string(),
                    &format!("'{segment}' is not a section"),
                    available_paths(doc),
                ));
            };
            map = child;
        }
    }
    current.ok_or_else(|| invalid(&path.to_string(), "path is empty", available_paths(doc)))
}

/// Returns a copy of `doc` with `value` stored at `path`, creating
/// intermediate sections as needed. `doc` itself is not modified.
///
/// # Errors
///
/// Returns `InvalidSectionPath` when an intermediate key holds a
/// non-mapping value.
pub fn set_section(doc: &Mapping, path: &SectionPath, value: Value) -> Result<Mapping> {
    let mut out = doc.clone();
    set_in(&mut out, &path.segments, value).map_err(|segment| {
        invalid(&path.to_string(), &format!("'{segment}' is not a section"), available_paths(doc))
    })?;
    Ok(out)
}

fn set_in(map: &mut Mapping, segments: &[String], value: Value) -> std::result::Result<(), String> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(());
    };
    let key = Value::String(head.clone());
    if rest.is_empty() {
        map.insert(key, value);
        return Ok(());
    }
    let needs_section = matches!(map.get(&key), None | Some(Value::Null));
    if needs_section {
        map.insert(key.clone(), Value::Mapping(Mapping::new()));
    }
    match map.get_mut(&key) {
        Some(Value::Mapping(child)) => set_in(child, rest, value),
        _ => Err(head.clone()),
    }
}

/// Every dotted path present in `doc` (sections and leaves), sorted.
#[must_use]
pub fn available_paths(doc: &Mapping) -> Vec<String> {
    let mut out = Vec::new();
    collect_paths(doc, "", &mut out);
    out.sort();
    out
}

fn collect_paths(map: &Mapping, prefix: &str, out: &mut Vec<String>) {
    for (key, value) in map {
        let label = key_label(key);
        let path = if prefix.is_empty() { label } else { format!("{prefix}.{label}") };
        if let Value::Mapping(child) = value {
            collect_paths(child, &path, out);
        }
        out.push(path);
    }
}

fn invalid(path: &str, reason: &str, available: Vec<String>) -> Error {
    Error::InvalidSectionPath { path: path.to_string(), reason: reason.to_string(), available }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Mapping {
        serde_yaml::from_str(
            "modeling:\n  problem_type: classification\n  target_variable: churn_90d\nnotes: hi\n",
        )
        .unwrap()
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert!(SectionPath::parse("").is_err());
        assert!(SectionPath::parse("modeling..target").is_err());
        assert!(SectionPath::parse(".modeling").is_err());
        assert_eq!(SectionPath::parse("modeling.target_variable").unwrap().segments().len(), 2);
    }

    #[test]
    fn get_resolves_nested_value() {
        let path = SectionPath::parse("modeling.target_variable").unwrap();
        assert_eq!(get_section(&doc(), &path).unwrap(), &Value::from("churn_90d"));
    }

    #[test]
    fn get_missing_key_lists_available_paths() {
        let path = SectionPath::parse("modeling.horizon").unwrap();
        match get_section(&doc(), &path) {
            Err(Error::InvalidSectionPath { available, .. }) => {
                assert!(available.contains(&"modeling.target_variable".to_string()));
                assert!(available.contains(&"notes".to_string()));
            }
            other => panic!("expected InvalidSectionPath, got {other:?}"),
        }
    }

    #[test]
    fn get_through_scalar_fails() {
        let path = SectionPath::parse("notes.deeper").unwrap();
        assert!(get_section(&doc(), &path).is_err());
    }

    #[test]
    fn set_is_pure_and_creates_intermediates() {
        let original = doc();
        let path = SectionPath::parse("constraints.compute.gpu_hours").unwrap();
        let updated = set_section(&original, &path, Value::from(40)).unwrap();

        assert!(get_section(&original, &path).is_err());
        assert_eq!(get_section(&updated, &path).unwrap(), &Value::from(40));
    }

    #[test]
    fn set_through_scalar_fails() {
        let path = SectionPath::parse("notes.extra").unwrap();
        assert!(matches!(
            set_section(&doc(), &path, Value::from("x")),
            Err(Error::InvalidSectionPath { .. })
        ));
    }

    #[test]
    fn overlap_is_segment_aware() {
        assert!(paths_overlap("modeling", "modeling.target_variable"));
        assert!(paths_overlap("modeling.target_variable", "modeling"));
        assert!(!paths_overlap("model", "modeling.target_variable"));
        assert!(!paths_overlap("modeling.metrics", "modeling.target_variable"));
        assert!(path_is_within("modeling.target_variable", "modeling"));
        assert!(!path_is_within("modeling_extra", "modeling"));
    }
}
