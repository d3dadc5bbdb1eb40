//! The versioned specification document.
//!
//! A specification is a nested YAML mapping of named sections plus the
//! version bookkeeping the store maintains. Content is only ever changed by
//! producing a new document (`with_section`) and saving it through the store.

pub mod path;
pub mod schema;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::Result;

pub use path::{available_paths, get_section, set_section, SectionPath};
pub use schema::SpecSchema;

/// A committed specification at a specific version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
    /// Monotonic version, starting at 1.
    pub version: u32,
    /// Project type the interview was run for (e.g. `ml_model`).
    pub project_type: String,
    /// Name of this project type's domain section.
    pub domain_section: String,
    /// When version 1 was created.
    pub created_at: DateTime<Utc>,
    /// When this version was saved.
    pub updated_at: DateTime<Utc>,
    /// The document body.
    pub content: Mapping,
}

impl Specification {
    /// Schema governing which paths are legal in this document.
    #[must_use]
    pub fn schema(&self) -> SpecSchema {
        SpecSchema::new(&self.domain_section)
    }

    /// Reads the value at a dotted path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSectionPath` if the path is illegal for the schema or
    /// does not resolve.
    pub fn get_section(&self, raw_path: &str) -> Result<&Value> {
        let path = self.schema().parse_path(raw_path)?;
        get_section(&self.content, &path)
    }

    /// Returns a copy with `value` stored at the dotted path. The version is
    /// unchanged; only `SpecStore::save` assigns versions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSectionPath` if the path is illegal or blocked by a
    /// non-mapping value.
    pub fn with_section(&self, raw_path: &str, value: Value) -> Result<Specification> {
        let path = self.schema().parse_path(raw_path)?;
        let content = set_section(&self.content, &path, value)?;
        Ok(Specification { content, ..self.clone() })
    }

    /// `true` when both documents carry identical content, ignoring version
    /// and timestamps.
    #[must_use]
    pub fn same_content(&self, other: &Specification) -> bool {
        self.content == other.content
    }
}

/// Interview output that has not been committed to the store yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDraft {
    /// Project type of the interview.
    pub project_type: String,
    /// Domain section declared by the question tree.
    pub domain_section: String,
    /// The converted answers.
    pub content: Mapping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Specification {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        Specification {
            version: 3,
            project_type: "ml_model".into(),
            domain_section: "modeling".into(),
            created_at: at,
            updated_at: at,
            content: serde_yaml::from_str("modeling:\n  target_variable: churn_90d\n").unwrap(),
        }
    }

    #[test]
    fn with_section_keeps_version_and_original() {
        let spec = sample();
        let edited =
            spec.with_section("modeling.target_variable", Value::from("churn_60d")).unwrap();

        assert_eq!(edited.version, 3);
        assert_eq!(spec.get_section("modeling.target_variable").unwrap(), "churn_90d");
        assert_eq!(edited.get_section("modeling.target_variable").unwrap(), "churn_60d");
        assert!(!spec.same_content(&edited));
    }

    #[test]
    fn get_section_rejects_unknown_section() {
        assert!(sample().get_section("analysis.kpis").is_err());
    }

    #[test]
    fn yaml_round_trip_preserves_document() {
        let spec = sample();
        let yaml = serde_yaml::to_string(&spec).unwrap();
        let back: Specification = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(spec, back);
    }
}
