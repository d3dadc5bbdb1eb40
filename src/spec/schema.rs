//! Legal top-level sections for a specification.

use crate::error::{Error, Result};

use super::path::SectionPath;

/// Sections every specification may carry regardless of project type.
pub const COMMON_SECTIONS: [&str; 6] =
    ["metadata", "problem", "data_sources", "deliverables", "constraints", "notes"];

/// Describes which sections are legal for one project type.
///
/// Each project type owns exactly one domain-specific section (for example
/// `modeling` for `ml_model`); the domain section of another project type is
/// rejected like any other unknown section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSchema {
    domain_section: String,
}

impl SpecSchema {
    /// Creates a schema whose domain section is `domain_section`.
    #[must_use]
    pub fn new(domain_section: &str) -> Self {
        Self { domain_section: domain_section.to_string() }
    }

    /// The project-type-specific section name.
    #[must_use]
    pub fn domain_section(&self) -> &str {
        &self.domain_section
    }

    /// All legal top-level section names.
    #[must_use]
    pub fn sections(&self) -> Vec<String> {
        let mut out: Vec<String> = COMMON_SECTIONS.iter().map(|s| (*s).to_string()).collect();
        out.push(self.domain_section.clone());
        out
    }

    /// Checks that `path` starts at a legal top-level section.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSectionPath` with the legal section names.
    pub fn validate(&self, path: &SectionPath) -> Result<()> {
        let section = path.section();
        if COMMON_SECTIONS.contains(&section) || section == self.domain_section {
            return Ok(());
        }
        Err(Error::InvalidSectionPath {
            path: path.to_string(),
            reason: format!("'{section}' is not a section of this specification"),
            available: self.sections(),
        })
    }

    /// Parses and validates a raw dotted path.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSectionPath` if the path is malformed or illegal.
    pub fn parse_path(&self, raw: &str) -> Result<SectionPath> {
        let path = SectionPath::parse(raw)?;
        self.validate(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_and_domain_sections() {
        let schema = SpecSchema::new("modeling");
        assert!(schema.parse_path("modeling.target_variable").is_ok());
        assert!(schema.parse_path("constraints.deadline").is_ok());
        assert!(schema.parse_path("notes").is_ok());
    }

    #[test]
    fn rejects_foreign_domain_section() {
        let schema = SpecSchema::new("modeling");
        match schema.parse_path("dashboard.refresh_rate") {
            Err(Error::InvalidSectionPath { available, .. }) => {
                assert!(available.contains(&"modeling".to_string()));
                assert!(!available.contains(&"dashboard".to_string()));
            }
            other => panic!("expected InvalidSectionPath, got {other:?}"),
        }
    }
}
