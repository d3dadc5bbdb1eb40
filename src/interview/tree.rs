//! Declarative question trees.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::spec::path::paths_overlap;
use crate::spec::SpecSchema;

use super::condition::Condition;

/// Paths the interview draft fills in itself.
const DRAFT_METADATA_PATHS: [&str; 2] = ["metadata.project_type", "metadata.interview"];

/// How a question's raw answer is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    /// Free text.
    Text,
    /// Exactly one of `options`.
    SingleChoice,
    /// Any subset of `options`.
    MultipleChoice,
    /// Yes or no.
    Boolean,
    /// A number within optional bounds.
    Numeric,
    /// An ISO `YYYY-MM-DD` date.
    Date,
    /// A list of strings.
    List,
    /// A path or URI to a file.
    FileRef,
}

impl QuestionType {
    fn needs_options(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }

    /// Input hint shown next to the prompt.
    #[must_use]
    pub fn hint(self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::SingleChoice => "pick one",
            QuestionType::MultipleChoice => "comma-separated picks",
            QuestionType::Boolean => "yes/no",
            QuestionType::Numeric => "number",
            QuestionType::Date => "YYYY-MM-DD",
            QuestionType::List => "comma- or semicolon-separated",
            QuestionType::FileRef => "file path",
        }
    }
}

/// A question asked right after its parent when the parent's answer matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    /// Predicate over the parent's answer alone.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub condition: Condition,
    /// Prompt for the follow-up.
    pub prompt: String,
    /// Where the follow-up text is stored; defaults to `<parent maps_to>_follow_up`.
    #[serde(default)]
    pub maps_to: Option<String>,
}

/// One question in a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within the tree; conditions refer to it.
    pub id: String,
    /// Text shown to the user.
    pub prompt: String,
    /// Answer type.
    #[serde(rename = "type")]
    pub kind: QuestionType,
    /// Choices for single/multiple choice questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Inclusive lower bound for numeric answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive upper bound for numeric answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Whether an empty answer blocks progress.
    #[serde(default)]
    pub required: bool,
    /// Shown only when this holds against earlier answers.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub condition: Option<Condition>,
    /// Optional follow-up prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<FollowUp>,
    /// Specification path the answer is written to.
    pub maps_to: String,
}

impl Question {
    /// Path a follow-up answer to this question is stored at.
    #[must_use]
    pub fn follow_up_path(&self) -> Option<String> {
        self.follow_up
            .as_ref()
            .map(|f| f.maps_to.clone().unwrap_or_else(|| format!("{}_follow_up", self.maps_to)))
    }
}

/// A titled group of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSection {
    /// Section identifier.
    pub id: String,
    /// Heading shown when the section starts.
    pub title: String,
    /// Questions in asking order.
    pub questions: Vec<Question>,
}

/// The full question tree for one project type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionTree {
    /// Project type this tree interviews for.
    pub project_type: String,
    /// Human-readable name.
    pub title: String,
    /// Name of the project-type-specific specification section.
    pub domain_section: String,
    /// Sections in asking order.
    pub sections: Vec<TreeSection>,
}

impl QuestionTree {
    /// All questions in asking order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    /// Question at a flat position.
    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions().nth(index)
    }

    /// The section containing the question at a flat position.
    #[must_use]
    pub fn section_at(&self, index: usize) -> Option<&TreeSection> {
        let mut offset = 0;
        for section in &self.sections {
            if index < offset + section.questions.len() {
                return Some(section);
            }
            offset += section.questions.len();
        }
        None
    }

    /// Finds a question by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Question> {
        self.questions().find(|q| q.id == id)
    }

    /// Total number of questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// `true` when the tree has no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Schema of the specifications this tree produces.
    #[must_use]
    pub fn schema(&self) -> SpecSchema {
        SpecSchema::new(&self.domain_section)
    }

    /// Checks structural rules: unique ids, options on choice questions,
    /// legal `maps_to` paths that never nest inside one another, and
    /// conditions that only reference questions asked earlier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTree` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        let invalid =
            |reason: String| Error::InvalidTree { project_type: self.project_type.clone(), reason };
        let schema = self.schema();
        let mut seen: HashSet<&str> = HashSet::new();
        // Paths already claimed, with what claimed them. The draft writes
        // the interview metadata itself.
        let mut claimed: Vec<(String, String)> = DRAFT_METADATA_PATHS
            .iter()
            .map(|p| ((*p).to_string(), "interview metadata".to_string()))
            .collect();
        let mut claim = |path: String, owner: String| -> Result<()> {
            if let Some((_, other)) = claimed.iter().find(|(p, _)| paths_overlap(p, &path)) {
                return Err(invalid(format!("{owner} maps to '{path}', which overlaps {other}")));
            }
            claimed.push((path, owner));
            Ok(())
        };

        for q in self.questions() {
            if let Some(condition) = &q.condition {
                for field in condition.fields() {
                    if !seen.contains(field) {
                        return Err(invalid(format!(
                            "condition on '{}' references '{field}', which is not asked before it",
                            q.id
                        )));
                    }
                }
            }
            if !seen.insert(q.id.as_str()) {
                return Err(invalid(format!("duplicate question id '{}'", q.id)));
            }
            if q.kind.needs_options() && q.options.is_empty() {
                return Err(invalid(format!("choice question '{}' has no options", q.id)));
            }
            schema
                .parse_path(&q.maps_to)
                .map_err(|e| invalid(format!("question '{}': {e}", q.id)))?;
            claim(q.maps_to.clone(), format!("question '{}'", q.id))?;
            if let Some(follow_up) = &q.follow_up {
                if let Some(field) = follow_up.condition.fields().into_iter().find(|f| *f != q.id) {
                    return Err(invalid(format!(
                        "follow-up of '{}' may only test its own answer, not '{field}'",
                        q.id
                    )));
                }
                if let Some(path) = q.follow_up_path() {
                    schema
                        .parse_path(&path)
                        .map_err(|e| invalid(format!("follow-up of '{}': {e}", q.id)))?;
                    claim(path, format!("follow-up of '{}'", q.id))?;
                }
            }
        }
        Ok(())
    }
}
