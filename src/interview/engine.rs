//! Interview state machine over a question tree.
//!
//! The state is a plain value: every operation takes the current state and
//! returns the next one, leaving the input untouched on error.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::spec::{set_section, SpecDraft};

use super::answer::{parse_answer, Answer};
use super::condition::{AnswerLookup, ConditionError, SingleAnswer};
use super::registry::TreeRegistry;
use super::tree::{Question, QuestionTree};

/// One accepted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    /// Question id.
    pub question_id: String,
    /// Input as typed (trimmed).
    pub raw: String,
    /// Parsed answer.
    pub answer: Answer,
    /// Follow-up text, appended to this record when a follow-up was asked
    /// and answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up: Option<String>,
}

/// A predicate that could not be evaluated; the question was shown anyway.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionWarning {
    /// Question whose condition or follow-up failed.
    pub question_id: String,
    /// What went wrong.
    pub error: ConditionError,
}

impl fmt::Display for ConditionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (asked anyway)", self.question_id, self.error)
    }
}

/// In-progress interview.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewState {
    /// Project type (and tree) being interviewed.
    pub project_type: String,
    /// Accepted answers in order.
    pub answers: Vec<AnsweredQuestion>,
    /// Optional questions left blank.
    pub skipped: Vec<String>,
    /// Flat index of the current question; always points at a visible
    /// question or past the end.
    pub cursor: usize,
    /// The current question was answered and its follow-up is due.
    pub pending_follow_up: bool,
    /// Fail-open predicate warnings collected so far.
    pub warnings: Vec<ConditionWarning>,
}

/// What the caller should ask next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NextQuestion<'a> {
    /// A question from the tree.
    Question(&'a Question),
    /// The follow-up of an already answered question.
    FollowUp {
        /// The question whose answer triggered the follow-up.
        parent: &'a Question,
        /// Follow-up prompt.
        prompt: &'a str,
    },
}

impl NextQuestion<'_> {
    /// Prompt text.
    #[must_use]
    pub fn prompt(&self) -> &str {
        match self {
            NextQuestion::Question(q) => &q.prompt,
            NextQuestion::FollowUp { prompt, .. } => prompt,
        }
    }

    /// Id of the question, or `<parent>.follow_up` for follow-ups.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            NextQuestion::Question(q) => q.id.clone(),
            NextQuestion::FollowUp { parent, .. } => format!("{}.follow_up", parent.id),
        }
    }
}

/// Answers collected so far, scoped to the tree's question ids.
struct TreeScope<'a> {
    tree: &'a QuestionTree,
    answers: &'a [AnsweredQuestion],
}

impl AnswerLookup for TreeScope<'_> {
    fn is_known(&self, field: &str) -> bool {
        self.tree.find(field).is_some()
    }

    fn answer(&self, field: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == field).map(|a| &a.answer)
    }
}

/// Starts an interview for `project_type`.
///
/// # Errors
///
/// Returns `TreeNotFound` when no tree is registered for the project type.
pub fn create_interview_state(
    registry: &TreeRegistry,
    project_type: &str,
) -> Result<InterviewState> {
    let tree = registry.get(project_type)?;
    Ok(InterviewState::start(tree))
}

impl InterviewState {
    /// Fresh state positioned at the first visible question of `tree`.
    #[must_use]
    pub fn start(tree: &QuestionTree) -> Self {
        let mut state = Self {
            project_type: tree.project_type.clone(),
            answers: Vec::new(),
            skipped: Vec::new(),
            cursor: 0,
            pending_follow_up: false,
            warnings: Vec::new(),
        };
        state.advance_to_visible(tree);
        state
    }

    /// The recorded answer for a question id.
    #[must_use]
    pub fn answer(&self, question_id: &str) -> Option<&AnsweredQuestion> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    /// Moves the cursor past every question whose condition is false.
    /// Unevaluable conditions stop the scan: the question is shown.
    fn advance_to_visible(&mut self, tree: &QuestionTree) {
        while let Some(question) = tree.question_at(self.cursor) {
            let Some(condition) = &question.condition else {
                return;
            };
            let scope = TreeScope { tree, answers: &self.answers };
            match condition.evaluate(&scope) {
                Ok(true) => return,
                Ok(false) => {
                    debug!(question = %question.id, "condition false, skipping question");
                    self.cursor += 1;
                }
                Err(error) => {
                    warn!(
                        question = %question.id,
                        %error,
                        "condition could not be evaluated, showing question"
                    );
                    self.warnings
                        .push(ConditionWarning { question_id: question.id.clone(), error });
                    return;
                }
            }
        }
    }
}

/// The next prompt to show, or `None` once the tree is exhausted.
#[must_use]
pub fn next_question<'a>(
    tree: &'a QuestionTree,
    state: &InterviewState,
) -> Option<NextQuestion<'a>> {
    let question = tree.question_at(state.cursor)?;
    if state.pending_follow_up {
        if let Some(follow_up) = &question.follow_up {
            return Some(NextQuestion::FollowUp { parent: question, prompt: &follow_up.prompt });
        }
    }
    Some(NextQuestion::Question(question))
}

/// `true` once every visible question (and follow-up) has been handled.
#[must_use]
pub fn is_complete(tree: &QuestionTree, state: &InterviewState) -> bool {
    next_question(tree, state).is_none()
}

/// Records `raw` as the answer to the current prompt and returns the
/// advanced state.
///
/// # Errors
///
/// - `InterviewComplete` if the tree is exhausted.
/// - `RequiredQuestionUnanswered` if `raw` is blank for a required question.
/// - `InvalidAnswer` if `raw` does not parse for the question type.
pub fn submit_answer(
    tree: &QuestionTree,
    state: &InterviewState,
    raw: &str,
) -> Result<InterviewState> {
    let question = tree.question_at(state.cursor).ok_or(Error::InterviewComplete)?;
    let text = raw.trim();
    let mut next = state.clone();

    if state.pending_follow_up {
        if let Some(record) = next.answers.last_mut().filter(|a| a.question_id == question.id) {
            if !text.is_empty() {
                record.follow_up = Some(text.to_string());
            }
        }
        next.pending_follow_up = false;
        next.cursor += 1;
        next.advance_to_visible(tree);
        return Ok(next);
    }

    if text.is_empty() {
        if question.required {
            return Err(Error::RequiredQuestionUnanswered { question_id: question.id.clone() });
        }
        debug!(question = %question.id, "optional question skipped");
        next.skipped.push(question.id.clone());
        next.cursor += 1;
        next.advance_to_visible(tree);
        return Ok(next);
    }

    let answer = parse_answer(question, text)?;
    let wants_follow_up = match &question.follow_up {
        None => false,
        Some(follow_up) => {
            let scope = SingleAnswer { field: &question.id, answer: &answer };
            follow_up.condition.evaluate(&scope).unwrap_or_else(|error| {
                warn!(
                    question = %question.id,
                    %error,
                    "follow-up condition could not be evaluated, asking anyway"
                );
                next.warnings
                    .push(ConditionWarning { question_id: question.id.clone(), error });
                true
            })
        }
    };

    next.answers.push(AnsweredQuestion {
        question_id: question.id.clone(),
        raw: text.to_string(),
        answer,
        follow_up: None,
    });

    if wants_follow_up {
        next.pending_follow_up = true;
    } else {
        next.cursor += 1;
        next.advance_to_visible(tree);
    }
    Ok(next)
}

/// Converts a completed interview into an uncommitted specification draft.
///
/// Each answer is written at its question's `maps_to` path; follow-up text
/// goes to the question's follow-up path as a separate field.
///
/// # Errors
///
/// Returns `InterviewIncomplete` if questions remain, or
/// `InvalidSectionPath` if the tree maps an answer to an illegal path.
pub fn to_specification_draft(tree: &QuestionTree, state: &InterviewState) -> Result<SpecDraft> {
    if let Some(next) = next_question(tree, state) {
        return Err(Error::InterviewIncomplete { question_id: next.key() });
    }

    let schema = tree.schema();
    let mut metadata = Mapping::new();
    metadata.insert("project_type".into(), tree.project_type.clone().into());
    metadata.insert("interview".into(), tree.title.clone().into());
    let mut content = Mapping::new();
    content.insert("metadata".into(), Value::Mapping(metadata));

    for record in &state.answers {
        let Some(question) = tree.find(&record.question_id) else {
            continue;
        };
        let path = schema.parse_path(&question.maps_to)?;
        content = set_section(&content, &path, record.answer.to_value())?;

        if let (Some(text), Some(follow_up_path)) = (&record.follow_up, question.follow_up_path()) {
            let path = schema.parse_path(&follow_up_path)?;
            content = set_section(&content, &path, Value::String(text.clone()))?;
        }
    }

    Ok(SpecDraft {
        project_type: tree.project_type.clone(),
        domain_section: tree.domain_section.clone(),
        content,
    })
}
