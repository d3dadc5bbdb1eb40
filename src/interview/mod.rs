//! Guided interview that turns answers into a specification draft.
//!
//! A [`QuestionTree`] is static data; an [`InterviewState`] walks it one
//! answer at a time, hiding questions whose conditions are false and
//! inserting follow-ups right after the answers that trigger them.

pub mod answer;
pub mod condition;
pub mod engine;
pub mod registry;
pub mod session;
pub mod tree;

pub use answer::{parse_answer, Answer};
pub use condition::{AnswerLookup, Condition, ConditionError, Literal, SingleAnswer};
pub use engine::{
    create_interview_state, is_complete, next_question, submit_answer, to_specification_draft,
    AnsweredQuestion, ConditionWarning, InterviewState, NextQuestion,
};
pub use registry::TreeRegistry;
pub use session::{parse_answer_script, run_scripted, InterviewSession, SessionOutcome};
pub use tree::{FollowUp, Question, QuestionTree, QuestionType, TreeSection};
