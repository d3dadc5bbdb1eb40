//! Error types shared by the interview, store, and plan layers.

use std::path::PathBuf;

use thiserror::Error;

use crate::interview::ConditionError;

/// Boxed I/O error as returned by the filesystem port.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the core can report to its caller.
///
/// All variants are recoverable at the caller level.
#[derive(Debug, Error)]
pub enum Error {
    /// No question tree is registered for the requested project type.
    #[error(
        "no question tree for project type '{project_type}' (available: {})",
        available.join(", ")
    )]
    TreeNotFound {
        /// The requested project type.
        project_type: String,
        /// Project types that do have a tree.
        available: Vec<String>,
    },

    /// A question tree definition is malformed.
    #[error("invalid question tree '{project_type}': {reason}")]
    InvalidTree {
        /// Project type of the offending tree.
        project_type: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A required question received an empty answer.
    #[error("question '{question_id}' is required")]
    RequiredQuestionUnanswered {
        /// The question that needs an answer.
        question_id: String,
    },

    /// A raw answer could not be parsed for the question's type.
    #[error("invalid answer for '{question_id}': {reason}")]
    InvalidAnswer {
        /// The question being answered.
        question_id: String,
        /// Why the answer was rejected.
        reason: String,
    },

    /// An answer was submitted after the tree was exhausted.
    #[error("interview is already complete")]
    InterviewComplete,

    /// A draft was requested before every visible question was handled.
    #[error("interview is not complete; next question is '{question_id}'")]
    InterviewIncomplete {
        /// The question still waiting for an answer.
        question_id: String,
    },

    /// A predicate could not be evaluated.
    ///
    /// The interview engine never fails on this: it shows the question and
    /// records a `ConditionWarning`. Callers that want strict trees promote
    /// the warning's `error` into this variant with `?` or `Error::from`.
    #[error(transparent)]
    ConditionEvaluation(#[from] ConditionError),

    /// There is no current specification; run the interview first.
    #[error("no specification found; run the interview first")]
    SpecificationNotFound,

    /// `create` was called while a specification already exists.
    #[error("a specification already exists (version {version})")]
    SpecificationExists {
        /// Version of the existing specification.
        version: u32,
    },

    /// The requested version is not part of the history.
    #[error("version {version} not found")]
    VersionNotFound {
        /// The requested version.
        version: u32,
    },

    /// A save was attempted from a document that is not the current version.
    #[error("stale document: current version is {expected}, document is version {found}")]
    VersionConflict {
        /// The current version on disk.
        expected: u32,
        /// The version carried by the submitted document.
        found: u32,
    },

    /// Writing store state failed; the prior version remains current.
    #[error("failed to write {}: {source}", path.display())]
    SaveIo {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying port error.
        #[source]
        source: PortError,
    },

    /// Reading store state failed.
    #[error("failed to read {}: {source}", path.display())]
    LoadIo {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying port error.
        #[source]
        source: PortError,
    },

    /// A stored file exists but cannot be parsed or serialized.
    #[error("corrupt store file {}: {reason}", path.display())]
    Corrupt {
        /// The offending file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// A section path does not resolve or is not legal for the schema.
    #[error("invalid section path '{path}': {reason} (available: {})", available.join(", "))]
    InvalidSectionPath {
        /// The path as given.
        path: String,
        /// Why it was rejected.
        reason: String,
        /// Paths that would have been accepted.
        available: Vec<String>,
    },

    /// No task with this id exists in the plan.
    #[error("task '{id}' not found")]
    TaskNotFound {
        /// The requested task id.
        id: String,
    },

    /// The requested status change is not allowed through this API.
    #[error("task '{id}' cannot move from {from} to {to}")]
    InvalidStatusTransition {
        /// Task id.
        id: String,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },

    /// Reading from or writing to the interactive terminal failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded.
    #[error("configuration error: {reason}")]
    Config {
        /// What went wrong.
        reason: String,
    },
}
