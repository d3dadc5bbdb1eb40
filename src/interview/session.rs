//! Terminal front-end for the interview engine.
//!
//! [`InterviewSession`] drives the engine over any reader/writer pair so the
//! same loop serves stdin/stdout and tests. [`run_scripted`] answers from a
//! prepared mapping instead of a person.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use serde_yaml::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::spec::SpecDraft;

use super::engine::{
    next_question, submit_answer, to_specification_draft, InterviewState, NextQuestion,
};
use super::tree::QuestionTree;

/// How an interactive session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Every question handled and the summary confirmed.
    Confirmed(SpecDraft),
    /// The user typed `cancel`, closed input, or declined the summary.
    Cancelled,
}

/// Interactive interview loop.
pub struct InterviewSession<'t, R: BufRead, W: Write> {
    tree: &'t QuestionTree,
    reader: R,
    writer: W,
    auto_confirm: bool,
}

impl<'t, R: BufRead, W: Write> InterviewSession<'t, R, W> {
    /// Creates a session over `tree`.
    pub fn new(tree: &'t QuestionTree, reader: R, writer: W) -> Self {
        Self { tree, reader, writer, auto_confirm: false }
    }

    /// Skips the final "yes" confirmation.
    #[must_use]
    pub fn auto_confirm(mut self, yes: bool) -> Self {
        self.auto_confirm = yes;
        self
    }

    /// Asks questions until the tree is exhausted, then shows a summary and
    /// waits for confirmation. Invalid or missing answers are reported and
    /// the same prompt is repeated.
    ///
    /// # Errors
    ///
    /// Returns `Io` on read/write failure, or any non-recoverable engine error.
    pub fn run(mut self, mut state: InterviewState) -> Result<SessionOutcome> {
        let tree = self.tree;
        writeln!(self.writer, "{} interview (type 'cancel' to stop)", tree.title)?;
        let mut current_section: Option<&str> = None;

        while let Some(next) = next_question(tree, &state) {
            if let Some(section) = tree.section_at(state.cursor) {
                if current_section != Some(section.id.as_str()) {
                    writeln!(self.writer, "\n== {} ==", section.title)?;
                    current_section = Some(section.id.as_str());
                }
            }
            self.present(&next)?;

            let Some(line) = self.read_line()? else {
                writeln!(self.writer, "\nInput closed. Interview cancelled.")?;
                return Ok(SessionOutcome::Cancelled);
            };
            if line.eq_ignore_ascii_case("cancel") {
                writeln!(self.writer, "Interview cancelled.")?;
                return Ok(SessionOutcome::Cancelled);
            }

            match submit_answer(tree, &state, &line) {
                Ok(advanced) => state = advanced,
                Err(
                    e @ (Error::RequiredQuestionUnanswered { .. } | Error::InvalidAnswer { .. }),
                ) => {
                    writeln!(self.writer, "  ! {e}")?;
                }
                Err(e) => return Err(e),
            }
        }

        for warning in &state.warnings {
            writeln!(self.writer, "warning: {warning}")?;
        }

        let draft = to_specification_draft(tree, &state)?;
        writeln!(self.writer, "\n== Summary ==")?;
        let summary = serde_yaml::to_string(&draft.content)
            .map_err(|e| Error::Corrupt { path: "<draft>".into(), reason: e.to_string() })?;
        write!(self.writer, "{summary}")?;

        if self.auto_confirm {
            return Ok(SessionOutcome::Confirmed(draft));
        }
        write!(self.writer, "\nSave this specification? Type 'yes' to confirm: ")?;
        self.writer.flush()?;
        match self.read_line()? {
            Some(answer) if answer.eq_ignore_ascii_case("yes") => {
                Ok(SessionOutcome::Confirmed(draft))
            }
            _ => {
                writeln!(self.writer, "Not saved.")?;
                Ok(SessionOutcome::Cancelled)
            }
        }
    }

    fn present(&mut self, next: &NextQuestion<'_>) -> Result<()> {
        match next {
            NextQuestion::Question(q) => {
                let marker = if q.required { " *" } else { "" };
                writeln!(self.writer, "\n{}{marker} [{}]", q.prompt, q.kind.hint())?;
                for (i, option) in q.options.iter().enumerate() {
                    writeln!(self.writer, "  {}) {option}", i + 1)?;
                }
            }
            NextQuestion::FollowUp { prompt, .. } => {
                writeln!(self.writer, "  -> {prompt}")?;
            }
        }
        write!(self.writer, "> ")?;
        self.writer.flush()?;
        Ok(())
    }

    /// Reads one trimmed line; `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Converts a YAML answers file body into raw answers keyed by question id
/// (or `<id>.follow_up`). Sequences are joined with `; `.
///
/// # Errors
///
/// Returns `Config` if the document is not a mapping of scalars and lists.
pub fn parse_answer_script(source: &str) -> Result<BTreeMap<String, String>> {
    let invalid = |reason: String| Error::Config { reason: format!("answers file: {reason}") };
    let doc: BTreeMap<String, Value> =
        serde_yaml::from_str(source).map_err(|e| invalid(e.to_string()))?;
    doc.into_iter()
        .map(|(key, value)| {
            let raw = match value {
                Value::Sequence(items) => {
                    let parts: Option<Vec<String>> = items.iter().map(scalar_text).collect();
                    parts
                        .ok_or_else(|| invalid(format!("'{key}' must list plain values")))?
                        .join("; ")
                }
                other => scalar_text(&other)
                    .ok_or_else(|| invalid(format!("'{key}' must be a plain value")))?,
            };
            Ok((key, raw))
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

/// Runs the interview non-interactively. Questions missing from `answers`
/// are submitted blank.
///
/// # Errors
///
/// Propagates the first engine error, such as a required question with no
/// scripted answer.
pub fn run_scripted(
    tree: &QuestionTree,
    mut state: InterviewState,
    answers: &BTreeMap<String, String>,
) -> Result<(SpecDraft, InterviewState)> {
    while let Some(next) = next_question(tree, &state) {
        let key = next.key();
        let raw = answers.get(&key).map_or("", String::as_str);
        debug!(question = %key, "scripted answer");
        state = submit_answer(tree, &state, raw)?;
    }
    let draft = to_specification_draft(tree, &state)?;
    Ok((draft, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::TreeRegistry;

    fn dashboard() -> QuestionTree {
        TreeRegistry::builtin().unwrap().get("dashboard").unwrap().clone()
    }

    fn ml() -> QuestionTree {
        TreeRegistry::builtin().unwrap().get("ml_model").unwrap().clone()
    }

    const ML_INPUT: &str = concat!(
        "Churn\nPredict churn\n\nclustering\n4\nsilhouette\n\n",
        "customers.csv\n\n\nmodel_report\n\n\n\n",
    );

    #[test]
    fn reprompts_on_invalid_answer_and_confirms() {
        let tree = ml();
        // "seven" is rejected for problem_type, then "clustering" accepted;
        // 1 is below the minimum cluster count, then 4 accepted.
        let retried = ML_INPUT.replacen("clustering\n4", "seven\nclustering\n1\n4", 1);
        let input = format!("{retried}yes\n");
        let mut out = Vec::new();
        let session = InterviewSession::new(&tree, input.as_bytes(), &mut out);
        let outcome = session.run(InterviewState::start(&tree)).unwrap();

        let SessionOutcome::Confirmed(draft) = outcome else {
            panic!("expected confirmation");
        };
        let modeling = draft.content.get("modeling").unwrap();
        assert_eq!(modeling.get("expected_clusters").unwrap(), &Value::from(4));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("is not one of"), "{text}");
        assert!(text.contains("below the minimum"), "{text}");
        assert!(text.contains("== Summary =="));
    }

    #[test]
    fn declining_summary_cancels() {
        let tree = ml();
        let input = format!("{ML_INPUT}no\n");
        let mut out = Vec::new();
        let session = InterviewSession::new(&tree, input.as_bytes(), &mut out);
        assert_eq!(session.run(InterviewState::start(&tree)).unwrap(), SessionOutcome::Cancelled);
    }

    #[test]
    fn cancel_and_eof_stop_the_session() {
        let tree = dashboard();
        let mut out = Vec::new();
        let session = InterviewSession::new(&tree, "cancel\n".as_bytes(), &mut out);
        assert_eq!(session.run(InterviewState::start(&tree)).unwrap(), SessionOutcome::Cancelled);

        let mut out = Vec::new();
        let session = InterviewSession::new(&tree, "".as_bytes(), &mut out);
        assert_eq!(session.run(InterviewState::start(&tree)).unwrap(), SessionOutcome::Cancelled);
    }

    #[test]
    fn auto_confirm_skips_the_prompt() {
        let tree = ml();
        let mut out = Vec::new();
        let session =
            InterviewSession::new(&tree, ML_INPUT.as_bytes(), &mut out).auto_confirm(true);
        let outcome = session.run(InterviewState::start(&tree)).unwrap();
        assert!(matches!(outcome, SessionOutcome::Confirmed(_)));
    }

    #[test]
    fn answer_script_joins_lists() {
        let script = parse_answer_script(
            "metrics: [auc, recall]\nn_clusters: 4\ninterpretability: true\nnotes:\n",
        )
        .unwrap();
        assert_eq!(script["metrics"], "auc; recall");
        assert_eq!(script["n_clusters"], "4");
        assert_eq!(script["interpretability"], "true");
        assert_eq!(script["notes"], "");
        assert!(parse_answer_script("metrics: { a: 1 }").is_err());
        assert!(parse_answer_script("- not a mapping").is_err());
    }

    #[test]
    fn scripted_run_fails_on_missing_required_answer() {
        let tree = ml();
        let answers = BTreeMap::from([("project_name".to_string(), "Churn".to_string())]);
        assert!(matches!(
            run_scripted(&tree, InterviewState::start(&tree), &answers),
            Err(Error::RequiredQuestionUnanswered { ref question_id })
                if question_id == "problem_statement"
        ));
    }
}
