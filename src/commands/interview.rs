//! `specwright interview` command.

use std::io::{self, BufRead, Write};
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::interview::{
    parse_answer_script, run_scripted, InterviewSession, InterviewState, SessionOutcome,
};
use crate::spec::SpecDraft;

use super::Workspace;

/// Runs the interview for `project_type` and commits the confirmed draft as
/// version 1.
///
/// With `answers`, questions are answered from the file instead of the
/// terminal. Without `yes`, the draft is only stored after the user types
/// `yes`.
///
/// # Errors
///
/// Returns `TreeNotFound`, `SpecificationExists`, an interview error from a
/// scripted run, or a store error.
pub fn run(ws: &Workspace, project_type: &str, answers: Option<&Path>, yes: bool) -> Result<()> {
    let tree = ws.registry.get(project_type)?;
    let store = ws.store();
    if let Some(existing) = store.load()? {
        return Err(Error::SpecificationExists { version: existing.version });
    }
    let state = InterviewState::start(tree);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let outcome = match answers {
        Some(path) => {
            let script = parse_answer_script(&ws.read_file(path)?)?;
            let (draft, state) = run_scripted(tree, state, &script)?;
            for warning in &state.warnings {
                eprintln!("warning: {warning}");
            }
            if yes {
                SessionOutcome::Confirmed(draft)
            } else {
                confirm(draft, stdin.lock(), stdout.lock())?
            }
        }
        None => InterviewSession::new(tree, stdin.lock(), stdout.lock())
            .auto_confirm(yes)
            .run(state)?,
    };

    match outcome {
        SessionOutcome::Confirmed(draft) => {
            let spec = store.create(&draft)?;
            info!(project_type, "interview committed");
            println!("Created specification v{} in {}", spec.version, store.root().display());
        }
        SessionOutcome::Cancelled => println!("Nothing saved."),
    }
    Ok(())
}

/// Prints a scripted draft and asks for confirmation.
fn confirm(
    draft: SpecDraft,
    mut reader: impl BufRead,
    mut writer: impl Write,
) -> Result<SessionOutcome> {
    let summary = serde_yaml::to_string(&draft.content)
        .map_err(|e| Error::Corrupt { path: "<draft>".into(), reason: e.to_string() })?;
    write!(writer, "{summary}\nSave this specification? Type 'yes' to confirm: ")?;
    writer.flush()?;
    let mut line = String::new();
    reader.read_line(&mut line)?;
    if line.trim().eq_ignore_ascii_case("yes") {
        Ok(SessionOutcome::Confirmed(draft))
    } else {
        Ok(SessionOutcome::Cancelled)
    }
}
