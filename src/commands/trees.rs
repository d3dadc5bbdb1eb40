//! `specwright trees` command.

use crate::error::Result;

use super::Workspace;

/// Lists every registered project type.
///
/// # Errors
///
/// Never fails; returns `Result` like the other handlers.
#[allow(clippy::unnecessary_wraps)]
pub fn run(ws: &Workspace) -> Result<()> {
    println!("Available project types:");
    for tree in ws.registry.trees() {
        println!(
            "  {:<12} {} ({} questions, domain section '{}')",
            tree.project_type,
            tree.title,
            tree.len(),
            tree.domain_section
        );
    }
    println!("\nUse `specwright interview <PROJECT_TYPE>` to start.");
    Ok(())
}
