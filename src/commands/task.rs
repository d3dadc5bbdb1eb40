//! `specwright task` command.

use crate::error::Result;
use crate::plan::{update_task_status, TaskStatus};

use super::plan::no_plan;
use super::Workspace;

/// Sets a task's status on behalf of the execution driver.
///
/// # Errors
///
/// Returns `TaskNotFound`, `InvalidStatusTransition`, or `Config` when no
/// plan exists.
pub fn run(ws: &Workspace, id: &str, status: TaskStatus) -> Result<()> {
    let store = ws.store();
    let plan = store.load_plan()?.ok_or_else(no_plan)?;
    let updated = update_task_status(&plan, id, status, ws.ctx.clock.now())?;
    store.save_plan(&updated)?;
    if let Some(task) = updated.task(id) {
        let from = plan.task(id).map_or(status, |t| t.status);
        println!("{} {from} -> {}: {}", task.id, task.status, task.description);
    }
    Ok(())
}
