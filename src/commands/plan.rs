//! `specwright plan` commands.

use std::path::PathBuf;

use tracing::info;

use crate::diff::compute_diff;
use crate::error::{Error, Result};
use crate::plan::{assess_impact, format_impact, generate_plan, update_plan_from_diff, DataProfile};
use crate::spec::Specification;

use super::Workspace;

/// Generates a plan from the current specification.
///
/// # Errors
///
/// Returns `SpecificationNotFound`, `Config` if a plan already exists and
/// `force` is not set or a profile file is malformed, or a store error.
pub fn generate(ws: &Workspace, profile_files: &[PathBuf], force: bool) -> Result<()> {
    let store = ws.store();
    let spec = store.require()?;
    if !force {
        if let Some(existing) = store.load_plan()? {
            return Err(Error::Config {
                reason: format!(
                    "plan {} already exists ({} tasks); use `plan sync` to update it \
                     or --force to replace it",
                    existing.id,
                    existing.tasks.len()
                ),
            });
        }
    }

    let mut profiles = Vec::new();
    for path in profile_files {
        profiles.extend(parse_profiles(&ws.read_file(path)?).map_err(|reason| Error::Config {
            reason: format!("profile {}: {reason}", path.display()),
        })?);
    }

    let plan = generate_plan(&spec, &profiles, &ws.ctx.id_gen.generate_id(), ws.ctx.clock.now());
    store.save_plan(&plan)?;
    info!(plan = %plan.id, tasks = plan.tasks.len(), "generated plan");
    println!("{}", plan.render());
    Ok(())
}

/// Prints the plan.
///
/// # Errors
///
/// Returns `Config` if no plan has been generated yet.
pub fn show(ws: &Workspace) -> Result<()> {
    let plan = ws.store().load_plan()?.ok_or_else(no_plan)?;
    println!("{}", plan.render());
    Ok(())
}

/// Syncs the plan with the current specification version.
///
/// # Errors
///
/// Returns `SpecificationNotFound`, `Config` without a plan, or a store error.
pub fn sync(ws: &Workspace) -> Result<()> {
    let spec = ws.store().require()?;
    match sync_to(ws, &spec)? {
        Some(summary) => println!("{summary}"),
        None => println!("No plan to sync; run `specwright plan generate` first."),
    }
    Ok(())
}

/// Diffs the plan's specification version against `spec`, applies the
/// impact, and saves the plan. Returns the impact summary, or `None` when
/// there is no plan.
pub(crate) fn sync_to(ws: &Workspace, spec: &Specification) -> Result<Option<String>> {
    let store = ws.store();
    let Some(plan) = store.load_plan()? else {
        return Ok(None);
    };
    if plan.spec_version == spec.version {
        return Ok(Some(format!("Plan {} is already at v{}.", plan.id, spec.version)));
    }
    let base = store
        .load_version(plan.spec_version)?
        .ok_or(Error::VersionNotFound { version: plan.spec_version })?;

    let diff = compute_diff(&base, spec);
    let report = assess_impact(&diff, &plan);
    let mut update = update_plan_from_diff(&diff, &plan, ws.ctx.clock.now());
    update.plan.spec_version = spec.version;
    store.save_plan(&update.plan)?;
    info!(
        from = plan.spec_version,
        to = spec.version,
        reclassified = update.reclassified.len(),
        added = update.added.len(),
        "synced plan"
    );
    Ok(Some(format!(
        "Plan synced v{} -> v{}\n{}",
        plan.spec_version,
        spec.version,
        format_impact(&report)
    )))
}

pub(crate) fn no_plan() -> Error {
    Error::Config { reason: "no plan yet; run `specwright plan generate` first".into() }
}

/// Accepts a single profile or a list of profiles.
fn parse_profiles(source: &str) -> std::result::Result<Vec<DataProfile>, String> {
    if let Ok(list) = serde_yaml::from_str::<Vec<DataProfile>>(source) {
        return Ok(list);
    }
    serde_yaml::from_str::<DataProfile>(source).map(|p| vec![p]).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_accept_one_or_many() {
        let one = parse_profiles("source: a.csv\nrows: 10\nquality_issues: [nulls]\n").unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].columns, 0);
        let many = parse_profiles("- source: a.csv\n- source: b.csv\n").unwrap();
        assert_eq!(many.len(), 2);
        assert!(parse_profiles("rows: 10").is_err());
    }
}
