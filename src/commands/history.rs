//! `specwright history`, `diff` and `rollback` commands.

use crate::diff::{compute_diff, format_diff};
use crate::error::{Error, Result};

use super::spec::report_sync;
use super::Workspace;

/// Lists every version, marking the current one.
///
/// # Errors
///
/// Returns `SpecificationNotFound` or a read error.
pub fn list(ws: &Workspace) -> Result<()> {
    for v in ws.store().history()? {
        let marker = if v.current { "*" } else { " " };
        println!(
            "{marker} v{:<4} {}  {}",
            v.version,
            v.timestamp.format("%Y-%m-%d %H:%M:%S"),
            v.message
        );
    }
    Ok(())
}

/// Prints the changes from version `from` to `to` (default: current).
///
/// # Errors
///
/// Returns `VersionNotFound` if either version does not exist.
pub fn diff(ws: &Workspace, from: u32, to: Option<u32>) -> Result<()> {
    let store = ws.store();
    let current = store.require()?;
    let to = to.unwrap_or(current.version);
    let load = |n: u32| store.load_version(n)?.ok_or(Error::VersionNotFound { version: n });
    let before = load(from)?;
    let after = load(to)?;
    println!("v{from} -> v{to}");
    println!("{}", format_diff(&compute_diff(&before, &after)));
    Ok(())
}

/// Restores version `version`'s content as a new version, then syncs the
/// plan.
///
/// # Errors
///
/// Returns `VersionNotFound` (nothing written) or `SaveIo`.
pub fn rollback(ws: &Workspace, version: u32) -> Result<()> {
    let store = ws.store();
    let previous = store.require()?;
    let spec = store.rollback_to_version(version)?;
    println!("Restored v{version} as v{}", spec.version);
    println!("{}", format_diff(&compute_diff(&previous, &spec)));
    report_sync(ws, &spec)
}
