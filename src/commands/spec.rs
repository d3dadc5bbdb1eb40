//! `specwright show` and `specwright set` commands.

use serde_yaml::Value;

use crate::diff::{compute_diff, format_diff};
use crate::error::{Error, Result};
use crate::spec::Specification;

use super::{plan, Workspace};

/// Prints the current (or a given) version, whole or one section.
///
/// # Errors
///
/// Returns `SpecificationNotFound`, `VersionNotFound`, or
/// `InvalidSectionPath` with the available paths.
pub fn show(ws: &Workspace, path: Option<&str>, version: Option<u32>) -> Result<()> {
    let store = ws.store();
    let spec = match version {
        Some(n) => {
            store.require()?;
            store.load_version(n)?.ok_or(Error::VersionNotFound { version: n })?
        }
        None => store.require()?,
    };

    match path {
        Some(p) => print!("{}", to_yaml(spec.get_section(p)?)?),
        None => {
            println!(
                "# {} specification v{} (updated {})",
                spec.project_type,
                spec.version,
                spec.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            print!("{}", to_yaml(&spec.content)?);
        }
    }
    Ok(())
}

/// Stores `raw` at `path` as a new version, then syncs the plan.
///
/// `raw` is read as YAML so lists, numbers and booleans keep their type;
/// anything else is stored as text.
///
/// # Errors
///
/// Returns `SpecificationNotFound`, `InvalidSectionPath`, or `SaveIo`.
pub fn set(ws: &Workspace, path: &str, raw: &str, message: Option<&str>) -> Result<()> {
    let store = ws.store();
    let current = store.require()?;
    let edited = current.with_section(path, parse_value(raw))?;
    if edited.same_content(&current) {
        println!("{path} already has that value; nothing saved.");
        return Ok(());
    }

    let default_message = format!("Set {path}");
    let saved = store.save(&edited, message.unwrap_or(&default_message))?;
    println!("Saved specification v{}", saved.version);
    println!("{}", format_diff(&compute_diff(&current, &saved)));
    report_sync(ws, &saved)
}

/// Runs plan sync after a save and prints the impact, if a plan exists.
pub(crate) fn report_sync(ws: &Workspace, spec: &Specification) -> Result<()> {
    if let Some(summary) = plan::sync_to(ws, spec)? {
        println!("\n{summary}");
    }
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::String(raw.to_string());
    }
    match serde_yaml::from_str::<Value>(raw) {
        Ok(Value::Null) | Err(_) => Value::String(raw.to_string()),
        Ok(value) => value,
    }
}

fn to_yaml<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value)
        .map_err(|e| Error::Corrupt { path: "<output>".into(), reason: e.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_their_yaml_type() {
        assert_eq!(parse_value("churn_60d"), Value::from("churn_60d"));
        assert_eq!(parse_value("42"), Value::from(42));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert!(matches!(parse_value("[auc, f1]"), Value::Sequence(ref s) if s.len() == 2));
        assert_eq!(parse_value("null"), Value::from("null"));
        assert_eq!(parse_value("a: [b"), Value::from("a: [b"));
    }
}
