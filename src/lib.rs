//! Interview-driven project specifications.
//!
//! A question tree turns answers into a specification document
//! ([`interview`]). The [`store`] keeps every version with a changelog and
//! supports rollback. [`diff`] computes structural deltas between versions,
//! and [`plan`] keeps a derived task list consistent with them.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod diff;
pub mod error;
pub mod interview;
pub mod plan;
pub mod ports;
pub mod spec;
pub mod store;

use clap::Parser;

pub use error::{Error, Result};

/// Run the CLI with the provided arguments against the live filesystem.
///
/// Logging is left to the caller; the binary sets it up before calling
/// [`commands::dispatch`] itself.
///
/// # Errors
///
/// Returns an error string when argument parsing, configuration, or command
/// execution fails.
pub fn run<I, T>(args: I) -> std::result::Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    let ws = open_workspace(&cli).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command, &ws)
}

/// Loads configuration for `cli` and opens a live workspace.
///
/// # Errors
///
/// Returns `Config` or `InvalidTree` errors.
pub fn open_workspace(cli: &cli::Cli) -> Result<commands::Workspace> {
    let ctx = context::ServiceContext::live();
    let env = |key: &str| std::env::var(key).ok();
    let config = config::Config::load(ctx.fs.as_ref(), cli.config.as_deref(), env)?;
    commands::Workspace::open(ctx, config)
}
