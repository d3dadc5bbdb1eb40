//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::plan::TaskStatus;

/// Top-level CLI parser for `specwright`.
#[derive(Debug, Parser)]
#[command(
    name = "specwright",
    version,
    about = "Interview-driven project specifications with version history and plan tracking"
)]
pub struct Cli {
    /// Config file (defaults to $SPECWRIGHT_CONFIG, then ./specwright.yml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the available project types.
    Trees,
    /// Run the interview and store the result as version 1.
    Interview {
        /// Project type, e.g. `ml_model`.
        project_type: String,
        /// YAML file of answers keyed by question id; runs without prompting.
        #[arg(long)]
        answers: Option<PathBuf>,
        /// Skip the final confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Print the specification or one section of it.
    Show {
        /// Dotted section path, e.g. `modeling.target_variable`.
        path: Option<String>,
        /// Show an older version instead of the current one.
        #[arg(long)]
        version: Option<u32>,
    },
    /// Set a section value and save a new version.
    Set {
        /// Dotted section path.
        path: String,
        /// New value, parsed as YAML (`[a, b]`, `42`, `true`, or text).
        value: String,
        /// Changelog message.
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List every version with its changelog message.
    History,
    /// Show the changes between two versions.
    Diff {
        /// Older version.
        from: u32,
        /// Newer version (defaults to the current one).
        to: Option<u32>,
    },
    /// Restore an earlier version's content as a new version.
    Rollback {
        /// Version whose content to restore.
        version: u32,
    },
    /// Manage the execution plan.
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Record progress on a task.
    Task {
        /// Task id, e.g. `T003`.
        id: String,
        /// New status: pending, in_progress, done, or blocked.
        status: TaskStatus,
    },
}

/// `specwright plan` subcommands.
#[derive(Debug, Subcommand)]
pub enum PlanCommand {
    /// Generate a plan from the current specification.
    Generate {
        /// Data profile YAML files (one profile or a list per file).
        #[arg(long = "profile")]
        profiles: Vec<PathBuf>,
        /// Replace an existing plan.
        #[arg(long)]
        force: bool,
    },
    /// Print the plan.
    Show,
    /// Bring the plan up to date with the current specification.
    Sync,
}
