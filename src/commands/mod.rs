//! Command dispatch and handlers.

pub mod history;
pub mod interview;
pub mod plan;
pub mod spec;
pub mod task;
pub mod trees;

use std::path::Path;

use tracing::debug;

use crate::cli::{Command, PlanCommand};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::error::Result;
use crate::interview::TreeRegistry;
use crate::store::SpecStore;

/// Everything a handler needs: ports, resolved config, and question trees.
pub struct Workspace {
    /// Port adapters.
    pub ctx: ServiceContext,
    /// Resolved configuration.
    pub config: Config,
    /// Built-in trees plus any from `config.trees_dir`.
    pub registry: TreeRegistry,
}

impl Workspace {
    /// Builds a workspace, loading custom trees when configured.
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in or custom tree is invalid.
    pub fn open(ctx: ServiceContext, config: Config) -> Result<Self> {
        let mut registry = TreeRegistry::builtin()?;
        if let Some(dir) = &config.trees_dir {
            registry.load_dir(ctx.fs.as_ref(), dir)?;
        }
        debug!(store = %config.store_root.display(), "workspace ready");
        Ok(Self { ctx, config, registry })
    }

    /// The specification store under `config.store_root`.
    #[must_use]
    pub fn store(&self) -> SpecStore<'_> {
        SpecStore::new(&self.ctx, &self.config.store_root)
    }

    /// Reads a user-supplied file through the filesystem port.
    ///
    /// # Errors
    ///
    /// Returns `LoadIo` if the file cannot be read.
    pub fn read_file(&self, path: &Path) -> Result<String> {
        self.ctx
            .fs
            .read_to_string(path)
            .map_err(|source| crate::error::Error::LoadIo { path: path.to_path_buf(), source })
    }
}

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command, ws: &Workspace) -> std::result::Result<(), String> {
    dispatch_inner(command, ws).map_err(|e| e.to_string())
}

fn dispatch_inner(command: &Command, ws: &Workspace) -> Result<()> {
    match command {
        Command::Trees => trees::run(ws),
        Command::Interview { project_type, answers, yes } => {
            interview::run(ws, project_type, answers.as_deref(), *yes)
        }
        Command::Show { path, version } => spec::show(ws, path.as_deref(), *version),
        Command::Set { path, value, message } => spec::set(ws, path, value, message.as_deref()),
        Command::History => history::list(ws),
        Command::Diff { from, to } => history::diff(ws, *from, *to),
        Command::Rollback { version } => history::rollback(ws, *version),
        Command::Plan(PlanCommand::Generate { profiles, force }) => {
            plan::generate(ws, profiles, *force)
        }
        Command::Plan(PlanCommand::Show) => plan::show(ws),
        Command::Plan(PlanCommand::Sync) => plan::sync(ws),
        Command::Task { id, status } => task::run(ws, id, *status),
    }
}
