//! Specification store: current document, archived versions, changelog, and
//! the derived plan.
//!
//! The store is a directory accessed only through the `FileSystem` port:
//!
//! ```text
//! <root>/
//!   ├── specification.yaml     current version
//!   ├── changelog.yaml         one entry per version
//!   ├── history/
//!   │   └── v0001.yaml ...     every version older than the current one
//!   └── plan.yaml
//! ```
//!
//! Version history is append-only. A save archives the current document,
//! appends a changelog entry, then swaps the current file; every overwrite is
//! a write to a temporary file followed by a rename.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::context::ServiceContext;
use crate::error::{Error, Result};
use crate::plan::Plan;
use crate::spec::{SpecDraft, Specification};

const SPEC_FILE: &str = "specification.yaml";
const CHANGELOG_FILE: &str = "changelog.yaml";
const PLAN_FILE: &str = "plan.yaml";
const HISTORY_DIR: &str = "history";

/// One line of the changelog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    /// Version produced by the save.
    pub version: u32,
    /// Description given at save time.
    pub message: String,
    /// When the save happened.
    pub timestamp: DateTime<Utc>,
}

/// A version as listed by [`SpecStore::history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRef {
    /// Version number.
    pub version: u32,
    /// Changelog message of the save that produced it.
    pub message: String,
    /// When it was saved.
    pub timestamp: DateTime<Utc>,
    /// `true` for the version the current pointer resolves to.
    pub current: bool,
}

/// Versioned persistence for one project's specification and plan.
pub struct SpecStore<'a> {
    ctx: &'a ServiceContext,
    root: PathBuf,
}

impl<'a> SpecStore<'a> {
    /// Creates a store rooted at `root`. Nothing is read or written yet.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, root: &Path) -> Self {
        Self { ctx, root: root.to_path_buf() }
    }

    /// Store directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Commits an interview draft as version 1.
    ///
    /// # Errors
    ///
    /// Returns `SpecificationExists` if the store already holds a
    /// specification, or `SaveIo` if writing fails (nothing is left behind).
    pub fn create(&self, draft: &SpecDraft) -> Result<Specification> {
        if let Some(existing) = self.load()? {
            return Err(Error::SpecificationExists { version: existing.version });
        }
        let now = self.ctx.clock.now();
        let spec = Specification {
            version: 1,
            project_type: draft.project_type.clone(),
            domain_section: draft.domain_section.clone(),
            created_at: now,
            updated_at: now,
            content: draft.content.clone(),
        };
        let entries = vec![ChangelogEntry {
            version: 1,
            message: "Initial specification".into(),
            timestamp: now,
        }];

        self.write_yaml(&self.changelog_path(), &entries)?;
        if let Err(e) = self.write_yaml(&self.spec_path(), &spec) {
            self.discard(&self.changelog_path());
            return Err(e);
        }
        info!(project_type = %spec.project_type, "created specification v1");
        Ok(spec)
    }

    /// Loads the current version, or `None` if no specification exists.
    ///
    /// # Errors
    ///
    /// Returns `LoadIo` or `Corrupt` if the current file cannot be read.
    pub fn load(&self) -> Result<Option<Specification>> {
        let path = self.spec_path();
        if !self.ctx.fs.exists(&path) {
            return Ok(None);
        }
        self.read_yaml(&path).map(Some)
    }

    /// Loads the current version.
    ///
    /// # Errors
    ///
    /// Returns `SpecificationNotFound` if the store is empty.
    pub fn require(&self) -> Result<Specification> {
        self.load()?.ok_or(Error::SpecificationNotFound)
    }

    /// Saves `spec` as the next version and returns it.
    ///
    /// `spec` must carry the current version number, i.e. be derived from the
    /// document returned by `load`; the stored copy gets version `N + 1`.
    ///
    /// # Errors
    ///
    /// - `SpecificationNotFound` if the store is empty.
    /// - `VersionConflict` if `spec.version` is not the current version.
    /// - `SaveIo` if a write fails; the prior version stays current.
    pub fn save(&self, spec: &Specification, message: &str) -> Result<Specification> {
        let current = self.require()?;
        if spec.version != current.version {
            return Err(Error::VersionConflict { expected: current.version, found: spec.version });
        }
        self.commit_next(&current, spec, message)
    }

    /// Lists every version from 1 to the current one.
    ///
    /// # Errors
    ///
    /// Returns `SpecificationNotFound` if the store is empty, or a read error.
    pub fn history(&self) -> Result<Vec<VersionRef>> {
        let current = self.require()?;
        Ok(self
            .changelog()?
            .into_iter()
            .map(|e| VersionRef {
                current: e.version == current.version,
                version: e.version,
                message: e.message,
                timestamp: e.timestamp,
            })
            .collect())
    }

    /// Raw changelog entries in version order; empty for an empty store.
    ///
    /// # Errors
    ///
    /// Returns `LoadIo` or `Corrupt` if the changelog cannot be read.
    pub fn changelog(&self) -> Result<Vec<ChangelogEntry>> {
        let path = self.changelog_path();
        if !self.ctx.fs.exists(&path) {
            return Ok(Vec::new());
        }
        self.read_yaml(&path)
    }

    /// Loads version `n`, or `None` if it was never saved.
    ///
    /// # Errors
    ///
    /// Returns a read error if the version exists but cannot be loaded.
    pub fn load_version(&self, n: u32) -> Result<Option<Specification>> {
        let Some(current) = self.load()? else {
            return Ok(None);
        };
        if n == current.version {
            return Ok(Some(current));
        }
        if n == 0 || n > current.version {
            return Ok(None);
        }
        let path = self.archive_path(n);
        if !self.ctx.fs.exists(&path) {
            let reason = format!("archive for version {n} is missing");
            return Err(Error::Corrupt { path, reason });
        }
        self.read_yaml(&path).map(Some)
    }

    /// Copies version `n`'s content forward as a new version.
    ///
    /// The version counter never goes back: rolling back from v4 to v2
    /// creates v5 with v2's content.
    ///
    /// # Errors
    ///
    /// Returns `VersionNotFound` (without writing anything) if `n` does not
    /// exist, or `SaveIo` if the save fails.
    pub fn rollback_to_version(&self, n: u32) -> Result<Specification> {
        let current = self.require()?;
        let target = self.load_version(n)?.ok_or(Error::VersionNotFound { version: n })?;
        let restored = Specification { content: target.content, ..current.clone() };
        let spec = self.commit_next(&current, &restored, &format!("Rolled back to version {n}"))?;
        info!(from = current.version, to = n, version = spec.version, "rolled back specification");
        Ok(spec)
    }

    /// Persists the plan, replacing the previous one.
    ///
    /// # Errors
    ///
    /// Returns `SaveIo` if writing fails.
    pub fn save_plan(&self, plan: &Plan) -> Result<()> {
        self.write_yaml(&self.plan_path(), plan)?;
        debug!(plan = %plan.id, tasks = plan.tasks.len(), "saved plan");
        Ok(())
    }

    /// Loads the plan, or `None` if none was generated yet.
    ///
    /// # Errors
    ///
    /// Returns `LoadIo` or `Corrupt` if the plan file cannot be read.
    pub fn load_plan(&self) -> Result<Option<Plan>> {
        let path = self.plan_path();
        if !self.ctx.fs.exists(&path) {
            return Ok(None);
        }
        self.read_yaml(&path).map(Some)
    }

    /// Archives `current`, appends a changelog entry, and swaps in `next`
    /// with version `current.version + 1`. Steps already taken are undone if
    /// a later one fails.
    fn commit_next(
        &self,
        current: &Specification,
        next: &Specification,
        message: &str,
    ) -> Result<Specification> {
        let now = self.ctx.clock.now();
        let saved = Specification {
            version: current.version + 1,
            project_type: current.project_type.clone(),
            domain_section: current.domain_section.clone(),
            created_at: current.created_at,
            updated_at: now,
            content: next.content.clone(),
        };

        // Everything that can fail without writing happens first.
        let changelog_path = self.changelog_path();
        let previous_changelog = self.read_raw(&changelog_path)?;
        let mut entries = self.changelog()?;
        entries.retain(|e| e.version <= current.version);
        entries.push(ChangelogEntry {
            version: saved.version,
            message: message.to_string(),
            timestamp: now,
        });

        let archive = self.archive_path(current.version);
        // A leftover archive from an interrupted save holds the same
        // snapshot; archives are never rewritten.
        let archived_now = !self.ctx.fs.exists(&archive);
        if archived_now {
            self.write_yaml(&archive, current)?;
        }

        if let Err(e) = self.write_yaml(&changelog_path, &entries) {
            if archived_now {
                self.discard(&archive);
            }
            return Err(e);
        }

        if let Err(e) = self.write_yaml(&self.spec_path(), &saved) {
            match previous_changelog {
                Some(raw) => {
                    if let Err(restore) = self.write_atomic(&changelog_path, &raw) {
                        warn!(error = %restore, "could not restore changelog after failed save");
                    }
                }
                None => self.discard(&changelog_path),
            }
            if archived_now {
                self.discard(&archive);
            }
            return Err(e);
        }

        info!(version = saved.version, description = message, "saved specification");
        Ok(saved)
    }

    fn read_raw(&self, path: &Path) -> Result<Option<String>> {
        if !self.ctx.fs.exists(path) {
            return Ok(None);
        }
        self.ctx
            .fs
            .read_to_string(path)
            .map(Some)
            .map_err(|source| Error::LoadIo { path: path.to_path_buf(), source })
    }

    fn read_yaml<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let contents = self
            .ctx
            .fs
            .read_to_string(path)
            .map_err(|source| Error::LoadIo { path: path.to_path_buf(), source })?;
        serde_yaml::from_str(&contents)
            .map_err(|e| Error::Corrupt { path: path.to_path_buf(), reason: e.to_string() })
    }

    fn write_yaml<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let yaml = serde_yaml::to_string(value)
            .map_err(|e| Error::Corrupt { path: path.to_path_buf(), reason: e.to_string() })?;
        self.write_atomic(path, &yaml)
    }

    fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let tmp = temp_path(path);
        self.ctx
            .fs
            .write(&tmp, contents)
            .map_err(|source| Error::SaveIo { path: path.to_path_buf(), source })?;
        if let Err(source) = self.ctx.fs.rename(&tmp, path) {
            self.discard(&tmp);
            return Err(Error::SaveIo { path: path.to_path_buf(), source });
        }
        Ok(())
    }

    /// Best-effort removal used while compensating a failed save.
    fn discard(&self, path: &Path) {
        if let Err(error) = self.ctx.fs.remove_file(path) {
            warn!(
                path = %path.display(),
                %error,
                "could not remove file during rollback of a failed save"
            );
        }
    }

    fn spec_path(&self) -> PathBuf {
        self.root.join(SPEC_FILE)
    }

    fn changelog_path(&self) -> PathBuf {
        self.root.join(CHANGELOG_FILE)
    }

    fn plan_path(&self) -> PathBuf {
        self.root.join(PLAN_FILE)
    }

    fn archive_path(&self, version: u32) -> PathBuf {
        self.root.join(HISTORY_DIR).join(format!("v{version:04}.yaml"))
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
