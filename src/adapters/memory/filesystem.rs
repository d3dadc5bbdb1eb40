//! In-memory filesystem with write-failure injection.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::PortError;
use crate::ports::filesystem::FileSystem;

#[derive(Default)]
struct Inner {
    files: BTreeMap<PathBuf, String>,
    /// File names (final path component) whose writes or renames fail.
    failing: Vec<String>,
}

/// Map-backed filesystem. Clones share the same contents, so a test can keep
/// a handle after moving one into a `ServiceContext`.
#[derive(Clone, Default)]
pub struct MemoryFileSystem {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write or rename targeting a file named `name`
    /// fail with an I/O error.
    pub fn fail_writes_to(&self, name: &str) {
        self.lock().failing.push(name.to_string());
    }

    /// Clears all injected failures.
    pub fn heal(&self) {
        self.lock().failing.clear();
    }

    /// Returns every stored path, sorted.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn check_failing(inner: &Inner, path: &Path) -> Result<(), PortError> {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    if inner.failing.iter().any(|f| *f == name) {
        return Err(format!("injected write failure: {}", path.display()).into());
    }
    Ok(())
}

impl FileSystem for MemoryFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, PortError> {
        self.lock()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| format!("file not found: {}", path.display()).into())
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), PortError> {
        let mut inner = self.lock();
        check_failing(&inner, path)?;
        inner.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), PortError> {
        let mut inner = self.lock();
        check_failing(&inner, to)?;
        let contents = inner
            .files
            .remove(from)
            .ok_or_else(|| format!("file not found: {}", from.display()))?;
        inner.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<(), PortError> {
        self.lock()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| format!("file not found: {}", path.display()).into())
    }

    fn exists(&self, path: &Path) -> bool {
        let inner = self.lock();
        inner.files.contains_key(path) || inner.files.keys().any(|k| k.starts_with(path))
    }

    fn list_dir(&self, path: &Path) -> Result<Vec<String>, PortError> {
        let inner = self.lock();
        Ok(inner
            .files
            .keys()
            .filter(|k| k.parent() == Some(path))
            .filter_map(|k| k.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_contents() {
        let fs = MemoryFileSystem::new();
        let handle = fs.clone();
        fs.write(Path::new("/s/a.yaml"), "a").unwrap();
        assert_eq!(handle.read_to_string(Path::new("/s/a.yaml")).unwrap(), "a");
        assert!(handle.exists(Path::new("/s")));
    }

    #[test]
    fn injected_failure_blocks_write_and_rename() {
        let fs = MemoryFileSystem::new();
        fs.fail_writes_to("changelog.yaml");
        assert!(fs.write(Path::new("/s/changelog.yaml"), "x").is_err());

        fs.write(Path::new("/s/changelog.yaml.tmp"), "x").unwrap();
        assert!(fs
            .rename(Path::new("/s/changelog.yaml.tmp"), Path::new("/s/changelog.yaml"))
            .is_err());

        fs.heal();
        fs.rename(Path::new("/s/changelog.yaml.tmp"), Path::new("/s/changelog.yaml")).unwrap();
        assert_eq!(fs.list_dir(Path::new("/s")).unwrap(), vec!["changelog.yaml"]);
    }
}
