//! Configuration for specwright.
//!
//! Resolution order: an explicit `--config` file, else `SPECWRIGHT_CONFIG`,
//! else `./specwright.yml` when present, else defaults. `SPECWRIGHT_STORE`
//! and `SPECWRIGHT_LOG` override the file's values.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ports::FileSystem;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SPECWRIGHT_CONFIG";
/// Environment variable overriding `store_root`.
pub const STORE_ENV: &str = "SPECWRIGHT_STORE";
/// Environment variable overriding `log_level`.
pub const LOG_ENV: &str = "SPECWRIGHT_LOG";
/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "specwright.yml";

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the specification, history, changelog and plan
    #[serde(default = "default_store_root")]
    pub store_root: PathBuf,

    /// Extra question trees (`*.yaml`), overriding built-ins by project type
    #[serde(default)]
    pub trees_dir: Option<PathBuf>,

    /// Log level used when `--log-level` is not given
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_store_root() -> PathBuf {
    PathBuf::from(".specwright")
}

impl Default for Config {
    fn default() -> Self {
        Self { store_root: default_store_root(), trees_dir: None, log_level: None }
    }
}

impl Config {
    /// Loads the config, reading files through `fs` and variables through
    /// `env`.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a named file is missing or unparsable.
    pub fn load(
        fs: &dyn FileSystem,
        explicit: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let from_env = env(CONFIG_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::read(fs, &path)?,
            None if fs.exists(Path::new(DEFAULT_CONFIG_FILE)) => {
                Self::read(fs, Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Some(store) = env(STORE_ENV).filter(|v| !v.is_empty()) {
            config.store_root = PathBuf::from(store);
        }
        if let Some(level) = env(LOG_ENV).filter(|v| !v.is_empty()) {
            config.log_level = Some(level);
        }
        Ok(config)
    }

    fn read(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        let content = fs
            .read_to_string(path)
            .map_err(|e| Error::Config { reason: format!("cannot read {}: {e}", path.display()) })?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config { reason: format!("cannot parse {}: {e}", path.display()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_files_or_env() {
        let config = Config::load(&MemoryFileSystem::new(), None, env(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.store_root, PathBuf::from(".specwright"));
    }

    #[test]
    fn explicit_file_then_env_overrides() {
        let fs = MemoryFileSystem::new();
        let yaml = "store_root: /data/spec\ntrees_dir: /data/trees\nlog_level: info\n";
        fs.write(Path::new("/etc/sw.yml"), yaml).unwrap();

        let config = Config::load(&fs, Some(Path::new("/etc/sw.yml")), env(&[])).unwrap();
        assert_eq!(config.store_root, PathBuf::from("/data/spec"));
        assert_eq!(config.trees_dir, Some(PathBuf::from("/data/trees")));

        let overrides = env(&[(STORE_ENV, "/tmp/s"), (LOG_ENV, "debug")]);
        let config = Config::load(&fs, Some(Path::new("/etc/sw.yml")), overrides).unwrap();
        assert_eq!(config.store_root, PathBuf::from("/tmp/s"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn config_env_names_the_file() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/cfg.yml"), "log_level: trace\n").unwrap();
        let config = Config::load(&fs, None, env(&[(CONFIG_ENV, "/cfg.yml")])).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("trace"));
        assert_eq!(config.store_root, PathBuf::from(".specwright"));
    }

    #[test]
    fn missing_or_bad_file_is_an_error() {
        let fs = MemoryFileSystem::new();
        assert!(matches!(
            Config::load(&fs, Some(Path::new("/nope.yml")), env(&[])),
            Err(Error::Config { .. })
        ));
        fs.write(Path::new("/bad.yml"), "store_root: [").unwrap();
        assert!(Config::load(&fs, Some(Path::new("/bad.yml")), env(&[])).is_err());
    }
}
