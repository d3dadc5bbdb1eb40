//! Lookup of question trees by project type.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::ports::FileSystem;

use super::tree::QuestionTree;

/// Trees compiled into the binary.
const BUILTIN_TREES: [(&str, &str); 3] = [
    ("ml_model.yaml", include_str!("trees/ml_model.yaml")),
    ("analytics.yaml", include_str!("trees/analytics.yaml")),
    ("dashboard.yaml", include_str!("trees/dashboard.yaml")),
];

/// Validated question trees keyed by project type.
#[derive(Debug, Clone, Default)]
pub struct TreeRegistry {
    trees: BTreeMap<String, QuestionTree>,
}

impl TreeRegistry {
    /// Creates a registry holding the built-in trees.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTree` if an embedded definition fails to parse or
    /// validate.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::default();
        for (name, source) in BUILTIN_TREES {
            registry.insert(parse_tree(name, source)?)?;
        }
        Ok(registry)
    }

    /// Loads every `*.yaml` / `*.yml` tree in `dir`, replacing built-in trees
    /// of the same project type. Returns how many trees were loaded.
    ///
    /// # Errors
    ///
    /// Returns `LoadIo` if the directory or a file cannot be read, and
    /// `InvalidTree` if a definition is malformed.
    pub fn load_dir(&mut self, fs: &dyn FileSystem, dir: &Path) -> Result<usize> {
        let entries = fs
            .list_dir(dir)
            .map_err(|source| Error::LoadIo { path: dir.to_path_buf(), source })?;
        let mut loaded = 0;
        for name in entries.iter().filter(|n| n.ends_with(".yaml") || n.ends_with(".yml")) {
            let path = dir.join(name);
            let source = fs
                .read_to_string(&path)
                .map_err(|source| Error::LoadIo { path: path.clone(), source })?;
            let tree = parse_tree(name, &source)?;
            debug!(
                project_type = %tree.project_type,
                file = %path.display(),
                "loaded question tree"
            );
            self.insert(tree)?;
            loaded += 1;
        }
        info!(count = loaded, dir = %dir.display(), "loaded custom question trees");
        Ok(loaded)
    }

    /// Validates and registers a tree.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTree` if validation fails.
    pub fn insert(&mut self, tree: QuestionTree) -> Result<()> {
        tree.validate()?;
        self.trees.insert(tree.project_type.clone(), tree);
        Ok(())
    }

    /// Returns the tree for `project_type`.
    ///
    /// # Errors
    ///
    /// Returns `TreeNotFound` listing the registered project types.
    pub fn get(&self, project_type: &str) -> Result<&QuestionTree> {
        self.trees.get(project_type).ok_or_else(|| Error::TreeNotFound {
            project_type: project_type.to_string(),
            available: self.trees.keys().cloned().collect(),
        })
    }

    /// Registered trees, sorted by project type.
    pub fn trees(&self) -> impl Iterator<Item = &QuestionTree> {
        self.trees.values()
    }
}

fn parse_tree(name: &str, source: &str) -> Result<QuestionTree> {
    serde_yaml::from_str(source).map_err(|e| Error::InvalidTree {
        project_type: name.trim_end_matches(".yaml").trim_end_matches(".yml").to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryFileSystem;

    #[test]
    fn builtin_trees_are_valid() {
        let registry = TreeRegistry::builtin().unwrap();
        let types: Vec<&str> = registry.trees().map(|t| t.project_type.as_str()).collect();
        assert_eq!(types, vec!["analytics", "dashboard", "ml_model"]);
        assert_eq!(registry.get("ml_model").unwrap().domain_section, "modeling");
    }

    #[test]
    fn unknown_project_type_is_tree_not_found() {
        let registry = TreeRegistry::builtin().unwrap();
        match registry.get("robotics") {
            Err(Error::TreeNotFound { available, .. }) => assert_eq!(available.len(), 3),
            other => panic!("expected TreeNotFound, got {other:?}"),
        }
    }

    #[test]
    fn load_dir_overrides_and_adds() {
        let fs = MemoryFileSystem::new();
        fs.write(
            Path::new("/trees/survey.yaml"),
            concat!(
                "project_type: survey\ntitle: Survey\ndomain_section: survey\n",
                "sections:\n  - id: s\n    title: S\n    questions:\n",
                "      - { id: audience, prompt: Who?, type: text, maps_to: survey.audience }\n",
            ),
        )
        .unwrap();
        fs.write(Path::new("/trees/README.md"), "ignored").unwrap();

        let mut registry = TreeRegistry::builtin().unwrap();
        assert_eq!(registry.load_dir(&fs, Path::new("/trees")).unwrap(), 1);
        assert_eq!(registry.get("survey").unwrap().len(), 1);
    }

    #[test]
    fn load_dir_rejects_malformed_tree() {
        let fs = MemoryFileSystem::new();
        fs.write(Path::new("/trees/bad.yaml"), "project_type: [oops").unwrap();
        let mut registry = TreeRegistry::default();
        assert!(matches!(
            registry.load_dir(&fs, Path::new("/trees")),
            Err(Error::InvalidTree { .. })
        ));
    }
}
