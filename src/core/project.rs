//! Project discovery and structure
//!
//! A project is a directory holding a `.taxo/` marker directory (with the
//! project config) and a data directory with one JSON file per collection.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::store::Store;

/// Name of the marker directory
pub const PROJECT_DIR: &str = ".taxo";

/// Default data directory, relative to the project root
pub const DEFAULT_DATA_DIR: &str = "data";

/// Represents a taxonomy project
#[derive(Debug, Clone)]
pub struct Project {
    /// Root directory of the project (parent of .taxo/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open an explicit project root, without walking up
    pub fn at(root: &Path) -> Result<Self, ProjectError> {
        if root.join(PROJECT_DIR).is_dir() {
            Ok(Self {
                root: root.to_path_buf(),
            })
        } else {
            Err(ProjectError::NotFound {
                searched_from: root.to_path_buf(),
            })
        }
    }

    /// Create a new project at the given path, with collections under
    /// `data_dir` (relative to the root unless absolute)
    ///
    /// With `force`, an existing `.taxo/` is reused and its config rewritten;
    /// existing collection files are never truncated.
    pub fn init(path: &Path, force: bool, data_dir: &str) -> Result<Self, ProjectError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let marker = root.join(PROJECT_DIR);
        if marker.exists() && !force {
            return Err(ProjectError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&marker).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(marker.join("config.yaml"), Self::default_config(data_dir)?)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        let project = Self { root };
        Store::open(project.data_dir(data_dir))
            .init()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(project)
    }

    fn default_config(data_dir: &str) -> Result<String, ProjectError> {
        let data_dir = serde_yml::to_string(&data_dir)
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Ok(format!(
            r#"# Taxonomy project configuration

# Directory holding the collection files, relative to the project root
data_dir: {}

# Default output format (auto, json, yaml, tsv, md, id)
# default_format: auto

# Log filter used when TAXO_LOG / RUST_LOG are unset
# log_level: warn
"#,
            data_dir.trim_end()
        ))
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .taxo configuration directory
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Resolve a data directory setting against the project root
    pub fn data_dir(&self, setting: &str) -> PathBuf {
        let path = Path::new(setting);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a taxonomy project (searched from {searched_from:?}). Run 'taxo init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("taxonomy project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityKind;
    use tempfile::tempdir;

    #[test]
    fn test_project_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false, DEFAULT_DATA_DIR).unwrap();

        assert!(project.config_dir().join("config.yaml").exists());
        for kind in EntityKind::all() {
            assert!(project
                .data_dir(DEFAULT_DATA_DIR)
                .join(kind.file_name())
                .exists());
        }
    }

    #[test]
    fn test_project_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false, DEFAULT_DATA_DIR).unwrap();

        let err = Project::init(tmp.path(), false, DEFAULT_DATA_DIR).unwrap_err();
        assert!(matches!(err, ProjectError::AlreadyExists(_)));
    }

    #[test]
    fn test_project_force_init_keeps_data() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false, DEFAULT_DATA_DIR).unwrap();
        let file = project
            .data_dir(DEFAULT_DATA_DIR)
            .join(EntityKind::Model.file_name());
        std::fs::write(&file, "[{\"keep\": true}]").unwrap();

        Project::init(tmp.path(), true, DEFAULT_DATA_DIR).unwrap();
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "[{\"keep\": true}]");
    }

    #[test]
    fn test_project_discover_walks_up() {
        let tmp = tempdir().unwrap();
        Project::init(tmp.path(), false, DEFAULT_DATA_DIR).unwrap();

        let subdir = tmp.path().join("some/nested/dir");
        std::fs::create_dir_all(&subdir).unwrap();

        let project = Project::discover_from(&subdir).unwrap();
        assert_eq!(
            project.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_project_discover_fails_without_marker() {
        let tmp = tempdir().unwrap();
        let err = Project::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ProjectError::NotFound { .. }));
    }

    #[test]
    fn test_project_init_uses_configured_data_dir() {
        let tmp = tempdir().unwrap();
        let project = Project::init(tmp.path(), false, "collections").unwrap();

        for kind in EntityKind::all() {
            assert!(project
                .data_dir("collections")
                .join(kind.file_name())
                .exists());
        }
        assert!(!tmp.path().join(DEFAULT_DATA_DIR).exists());

        let config = crate::core::Config::load(Some(&project));
        if std::env::var("TAXO_DATA_DIR").is_err() {
            assert_eq!(config.data_dir(), "collections");
        }
    }
}
