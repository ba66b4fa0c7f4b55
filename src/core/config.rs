//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::PathBuf;

use crate::core::project::{Project, DEFAULT_DATA_DIR};

/// Configuration merged from defaults, user config, project config and environment
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data directory, relative to the project root unless absolute
    pub data_dir: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Log filter directive (e.g. "warn", "taxo=debug")
    pub log_level: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/taxo/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read(&global_path) {
                config.merge(global);
            }
        }

        // 3. Project config (.taxo/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read(&project.config_dir().join("config.yaml")) {
                config.merge(project_config);
            }
        }

        // 4. Environment variables
        if let Ok(dir) = std::env::var("TAXO_DATA_DIR") {
            config.data_dir = Some(dir);
        }
        if let Ok(format) = std::env::var("TAXO_FORMAT") {
            config.default_format = Some(format);
        }
        if let Ok(level) = std::env::var("TAXO_LOG") {
            config.log_level = Some(level);
        }

        config
    }

    fn read(path: &std::path::Path) -> Option<Config> {
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "taxo")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
    }

    /// Data directory setting, defaulting to `data`
    pub fn data_dir(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR)
    }

    /// Log filter, defaulting to warnings only
    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or("warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            data_dir: Some("data".to_string()),
            default_format: Some("json".to_string()),
            log_level: None,
        };
        base.merge(Config {
            data_dir: Some("collections".to_string()),
            default_format: None,
            log_level: Some("debug".to_string()),
        });
        assert_eq!(base.data_dir(), "collections");
        assert_eq!(base.default_format.as_deref(), Some("json"));
        assert_eq!(base.log_level(), "debug");
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data_dir(), "data");
        assert_eq!(config.log_level(), "warn");
    }

    #[test]
    fn test_parse_project_config() {
        let config: Config = serde_yml::from_str("data_dir: db\nlog_level: info\n").unwrap();
        assert_eq!(config.data_dir(), "db");
        assert_eq!(config.log_level(), "info");
    }
}
