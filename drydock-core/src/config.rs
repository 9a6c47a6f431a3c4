//! Project configuration
//!
//! Read-only view over a project's `.travis.yml`. The runner only needs a
//! handful of lookups: the platform selector, the step command lists and
//! platform-specific matrix lists. Step and matrix keys accept either a
//! single value or a list of values; a single value is treated as a
//! one-element list.

use serde_yml::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default name of the configuration file inside a project
pub const DEFAULT_CONFIG_FILE: &str = ".travis.yml";

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while reading project configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML or not a mapping
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A key holds a value of the wrong shape
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

/// Parsed project configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    root: Value,
}

impl ProjectConfig {
    /// Reads `.travis.yml` from a project directory
    pub fn read(project_dir: &Path) -> Result<Self> {
        Self::read_file(&project_dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Reads configuration from an explicit file path
    pub fn read_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses configuration from YAML text
    ///
    /// An empty document is an empty configuration.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::empty());
        }

        let root: Value =
            serde_yml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        match root {
            Value::Mapping(_) => Ok(Self { root }),
            Value::Null => Ok(Self::empty()),
            _ => Err(ConfigError::Parse(
                "top level of the configuration must be a mapping".to_string(),
            )),
        }
    }

    /// A configuration with no keys
    pub fn empty() -> Self {
        Self {
            root: Value::Mapping(Default::default()),
        }
    }

    /// Declared platform, if any
    pub fn language(&self) -> Result<Option<String>> {
        self.get_str("language")
    }

    /// Looks up a scalar value as a string
    ///
    /// Numbers and booleans are rendered the way they were written in YAML
    /// (modulo float normalisation, e.g. `3.10` reads back as `3.1`).
    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        match self.root.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => scalar_to_string(value)
                .map(Some)
                .ok_or_else(|| ConfigError::invalid(key, "expected a single value")),
        }
    }

    /// Looks up a list-valued key
    ///
    /// Returns `None` when the key is absent or null. A scalar is coerced
    /// into a one-element list.
    pub fn get_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.root.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        ConfigError::invalid(key, "list items must be single values")
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(value) => scalar_to_string(value)
                .map(|value| Some(vec![value]))
                .ok_or_else(|| ConfigError::invalid(key, "expected a value or a list of values")),
        }
    }

    /// Like [`ProjectConfig::get_list`], falling back to `default` when absent
    pub fn get_list_or(&self, key: &str, default: &[&str]) -> Result<Vec<String>> {
        Ok(self
            .get_list(key)?
            .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect()))
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self::empty()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
