//! Runner configuration
//!
//! Settings that belong to the machine running builds rather than to the
//! project being built: where temporary directories live, how long an
//! abandoned one is kept, and which file holds the project configuration.

use drydock_core::config::DEFAULT_CONFIG_FILE;
use std::path::PathBuf;
use std::time::Duration;

/// Default age after which abandoned temporary directories are swept
pub const DEFAULT_TEMP_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Runner configuration
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Directory under which staging and runtime directories are created
    pub temp_root: PathBuf,

    /// Temporary directories older than this are removed before new ones
    /// are created
    pub temp_timeout: Duration,

    /// Name of the configuration file inside a project
    pub config_file: String,
}

impl RunnerConfig {
    /// Creates a new configuration with defaults for everything but the root
    pub fn new(temp_root: PathBuf) -> Self {
        Self {
            temp_root,
            temp_timeout: DEFAULT_TEMP_TIMEOUT,
            config_file: DEFAULT_CONFIG_FILE.to_string(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognised environment variables:
    /// - DRYDOCK_TMP_DIR (optional, default: `$XDG_DATA_HOME/drydock/tmp`)
    /// - DRYDOCK_TMP_TIMEOUT (optional, seconds, default: 86400)
    /// - DRYDOCK_CONFIG_FILE (optional, default: `.travis.yml`)
    pub fn from_env() -> Self {
        let temp_root = std::env::var_os("DRYDOCK_TMP_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_temp_root);

        let temp_timeout = std::env::var("DRYDOCK_TMP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TEMP_TIMEOUT);

        let config_file = std::env::var("DRYDOCK_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        Self {
            temp_root,
            temp_timeout,
            config_file,
        }
    }

    pub fn with_config_file(mut self, config_file: impl Into<String>) -> Self {
        self.config_file = config_file.into();
        self
    }

    pub fn with_temp_root(mut self, temp_root: PathBuf) -> Self {
        self.temp_root = temp_root;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.temp_root.as_os_str().is_empty() {
            return Err("temp_root cannot be empty".to_string());
        }

        if self.temp_timeout.is_zero() {
            return Err("temp_timeout must be greater than 0".to_string());
        }

        if self.config_file.is_empty() || self.config_file.contains('/') {
            return Err("config_file must be a plain file name".to_string());
        }

        Ok(())
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::new(default_temp_root())
    }
}

/// `$XDG_DATA_HOME/drydock/tmp`, or the system temp dir when there is no
/// data directory
fn default_temp_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("drydock").join("tmp"))
        .unwrap_or_else(|| std::env::temp_dir().join("drydock"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.temp_timeout, DEFAULT_TEMP_TIMEOUT);
        assert_eq!(config.config_file, ".travis.yml");
        assert!(config.temp_root.ends_with("tmp") || config.temp_root.ends_with("drydock"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = RunnerConfig::new(PathBuf::from("/tmp/drydock"));
        assert!(config.validate().is_ok());

        config.temp_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
        config.temp_timeout = DEFAULT_TEMP_TIMEOUT;

        config.config_file = "ci/.travis.yml".to_string();
        assert!(config.validate().is_err());

        config.config_file = String::new();
        assert!(config.validate().is_err());

        config = config.with_config_file(".drydock.yml");
        assert!(config.validate().is_ok());

        config.temp_root = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
