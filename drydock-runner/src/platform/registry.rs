//! Platform registry
//!
//! Maps `language` values from the project configuration to constructors of
//! the platform that builds them. A configuration without `language` uses
//! [`DEFAULT_PLATFORM`].

use std::sync::Arc;

use super::{DefaultPlatform, Platform, PythonPlatform};
use crate::console::Console;
use crate::error::{BuildError, Result};
use crate::temp::TempRoot;

/// Platform used when the configuration declares no language
pub const DEFAULT_PLATFORM: &str = "generic";

/// Builds a platform from the console and temp root of the current build
pub type PlatformConstructor = Box<dyn Fn(Arc<Console>, TempRoot) -> Box<dyn Platform> + Send + Sync>;

/// Registry of platform constructors, keyed by language name
pub struct PlatformRegistry {
    platforms: Vec<(String, PlatformConstructor)>,
}

impl PlatformRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            platforms: Vec::new(),
        }
    }

    /// Registry with every built-in platform
    ///
    /// `generic`, `minimal` and `shell` all map to the default platform.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for name in [DEFAULT_PLATFORM, "minimal", "shell"] {
            registry.register(name, default_platform);
        }
        registry.register("python", python_platform);
        registry
    }

    /// Registers a platform constructor
    ///
    /// # Panics
    /// Panics if a platform with the same name is already registered
    pub fn register<F>(&mut self, name: &str, constructor: F)
    where
        F: Fn(Arc<Console>, TempRoot) -> Box<dyn Platform> + Send + Sync + 'static,
    {
        if self.contains(name) {
            panic!("Platform '{}' is already registered", name);
        }
        self.platforms.push((name.to_string(), Box::new(constructor)));
    }

    fn contains(&self, name: &str) -> bool {
        self.platforms.iter().any(|(n, _)| n == name)
    }

    /// Instantiates the platform for a configured language
    ///
    /// # Errors
    /// `BuildError::UnknownPlatform` if no platform is registered under the
    /// language (or under [`DEFAULT_PLATFORM`] when `language` is `None`)
    pub fn create(
        &self,
        language: Option<&str>,
        console: Arc<Console>,
        temp_root: TempRoot,
    ) -> Result<Box<dyn Platform>> {
        let name = language.unwrap_or(DEFAULT_PLATFORM);
        self.platforms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, constructor)| constructor(console, temp_root))
            .ok_or_else(|| BuildError::UnknownPlatform(name.to_string()))
    }
}

fn default_platform(_console: Arc<Console>, _temp_root: TempRoot) -> Box<dyn Platform> {
    Box::new(DefaultPlatform::new())
}

fn python_platform(console: Arc<Console>, temp_root: TempRoot) -> Box<dyn Platform> {
    Box::new(PythonPlatform::new(console, temp_root))
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
