//! Temporary directory root
//!
//! All staging and runtime directories live under one root so that
//! directories left behind by a crashed run can be found and removed later.
//! Each directory is a [`tempfile::TempDir`], removed when dropped.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::RunnerConfig;

const PREFIX: &str = "drydock-";

/// Owner of the directory all temporary directories are created in
#[derive(Debug, Clone)]
pub struct TempRoot {
    root: PathBuf,
    timeout: Duration,
}

impl TempRoot {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RunnerConfig) -> Self {
        Self::new(config.temp_root.clone(), config.temp_timeout)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Creates a fresh temporary directory under the root
    ///
    /// Stale directories are swept first.
    pub fn create_temp_dir(&self) -> io::Result<TempDir> {
        fs::create_dir_all(&self.root)?;
        self.sweep();

        let dir = tempfile::Builder::new()
            .prefix(PREFIX)
            .tempdir_in(&self.root)?;
        debug!("Created temporary directory {}", dir.path().display());
        Ok(dir)
    }

    /// Removes temporary directories older than the timeout
    ///
    /// Returns how many were removed. Failures are logged and skipped.
    pub fn sweep(&self) -> usize {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to list {}: {}", self.root.display(), e);
                return 0;
            }
        };

        let now = SystemTime::now();
        let mut removed = 0;

        for entry in entries.flatten() {
            if !entry.file_name().to_string_lossy().starts_with(PREFIX) {
                continue;
            }

            let path = entry.path();
            let age = entry
                .metadata()
                .and_then(|metadata| metadata.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok());

            match age {
                Some(age) if age > self.timeout => {}
                _ => continue,
            }

            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };

            match result {
                Ok(()) => {
                    debug!("Removed stale temporary directory {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::FileTime;

    #[test]
    fn test_temp_dir_is_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let root = TempRoot::new(base.path().join("tmp"), Duration::from_secs(60));

        let dir = root.create_temp_dir().unwrap();
        let path = dir.path().to_path_buf();
        assert!(path.is_dir());
        assert!(path.starts_with(root.path()));

        drop(dir);
        assert!(!path.exists());
    }

    #[test]
    fn test_sweep_removes_only_stale_directories() {
        let base = tempfile::tempdir().unwrap();
        let root = TempRoot::new(base.path(), Duration::from_secs(60));

        let stale = base.path().join("drydock-stale");
        let fresh = base.path().join("drydock-fresh");
        let unrelated = base.path().join("other-stale");
        for dir in [&stale, &fresh, &unrelated] {
            fs::create_dir(dir).unwrap();
        }
        let epoch = FileTime::from_unix_time(0, 0);
        filetime::set_file_mtime(&stale, epoch).unwrap();
        filetime::set_file_mtime(&unrelated, epoch).unwrap();

        assert_eq!(root.sweep(), 1);
        assert!(!stale.exists());
        assert!(fresh.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_sweep_of_missing_root_is_harmless() {
        let base = tempfile::tempdir().unwrap();
        let root = TempRoot::new(base.path().join("missing"), Duration::from_secs(60));
        assert_eq!(root.sweep(), 0);
    }
}
