//! Project copying
//!
//! Stages a project into a scratch directory before building it. Inside a
//! git work tree, files git reports as ignored are left behind along with the
//! `.git` directory itself, so a build sees what is tracked plus any untracked
//! work in progress. Tracked files are always copied, even when they match
//! an ignore pattern.

use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use crate::error::{BuildError, Result};

/// Copies `source` to `destination`
///
/// Directories are copied recursively and merged into an existing
/// destination. Symlinks are recreated, not followed. Special files (FIFOs,
/// sockets, devices) are skipped.
///
/// # Returns
/// Number of files copied
pub fn copy(source: &Path, destination: &Path) -> Result<usize> {
    let fail = |message: String| BuildError::Copy {
        source_path: source.to_path_buf(),
        destination: destination.to_path_buf(),
        message,
    };

    if !source.is_dir() {
        let copied = copy_entry(source, destination).map_err(|e| fail(e.to_string()))?;
        return Ok(usize::from(copied));
    }

    let git_ignored = git_ignored_files(source).map_err(|e| fail(e.to_string()))?;

    let mut copied = 0;
    for result in project_walker(source).build() {
        let entry = result.map_err(|e| fail(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| fail(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = destination.join(relative);
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        match &git_ignored {
            // Only files are staged from a work tree; their parents are
            // created on demand.
            Some(_) if is_dir => continue,
            Some(ignored) if ignored.contains(relative) => continue,
            None if is_dir => {
                fs::create_dir_all(&target).map_err(|e| fail(e.to_string()))?;
                continue;
            }
            _ => {}
        }

        if copy_entry(entry.path(), &target).map_err(|e| fail(e.to_string()))? {
            copied += 1;
        }
    }

    debug!(
        "Copied {} files from {} to {}",
        copied,
        source.display(),
        destination.display()
    );
    Ok(copied)
}

/// Relative paths of every file under `path`, sorted, `/`-separated
pub fn all_filenames(path: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for result in WalkBuilder::new(path).standard_filters(false).build() {
        let entry = result.map_err(io::Error::other)?;
        if entry.file_type().is_some_and(|t| t.is_dir()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(path) {
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            names.push(name);
        }
    }

    names.sort();
    Ok(names)
}

/// Walker over everything under `source` except `.git`
fn project_walker(source: &Path) -> WalkBuilder {
    let mut walker = WalkBuilder::new(source);
    walker
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(|entry| entry.file_name() != ".git");
    walker
}

/// Files under `path` that git ignores, relative to `path`
///
/// `None` when `path` is not inside a git work tree. Tracked files are
/// never part of the set.
fn git_ignored_files(path: &Path) -> io::Result<Option<HashSet<PathBuf>>> {
    if !is_git_work_tree(path) {
        return Ok(None);
    }

    let output = Command::new("git")
        .args([
            "ls-files",
            "-z",
            "--others",
            "--ignored",
            "--exclude-standard",
        ])
        .current_dir(path)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        return Err(io::Error::other(format!(
            "git ls-files failed in {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let ignored: HashSet<PathBuf> = output
        .stdout
        .split(|b| *b == 0)
        .filter(|name| !name.is_empty())
        .map(path_from_bytes)
        .collect();
    debug!("git ignores {} files under {}", ignored.len(), path.display());
    Ok(Some(ignored))
}

fn is_git_work_tree(path: &Path) -> bool {
    let output = Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(path)
        .stdin(Stdio::null())
        .output();

    match output {
        Ok(output) => output.status.success() && output.stdout.trim_ascii() == b"true",
        Err(e) => {
            warn!(
                "Cannot run git, copying {} without ignore rules: {}",
                path.display(),
                e
            );
            false
        }
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

/// Copies one file or symlink, creating parent directories
///
/// # Returns
/// `false` if `source` is a special file and was skipped
fn copy_entry(source: &Path, target: &Path) -> io::Result<bool> {
    let file_type = fs::symlink_metadata(source)?.file_type();
    if !file_type.is_file() && !file_type.is_symlink() {
        warn!("Skipping special file {}", source.display());
        return Ok(false);
    }

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    if file_type.is_symlink() {
        copy_symlink(source, target)?;
    } else {
        fs::copy(source, target)?;
    }
    Ok(true)
}

#[cfg(unix)]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<()> {
    if fs::symlink_metadata(target).is_ok() {
        fs::remove_file(target)?;
    }
    std::os::unix::fs::symlink(fs::read_link(source)?, target)
}

#[cfg(not(unix))]
fn copy_symlink(source: &Path, target: &Path) -> io::Result<()> {
    fs::copy(source, target).map(|_| ())
}
