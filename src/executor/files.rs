//! File operation handlers: removal, relocation, renaming, wildcard deletion.
//!
//! Every failure names the path it was working on.

use anyhow::{bail, Context, Result};
use glob::Pattern;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::plan::{Relocation, Rename, WildcardDeletion};

/// Remove a file, symlink or directory tree.
///
/// Returns `false` when nothing was there, so re-running a plan over an
/// already pruned tree is not an error.
pub fn remove_path(path: &Path) -> Result<bool> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!(path = %path.display(), "already gone, skipping");
            return Ok(false);
        }
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to inspect {}", path.display()))
        }
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory {}", path.display()))?;
    } else {
        fs::remove_file(path)
            .with_context(|| format!("Failed to remove file {}", path.display()))?;
    }
    debug!(path = %path.display(), "removed");
    Ok(true)
}

/// Copy the relocation source into its destination directory.
///
/// Directories are copied with their whole subtree. Returns the path of the
/// copy.
pub fn relocate(relocation: &Relocation) -> Result<PathBuf> {
    let source = &relocation.source;
    if fs::symlink_metadata(source).is_err() {
        bail!("relocation source not found: {}", source.display());
    }

    let target = relocation.target();
    fs::create_dir_all(&relocation.destination).with_context(|| {
        format!(
            "Failed to create directory: {}",
            relocation.destination.display()
        )
    })?;

    if source.is_dir() {
        copy_dir_recursive(source, &target)?;
    } else {
        fs::copy(source, &target).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                source.display(),
                target.display()
            )
        })?;
    }
    debug!(from = %source.display(), to = %target.display(), "copied");
    Ok(target)
}

/// Move `rename.from` over `rename.to`, replacing it.
///
/// Returns `false` when `rename.from` is gone, which means an earlier run
/// already promoted it; `rename.to` is then left as it is.
pub fn rename(rename: &Rename) -> Result<bool> {
    if fs::symlink_metadata(&rename.from).is_err() {
        warn!(
            from = %rename.from.display(),
            to = %rename.to.display(),
            "rename source gone, keeping target"
        );
        return Ok(false);
    }

    fs::rename(&rename.from, &rename.to).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            rename.from.display(),
            rename.to.display()
        )
    })?;
    debug!(from = %rename.from.display(), to = %rename.to.display(), "renamed");
    Ok(true)
}

/// Delete the entries of a directory whose names match the glob pattern.
///
/// A missing directory has nothing to delete. Returns the removed paths in
/// name order.
pub fn delete_matching(deletion: &WildcardDeletion) -> Result<Vec<PathBuf>> {
    let pattern = Pattern::new(&deletion.pattern)
        .with_context(|| format!("invalid pattern '{}'", deletion.pattern))?;
    let dir = &deletion.directory;

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read directory: {}", dir.display()))
        }
    };

    let mut matched = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read entry under {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if pattern.matches(name) {
            matched.push(entry.path());
        }
    }
    matched.sort();

    for path in &matched {
        remove_path(path)?;
    }
    Ok(matched)
}

/// Recursively copy a directory, preserving symlinks.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    for entry in WalkDir::new(src).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("Path outside of {}", src.display()))?;
        let dst_path = dst.join(rel);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&dst_path)
                .with_context(|| format!("Failed to create directory: {}", dst_path.display()))?;
        } else if file_type.is_symlink() {
            let target = fs::read_link(entry.path())
                .with_context(|| format!("Failed to read symlink: {}", entry.path().display()))?;
            if dst_path.exists() || dst_path.is_symlink() {
                fs::remove_file(&dst_path)?;
            }
            std::os::unix::fs::symlink(&target, &dst_path)
                .with_context(|| format!("Failed to create symlink: {}", dst_path.display()))?;
        } else {
            if let Some(parent) = dst_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &dst_path)
                .with_context(|| format!("Failed to copy file: {}", entry.path().display()))?;
        }
    }

    Ok(())
}
