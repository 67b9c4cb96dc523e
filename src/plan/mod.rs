//! The file plan: what a run will delete, relocate, rename and archive.
//!
//! A [`FilePlan`] describes WHAT happens to the distribution tree, never HOW.
//! It is produced by [`rules::compute_plan`] without touching the filesystem
//! and interpreted by the [`crate::executor`].

pub mod rules;

pub use rules::compute_plan;

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Delete every entry of `directory` whose name matches `pattern`.
///
/// `pattern` is a glob over entry names (e.g. `*.js.map`). The match is not
/// recursive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WildcardDeletion {
    pub pattern: String,
    pub directory: PathBuf,
}

/// Copy `source` into `destination`, keeping its file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Relocation {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// The entry belongs to the package mirror and is copied as a tree.
    pub recursive: bool,
}

impl Relocation {
    /// Final location of the copied entry.
    pub fn target(&self) -> PathBuf {
        match self.source.file_name() {
            Some(name) => self.destination.join(name),
            None => self.destination.clone(),
        }
    }
}

/// Replace `to` with `from`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// A directory to compress into `<source>.zip`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ZipTarget {
    pub source: PathBuf,
    /// Directory inside the archive that holds the entries; `None` puts them
    /// at the archive root.
    pub prefix: Option<String>,
}

impl ZipTarget {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            prefix: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilePlan {
    /// Paths removed outright.
    pub deletions: Vec<PathBuf>,
    /// Wildcard deletions that only make sense once relocations are done.
    pub post_relocation_deletions: Vec<WildcardDeletion>,
    pub wildcard_deletions: Vec<WildcardDeletion>,
    pub relocations: Vec<Relocation>,
    /// Removed before renames run, so a rename can take their place.
    pub sync_removals: Vec<PathBuf>,
    pub renames: Vec<Rename>,
    pub zip_targets: Vec<ZipTarget>,
}

impl FilePlan {
    pub(crate) fn delete(&mut self, path: PathBuf) {
        self.deletions.push(path);
    }

    pub(crate) fn delete_matching(&mut self, pattern: &str, directory: PathBuf) {
        self.wildcard_deletions.push(WildcardDeletion {
            pattern: pattern.to_string(),
            directory,
        });
    }

    pub(crate) fn delete_matching_after_relocation(&mut self, pattern: &str, directory: PathBuf) {
        self.post_relocation_deletions.push(WildcardDeletion {
            pattern: pattern.to_string(),
            directory,
        });
    }

    pub(crate) fn relocate(&mut self, source: PathBuf, destination: PathBuf) {
        self.relocations.push(Relocation {
            source,
            destination,
            recursive: false,
        });
    }

    pub(crate) fn relocate_tree(&mut self, source: PathBuf, destination: PathBuf) {
        self.relocations.push(Relocation {
            source,
            destination,
            recursive: true,
        });
    }

    pub(crate) fn remove_sync(&mut self, path: PathBuf) {
        self.sync_removals.push(path);
    }

    pub(crate) fn rename(&mut self, from: PathBuf, to: PathBuf) {
        self.renames.push(Rename { from, to });
    }

    pub(crate) fn zip(&mut self, source: PathBuf) {
        self.zip_targets.push(ZipTarget::new(source));
    }

    pub fn is_deleted(&self, path: &Path) -> bool {
        self.deletions.iter().any(|p| p == path)
    }

    pub fn is_relocated(&self, source: &Path) -> bool {
        self.relocations.iter().any(|r| r.source == source)
    }

    /// True when nothing would be touched.
    pub fn is_empty(&self) -> bool {
        self.deletions.is_empty()
            && self.post_relocation_deletions.is_empty()
            && self.wildcard_deletions.is_empty()
            && self.relocations.is_empty()
            && self.sync_removals.is_empty()
            && self.renames.is_empty()
            && self.zip_targets.is_empty()
    }
}
