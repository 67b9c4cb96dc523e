//! The fixed layout of the SDK distribution tree.
//!
//! A direct download keeps the SDK under `<root>/lib`. The installed npm
//! package keeps it under `<root>/public` and has no top-level
//! `package.json`/`webviewer.min.js` inside the package folder. Archival
//! packaging writes into a separate resource tree at
//! `<root>/webviewer-salesforce`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Package folder of a direct download.
pub const DOWNLOAD_PACKAGE_FOLDER: &str = "lib";

/// Package folder of the installed npm package.
pub const INSTALLED_PACKAGE_FOLDER: &str = "public";

/// Name of the npm package that marks an installed layout.
pub const INSTALLED_PACKAGE_NAME: &str = "@pdftron/webviewer";

/// Resource tree used by the archival packaging target.
pub const RESOURCE_DIR_NAME: &str = "webviewer-salesforce";

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionLayout {
    root: PathBuf,
    package_folder: String,
    resource_dir: PathBuf,
    installed_package: bool,
}

impl DistributionLayout {
    /// Layout of a direct download rooted at `root`.
    pub fn download(root: impl Into<PathBuf>) -> Self {
        Self::new(root, DOWNLOAD_PACKAGE_FOLDER, false)
    }

    /// Layout of the installed npm package rooted at `root`.
    pub fn installed(root: impl Into<PathBuf>) -> Self {
        Self::new(root, INSTALLED_PACKAGE_FOLDER, true)
    }

    fn new(root: impl Into<PathBuf>, package_folder: &str, installed_package: bool) -> Self {
        let root = root.into();
        let resource_dir = root.join(RESOURCE_DIR_NAME);
        Self {
            root,
            package_folder: package_folder.to_string(),
            resource_dir,
            installed_package,
        }
    }

    /// Detect the layout from `<root>/package.json`.
    ///
    /// A missing `package.json` means a direct download. A present one whose
    /// `name` is not the SDK package also means a direct download.
    pub fn detect(root: &Path) -> Result<Self> {
        let manifest = root.join("package.json");
        if !manifest.is_file() {
            return Ok(Self::download(root));
        }

        let bytes = fs::read(&manifest)
            .with_context(|| format!("reading package manifest '{}'", manifest.display()))?;
        let parsed: PackageJson = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing package manifest '{}'", manifest.display()))?;

        if parsed.name.as_deref() == Some(INSTALLED_PACKAGE_NAME) {
            Ok(Self::installed(root))
        } else {
            Ok(Self::download(root))
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_folder(&self) -> &str {
        &self.package_folder
    }

    pub fn resource_dir(&self) -> &Path {
        &self.resource_dir
    }

    pub fn installed_package(&self) -> bool {
        self.installed_package
    }

    /// `<root>/<package_folder>`.
    pub fn package_dir(&self) -> PathBuf {
        self.root.join(&self.package_folder)
    }

    /// A path inside the package folder.
    pub fn package_path(&self, rel: &str) -> PathBuf {
        self.package_dir().join(rel)
    }

    /// A path inside the resource tree.
    pub fn resource_path(&self, rel: &str) -> PathBuf {
        self.resource_dir.join(rel)
    }

    /// A path inside the package mirror of the resource tree,
    /// `<resource_dir>/<package_folder>/<rel>`.
    pub fn resource_package_path(&self, rel: &str) -> PathBuf {
        let base = self.resource_dir.join(&self.package_folder);
        if rel.is_empty() {
            base
        } else {
            base.join(rel)
        }
    }

    /// Where a backup of the package folder lives.
    pub fn backup_dir(&self) -> PathBuf {
        self.root.join(format!("{}-backup", self.package_folder))
    }

    pub fn backup_exists(&self) -> bool {
        self.backup_dir().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_without_manifest() {
        let temp = TempDir::new().unwrap();
        let layout = DistributionLayout::detect(temp.path()).unwrap();

        assert_eq!(layout.package_folder(), "lib");
        assert!(!layout.installed_package());
        assert_eq!(layout.package_dir(), temp.path().join("lib"));
    }

    #[test]
    fn test_detect_installed_package() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "@pdftron/webviewer", "version": "11.0.0"}"#,
        )
        .unwrap();

        let layout = DistributionLayout::detect(temp.path()).unwrap();
        assert_eq!(layout.package_folder(), "public");
        assert!(layout.installed_package());
        assert_eq!(layout.backup_dir(), temp.path().join("public-backup"));
    }

    #[test]
    fn test_detect_other_package_is_download() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), r#"{"name": "my-app"}"#).unwrap();

        let layout = DistributionLayout::detect(temp.path()).unwrap();
        assert_eq!(layout.package_folder(), "lib");
    }

    #[test]
    fn test_detect_invalid_manifest() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{ not json").unwrap();

        let err = DistributionLayout::detect(temp.path()).unwrap_err();
        assert!(err.to_string().contains("package.json"));
    }

    #[test]
    fn test_resource_paths() {
        let layout = DistributionLayout::download("/sdk");

        assert_eq!(layout.resource_dir(), Path::new("/sdk/webviewer-salesforce"));
        assert_eq!(
            layout.resource_path("office_asm"),
            PathBuf::from("/sdk/webviewer-salesforce/office_asm")
        );
        assert_eq!(
            layout.resource_package_path("core"),
            PathBuf::from("/sdk/webviewer-salesforce/lib/core")
        );
        assert_eq!(
            layout.resource_package_path(""),
            PathBuf::from("/sdk/webviewer-salesforce/lib")
        );
    }
}
