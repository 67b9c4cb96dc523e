use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use super::files::copy_dir_recursive;
use crate::layout::DistributionLayout;

/// Copy the package folder to `<root>/<pkg>-backup`.
///
/// An existing backup is left untouched and `None` is returned; it holds the
/// unpruned tree from the first run.
pub fn create_backup(layout: &DistributionLayout) -> Result<Option<PathBuf>> {
    let backup = layout.backup_dir();
    if layout.backup_exists() {
        info!(backup = %backup.display(), "backup already exists, keeping it");
        return Ok(None);
    }

    let package = layout.package_dir();
    copy_dir_recursive(&package, &backup).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            package.display(),
            backup.display()
        )
    })?;
    Ok(Some(backup))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_backup_copies_package() {
        let temp = TempDir::new().unwrap();
        let layout = DistributionLayout::download(temp.path());
        fs::create_dir_all(layout.package_path("core/office")).unwrap();
        fs::write(layout.package_path("core/office/OfficeWorker.js"), "w").unwrap();

        let backup = create_backup(&layout).unwrap().unwrap();

        assert_eq!(backup, temp.path().join("lib-backup"));
        assert!(backup.join("core/office/OfficeWorker.js").exists());
    }

    #[test]
    fn test_existing_backup_is_kept() {
        let temp = TempDir::new().unwrap();
        let layout = DistributionLayout::download(temp.path());
        fs::create_dir_all(layout.package_dir()).unwrap();
        fs::write(layout.package_path("new.js"), "new").unwrap();
        fs::create_dir_all(layout.backup_dir()).unwrap();
        fs::write(layout.backup_dir().join("old.js"), "old").unwrap();

        assert!(create_backup(&layout).unwrap().is_none());
        assert!(!layout.backup_dir().join("new.js").exists());
    }
}
