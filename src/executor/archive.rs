//! Static resource archives.
//!
//! Each archived directory produces `<dir>.zip` next to it plus a
//! `<dir>.resource-meta.xml` descriptor the hosting platform needs to accept
//! the zip as a public static resource.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::plan::ZipTarget;

pub const RESOURCE_META_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<StaticResource xmlns="http://soap.sforce.com/2006/04/metadata">
    <cacheControl>Public</cacheControl>
    <contentType>application/zip</contentType>
</StaticResource>
"#;

const COMPRESSION_LEVEL: i64 = 9;

/// `<source><suffix>`, e.g. `res/office` becomes `res/office.zip`.
fn sibling(source: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(source.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn zip_path(source: &Path) -> PathBuf {
    sibling(source, ".zip")
}

pub fn meta_path(source: &Path) -> PathBuf {
    sibling(source, ".resource-meta.xml")
}

/// Write the metadata descriptor for `source`, replacing an old one.
pub fn write_resource_meta(source: &Path) -> Result<PathBuf> {
    let path = meta_path(source);
    fs::write(&path, RESOURCE_META_XML)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Compress `target.source` into `<source>.zip`.
///
/// Entries are stored relative to the source directory, under
/// `target.prefix` when one is set. Walk order is sorted by name so the
/// archive layout is reproducible.
pub fn zip_directory(target: &ZipTarget) -> Result<PathBuf> {
    let source = &target.source;
    if !source.is_dir() {
        anyhow::bail!("archive source is not a directory: {}", source.display());
    }

    let archive_path = zip_path(source);
    let file = File::create(&archive_path)
        .with_context(|| format!("Failed to create zip file: {}", archive_path.display()))?;
    let mut zip = ZipWriter::new(file);

    let file_options = FileOptions::<()>::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .unix_permissions(0o644);
    let dir_options = FileOptions::<()>::default()
        .compression_method(CompressionMethod::Stored)
        .unix_permissions(0o755);

    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let rel = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("Path outside of {}", source.display()))?;
        let rel = rel.to_string_lossy().replace('\\', "/");
        let name = match (&target.prefix, rel.is_empty()) {
            (Some(prefix), true) => prefix.trim_end_matches('/').to_string(),
            (Some(prefix), false) => format!("{}/{}", prefix.trim_end_matches('/'), rel),
            (None, _) => rel,
        };
        if name.is_empty() {
            continue;
        }

        if entry.file_type().is_dir() {
            zip.add_directory(name.as_str(), dir_options)
                .with_context(|| format!("Failed to add directory {} to archive", name))?;
        } else {
            zip.start_file(name.as_str(), file_options)
                .with_context(|| format!("Failed to add {} to archive", name))?;
            let mut input = File::open(entry.path())
                .with_context(|| format!("Failed to open {}", entry.path().display()))?;
            io::copy(&mut input, &mut zip)
                .with_context(|| format!("Failed to compress {}", entry.path().display()))?;
        }
    }

    zip.finish()
        .with_context(|| format!("Failed to finish {}", archive_path.display()))?;
    Ok(archive_path)
}

/// Descriptor plus archive for one target. Returns the archive path.
pub fn archive_target(target: &ZipTarget) -> Result<PathBuf> {
    write_resource_meta(&target.source)?;
    zip_directory(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn entry_names(path: &Path) -> Vec<String> {
        let archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
        archive.file_names().map(str::to_string).collect()
    }

    fn fixture(temp: &TempDir) -> PathBuf {
        let source = temp.path().join("office");
        fs::create_dir_all(source.join("nested")).unwrap();
        fs::write(source.join("OfficeWorker.js"), "worker".repeat(100)).unwrap();
        fs::write(source.join("nested/WebOfficeWorker.br.wasm"), "wasm").unwrap();
        source
    }

    #[test]
    fn test_sibling_paths() {
        let source = Path::new("/sdk/webviewer-salesforce/pdf_lean");
        assert_eq!(
            zip_path(source),
            PathBuf::from("/sdk/webviewer-salesforce/pdf_lean.zip")
        );
        assert_eq!(
            meta_path(source),
            PathBuf::from("/sdk/webviewer-salesforce/pdf_lean.resource-meta.xml")
        );
    }

    #[test]
    fn test_zip_directory_roundtrip_contents() {
        let temp = TempDir::new().unwrap();
        let source = fixture(&temp);

        let archive_path = zip_directory(&ZipTarget::new(&source)).unwrap();
        assert_eq!(archive_path, temp.path().join("office.zip"));

        let mut archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
        let mut contents = String::new();
        archive
            .by_name("OfficeWorker.js")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "worker".repeat(100));
        assert!(archive.by_name("nested/WebOfficeWorker.br.wasm").is_ok());
    }

    #[test]
    fn test_zip_directory_with_prefix() {
        let temp = TempDir::new().unwrap();
        let source = fixture(&temp);

        let target = ZipTarget {
            source,
            prefix: Some("lib".to_string()),
        };
        let names = entry_names(&zip_directory(&target).unwrap());

        assert!(names.iter().all(|n| n.starts_with("lib")));
        assert!(names.contains(&"lib/OfficeWorker.js".to_string()));
    }

    #[test]
    fn test_archive_target_writes_descriptor() {
        let temp = TempDir::new().unwrap();
        let source = fixture(&temp);

        archive_target(&ZipTarget::new(&source)).unwrap();
        archive_target(&ZipTarget::new(&source)).unwrap();

        let meta = fs::read_to_string(temp.path().join("office.resource-meta.xml")).unwrap();
        assert_eq!(meta, RESOURCE_META_XML);
        assert!(meta.contains("<contentType>application/zip</contentType>"));
    }

    #[test]
    fn test_zip_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        let err = zip_directory(&ZipTarget::new(temp.path().join("nope"))).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }
}
