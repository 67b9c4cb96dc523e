//! Splitting the optimized PDF worker into chunks.
//!
//! A single static resource has an upload size limit, so the worker binary
//! is cut into `n` pieces, each in its own `<tier>_worker_<i>` directory that
//! is archived separately.

use anyhow::{bail, Context, Result};
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::info;

/// Number of chunks the worker binary is split into.
pub const WORKER_CHUNKS: usize = 2;

/// File name with the `.br.wasm` suffix removed.
///
/// `PDFNetCWasm.br.wasm` becomes `PDFNetCWasm`.
pub fn extract_file_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.strip_suffix(".br.wasm") {
        Some(stem) => stem.to_string(),
        None => name,
    }
}

/// Byte ranges of `len` cut into `chunks` pieces of `ceil(len / chunks)`.
///
/// Always yields `chunks` ranges; trailing ones may be empty.
pub fn chunk_ranges(len: usize, chunks: usize) -> Vec<Range<usize>> {
    let size = len.div_ceil(chunks.max(1));
    (0..chunks)
        .map(|i| {
            let start = (i * size).min(len);
            let end = (start + size).min(len);
            start..end
        })
        .collect()
}

pub fn create_chunk_directory(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {}", dir.display()))
}

pub fn write_chunk_file(path: &Path, chunk: &[u8]) -> Result<()> {
    fs::write(path, chunk).with_context(|| format!("Failed to write chunk file: {}", path.display()))
}

/// Split `path` into `chunks` files under `target_dir`.
///
/// Chunk `i` is written to
/// `<target_dir>/<folder>_worker_<i>/<name>-chunk-<i>.br.wasm`. Returns the
/// chunk directories in order.
pub fn split_worker_file(
    path: &Path,
    chunks: usize,
    target_dir: &Path,
    folder: &str,
) -> Result<Vec<PathBuf>> {
    if chunks == 0 {
        bail!("cannot split {} into zero chunks", path.display());
    }

    let buffer = fs::read(path)
        .with_context(|| format!("File not found or unable to read: {}", path.display()))?;
    let name = extract_file_name(path);

    let mut dirs = Vec::with_capacity(chunks);
    for (i, range) in chunk_ranges(buffer.len(), chunks).into_iter().enumerate() {
        let dir = target_dir.join(format!("{folder}_worker_{i}"));
        let file = dir.join(format!("{name}-chunk-{i}.br.wasm"));

        create_chunk_directory(&dir).with_context(|| format!("Failed to write chunk {i}"))?;
        write_chunk_file(&file, &buffer[range]).with_context(|| format!("Failed to write chunk {i}"))?;
        dirs.push(dir);
    }

    info!(file = %path.display(), chunks, "worker split");
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extract_file_name() {
        assert_eq!(
            extract_file_name(Path::new("/sdk/lib/core/pdf/lean/optimized/PDFNetCWasm.br.wasm")),
            "PDFNetCWasm"
        );
        assert_eq!(extract_file_name(Path::new("plain.wasm")), "plain.wasm");
    }

    #[test]
    fn test_chunk_ranges_cover_input() {
        assert_eq!(chunk_ranges(5, 2), vec![0..3, 3..5]);
        assert_eq!(chunk_ranges(4, 2), vec![0..2, 2..4]);
        assert_eq!(chunk_ranges(1, 3), vec![0..1, 1..1, 1..1]);
        assert_eq!(chunk_ranges(0, 2), vec![0..0, 0..0]);
    }

    #[test]
    fn test_split_preserves_bytes() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("PDFNetCWasm.br.wasm");
        let bytes: Vec<u8> = (0..=250u8).collect();
        fs::write(&source, &bytes).unwrap();

        let target = temp.path().join("res");
        let dirs = split_worker_file(&source, 2, &target, "lean").unwrap();

        assert_eq!(dirs, vec![target.join("lean_worker_0"), target.join("lean_worker_1")]);

        let first = fs::read(dirs[0].join("PDFNetCWasm-chunk-0.br.wasm")).unwrap();
        let second = fs::read(dirs[1].join("PDFNetCWasm-chunk-1.br.wasm")).unwrap();
        assert_eq!(first.len(), 126);
        assert_eq!([first, second].concat(), bytes);
    }

    #[test]
    fn test_split_missing_file_names_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("PDFNetCWasm.br.wasm");

        let err = split_worker_file(&missing, 2, temp.path(), "full").unwrap_err();
        assert!(err.to_string().contains("File not found or unable to read"));
        assert!(err.to_string().contains("PDFNetCWasm.br.wasm"));
    }

    #[test]
    fn test_split_rerun_overwrites_chunks() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("PDFNetCWasm.br.wasm");
        fs::write(&source, b"abcd").unwrap();

        split_worker_file(&source, 2, temp.path(), "full").unwrap();
        let dirs = split_worker_file(&source, 2, temp.path(), "full").unwrap();

        let chunk = fs::read(dirs[1].join("PDFNetCWasm-chunk-1.br.wasm")).unwrap();
        assert_eq!(chunk, b"cd");
    }
}
