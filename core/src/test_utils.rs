//! Shared test utilities for unit tests

use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// ============================================================================
// Bundle fixtures
// ============================================================================

/// Build an in-memory zip archive from `(name, contents)` pairs.
pub fn bundle_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Write a zip archive named `name` into `dir` and return its path.
pub fn write_bundle(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bundle_bytes(entries)).unwrap();
    path
}

/// A bundle with a well-formed header and one asset.
pub fn write_game_bundle(dir: &Path, name: &str, header: &str) -> PathBuf {
    write_bundle(
        dir,
        name,
        &[("header.json", header.as_bytes()), ("assets/style.css", b"body {}")],
    )
}

// ============================================================================
// Drop tracking
// ============================================================================

/// Reader that counts how many times it has been dropped.
pub struct DropCounter<R> {
    inner: R,
    drops: Arc<AtomicUsize>,
}

impl<R> DropCounter<R> {
    pub fn new(inner: R) -> (Self, Arc<AtomicUsize>) {
        let drops = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                drops: Arc::clone(&drops),
            },
            drops,
        )
    }
}

impl<R: Read> Read for DropCounter<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Seek> Seek for DropCounter<R> {
    fn seek(&mut self, pos: SeekFrom) -> std::io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl<R> Drop for DropCounter<R> {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
