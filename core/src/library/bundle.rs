//! Reading game bundles
//!
//! A bundle is a zip archive with a `header.json` entry at its root. Reading
//! a bundle's header touches only that entry; the rest of the archive is
//! opaque game assets that [`extract_bundle`] can unpack for serving.
//!
//! Archive handles are owned by the [`ZipArchive`] for the duration of a
//! single call and dropped on every return path.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use gameshelf_shared::{GameHeader, HEADER_ENTRY, MAX_HEADER_BYTES, read_to_end_with_limit};
use zip::ZipArchive;
use zip::result::ZipError;

use super::error::{BundleError, ExtractError};

/// Outcome of reading one bundle.
///
/// Either a header or an error, never both.
#[derive(Debug)]
pub struct GameBundle {
    /// Path the bundle was read from, as given to the scanner.
    pub path: PathBuf,
    /// Parsed header, or why there isn't one.
    pub outcome: Result<GameHeader, BundleError>,
}

impl GameBundle {
    pub fn new(path: PathBuf, outcome: Result<GameHeader, BundleError>) -> Self {
        Self { path, outcome }
    }

    pub fn header(&self) -> Option<&GameHeader> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&BundleError> {
        self.outcome.as_ref().err()
    }
}

/// Read and parse `header.json` from the bundle at `path`.
///
/// Blocking; async callers should go through [`load_bundle`].
pub fn read_game_header(path: &Path) -> Result<GameHeader, BundleError> {
    let file = File::open(path).map_err(|e| BundleError::ArchiveUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    read_game_header_from(file, path)
}

/// Read and parse `header.json` from an already-open archive source.
///
/// `source` is consumed and dropped before this returns, whatever the
/// outcome. `path` is only used to label errors.
pub fn read_game_header_from<R: Read + Seek>(
    source: R,
    path: &Path,
) -> Result<GameHeader, BundleError> {
    let mut archive = ZipArchive::new(source).map_err(|e| BundleError::ArchiveUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let bytes = {
        let entry = archive.by_name(HEADER_ENTRY).map_err(|e| {
            let reason = match e {
                ZipError::FileNotFound => "entry not present".to_string(),
                other => other.to_string(),
            };
            BundleError::MissingHeader {
                path: path.to_path_buf(),
                reason,
            }
        })?;
        read_to_end_with_limit(entry, MAX_HEADER_BYTES).map_err(|e| {
            BundleError::MissingHeader {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?
    };

    GameHeader::from_slice(&bytes).map_err(|source| BundleError::InvalidHeader {
        path: path.to_path_buf(),
        source,
    })
}

/// Read one bundle on the blocking pool.
///
/// Always settles with a [`GameBundle`]; a panicked or cancelled read is
/// reported as [`BundleError::Interrupted`].
pub async fn load_bundle(path: PathBuf) -> GameBundle {
    let read_path = path.clone();
    let outcome = match tokio::task::spawn_blocking(move || read_game_header(&read_path)).await {
        Ok(outcome) => outcome,
        Err(e) => Err(BundleError::Interrupted {
            path: path.clone(),
            reason: e.to_string(),
        }),
    };
    GameBundle::new(path, outcome)
}

/// Unpack every entry of the bundle at `path` into `dest`.
///
/// Returns the files written, in archive order. Entries whose names would
/// land outside `dest` abort the extraction.
pub fn extract_bundle(path: &Path, dest: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let archive_err = |source: ZipError| ExtractError::Archive {
        path: path.to_path_buf(),
        source,
    };
    let io_err = |target: &Path, source: std::io::Error| ExtractError::Io {
        target: target.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| archive_err(ZipError::Io(e)))?;
    let mut archive = ZipArchive::new(file).map_err(archive_err)?;

    let mut written = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(archive_err)?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(ExtractError::UnsafeEntry {
                path: path.to_path_buf(),
                name: entry.name().to_string(),
            });
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&target).map_err(|e| io_err(target.as_path(), e))?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut out = File::create(&target).map_err(|e| io_err(target.as_path(), e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| io_err(target.as_path(), e))?;
        written.push(target);
    }

    tracing::debug!(
        "Extracted {} files from {} into {}",
        written.len(),
        path.display(),
        dest.display()
    );
    Ok(written)
}
