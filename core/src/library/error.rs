//! Error types for bundle reading, directory listing and extraction.

use std::path::PathBuf;

/// Why a single bundle produced no header.
///
/// Every variant carries the bundle path so a failure can be logged or shown
/// without the surrounding [`GameBundle`](super::GameBundle).
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// The file could not be opened or is not a readable zip archive.
    #[error("cannot open bundle {}: {reason}", .path.display())]
    ArchiveUnreadable { path: PathBuf, reason: String },

    /// The archive has no `header.json`, or the entry could not be read.
    #[error("no readable header.json in {}: {reason}", .path.display())]
    MissingHeader { path: PathBuf, reason: String },

    /// `header.json` was read but is not well-formed JSON.
    #[error("invalid header.json in {}: {source}", .path.display())]
    InvalidHeader {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The scan task for this bundle died before producing an outcome.
    #[error("scan of {} was interrupted: {reason}", .path.display())]
    Interrupted { path: PathBuf, reason: String },
}

/// Coarse classification of [`BundleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleErrorKind {
    /// Archive unopenable or header entry absent.
    NotFound,
    /// Header entry is not structured data.
    Parse,
    /// The task never settled normally.
    Interrupted,
}

impl BundleError {
    pub fn kind(&self) -> BundleErrorKind {
        match self {
            Self::ArchiveUnreadable { .. } | Self::MissingHeader { .. } => BundleErrorKind::NotFound,
            Self::InvalidHeader { .. } => BundleErrorKind::Parse,
            Self::Interrupted { .. } => BundleErrorKind::Interrupted,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == BundleErrorKind::NotFound
    }

    pub fn is_parse(&self) -> bool {
        self.kind() == BundleErrorKind::Parse
    }

    /// Path of the bundle this error belongs to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::ArchiveUnreadable { path, .. }
            | Self::MissingHeader { path, .. }
            | Self::InvalidHeader { path, .. }
            | Self::Interrupted { path, .. } => path,
        }
    }
}

/// The games directory itself could not be read.
#[derive(Debug, thiserror::Error)]
#[error("failed to read directory {}: {source}", .path.display())]
pub struct ListError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Failure while unpacking a bundle's contents.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("cannot open bundle {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("entry {name:?} in {} escapes the destination directory", .path.display())]
    UnsafeEntry { path: PathBuf, name: String },

    #[error("failed to write {}: {source}", .target.display())]
    Io {
        target: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
