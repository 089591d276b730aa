//! Games directory listing
//!
//! Only the top level of the directory is inspected; subdirectories are
//! skipped, not recursed into.

use std::path::{Path, PathBuf};

use gameshelf_shared::BUNDLE_SUFFIX;

use super::error::ListError;

/// Returns the names of bundle files directly inside `dir`.
///
/// A name qualifies when it ends with `.zip` exactly (case-sensitive).
/// Order follows the directory's own iteration order and is unspecified.
pub async fn list_bundles(dir: &Path) -> Result<Vec<String>, ListError> {
    let list_err = |source| ListError {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(list_err)?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!("Skipping non UTF-8 entry in {}", dir.display());
            continue;
        };
        if !is_bundle_name(&name) {
            continue;
        }
        // A directory named `foo.zip` is still a directory, even behind a symlink
        match is_directory(&entry).await {
            Ok(true) => continue,
            Ok(false) => names.push(name),
            Err(e) => {
                tracing::debug!("Skipping {}: {}", name, e);
            }
        }
    }

    Ok(names)
}

/// Like [`list_bundles`], with each name joined onto `dir`.
pub async fn list_bundle_paths(dir: &Path) -> Result<Vec<PathBuf>, ListError> {
    Ok(list_bundles(dir)
        .await?
        .into_iter()
        .map(|name| dir.join(name))
        .collect())
}

async fn is_directory(entry: &tokio::fs::DirEntry) -> std::io::Result<bool> {
    let file_type = entry.file_type().await?;
    if file_type.is_symlink() {
        return Ok(tokio::fs::metadata(entry.path()).await?.is_dir());
    }
    Ok(file_type.is_dir())
}

fn is_bundle_name(name: &str) -> bool {
    name.ends_with(BUNDLE_SUFFIX)
}
