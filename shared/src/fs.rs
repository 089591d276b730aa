//! Filesystem helpers shared across Gameshelf crates.

use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Maximum allowed size of a bundle's `header.json` once decompressed.
pub const MAX_HEADER_BYTES: u64 = 1024 * 1024; // 1 MiB
/// Maximum allowed size of `config.toml`.
pub const MAX_CONFIG_BYTES: u64 = 256 * 1024; // 256 KiB

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Drain a reader into memory, failing once more than `max_bytes` arrive.
///
/// Used for archive entries, whose declared size can't be trusted.
pub fn read_to_end_with_limit<R: Read>(reader: R, max_bytes: u64) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let read = reader.take(max_bytes.saturating_add(1)).read_to_end(&mut buf)?;
    if read as u64 > max_bytes {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("entry exceeds {} bytes", max_bytes),
        ));
    }
    Ok(buf)
}
