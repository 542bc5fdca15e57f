//! Filesystem helpers shared across romhub crates.

use std::path::Path;

use anyhow::{Context, Result};

/// Maximum allowed size for configuration files read into memory.
pub const MAX_CONFIG_BYTES: u64 = 4 * 1024 * 1024; // 4 MiB

/// Read a UTF-8 text file into memory with a size cap.
pub fn read_to_string_with_limit(path: &Path, max_bytes: u64) -> Result<String> {
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
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))
}
