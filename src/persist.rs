//! Shared persistence helpers: error taxonomy and atomic file writes.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors from serializing or storing opaque blobs (claim snapshots,
/// per-chunk attribution tables).
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("blob version mismatch: expected {expected}, found {found}")]
    Version { expected: u32, found: u32 },
}

/// Write a blob to `path` via a temporary sibling file plus rename, so a
/// crash mid-write never leaves a truncated blob behind.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = Path::new(&tmp);
    fs::write(tmp_path, bytes)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}
