//! Document IO: atomic replace and tolerant reads.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::{CoreError, CoreResult};

/// Writes `content` to `path` via a temp file in the same directory.
pub(crate) fn write_atomic_impl(path: &Path, content: &[u8]) -> CoreResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| CoreError::storage(format!("{} has no parent directory", path.display())))?;

    fs::create_dir_all(dir).map_err(|e| {
        CoreError::storage(format!("failed to create golden dir {}: {}", dir.display(), e))
    })?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| CoreError::storage(format!("failed to create temp file: {}", e)))?;
    tmp.write_all(content)
        .map_err(|e| CoreError::storage(format!("failed to write temp file: {}", e)))?;
    // fsync before rename so the new document is durable when it appears
    tmp.as_file()
        .sync_all()
        .map_err(|e| CoreError::storage(format!("failed to sync temp file: {}", e)))?;
    tmp.persist(path).map_err(|e| {
        CoreError::storage(format!(
            "failed to rename temp file to {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(())
}

/// Reads a file, mapping "not found" to `None`.
pub(crate) fn read_optional_impl(path: &Path) -> CoreResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoreError::storage(format!(
            "failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

pub(crate) fn remove_impl(path: &Path) -> CoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::storage(format!(
            "failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}
