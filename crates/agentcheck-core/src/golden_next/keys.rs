//! Name validation and path derivation.

use std::path::{Path, PathBuf};

use crate::errors::{CoreError, CoreResult};

pub(crate) const BASELINE_SUFFIX: &str = ".golden.json";

const MAX_NAME_LEN: usize = 128;

pub(crate) fn baseline_path_impl(root: &Path, test_name: &str) -> CoreResult<PathBuf> {
    validate_name_impl("test name", test_name)?;
    Ok(root.join(format!("{}{}", test_name, BASELINE_SUFFIX)))
}

/// Rejects names that are unsafe as a single file-name component.
pub(crate) fn validate_name_impl(kind: &'static str, value: &str) -> CoreResult<()> {
    let invalid = |reason: &str| CoreError::InvalidName {
        kind,
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if value.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value.len() > MAX_NAME_LEN {
        return Err(invalid("is longer than 128 bytes"));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(invalid("contains path separators"));
    }
    if value.contains("..") {
        return Err(invalid("contains '..'"));
    }
    if value.starts_with('.') {
        return Err(invalid("must not start with '.'"));
    }
    if value.chars().any(char::is_control) {
        return Err(invalid("contains control characters"));
    }
    Ok(())
}

pub(crate) fn test_name_from_file_impl(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(BASELINE_SUFFIX)
        .filter(|name| validate_name_impl("test name", name).is_ok())
}
