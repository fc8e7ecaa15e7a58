//! Read path: parse, check schema and verify digests.

use std::fs;

use tracing::debug;

use crate::errors::{CoreError, CoreResult};

use super::super::{GoldenBaseline, GoldenStore, GoldenVariant, SCHEMA_VERSION};
use super::{integrity, io, keys};

pub(crate) fn read_optional_impl(
    store: &GoldenStore,
    test_name: &str,
) -> CoreResult<Option<GoldenBaseline>> {
    let path = store.baseline_path(test_name)?;

    let Some(content) = io::read_optional_impl(&path)? else {
        debug!(test_name, "no golden document");
        return Ok(None);
    };

    let baseline: GoldenBaseline = serde_json::from_str(&content).map_err(|e| {
        CoreError::storage(format!(
            "failed to parse golden document {}: {}",
            path.display(),
            e
        ))
    })?;

    if baseline.schema_version != SCHEMA_VERSION {
        return Err(CoreError::storage(format!(
            "unsupported golden schema version {} in {} (supported: {})",
            baseline.schema_version,
            path.display(),
            SCHEMA_VERSION
        )));
    }
    if baseline.test_name != test_name {
        return Err(CoreError::storage(format!(
            "golden document {} belongs to test '{}'",
            path.display(),
            baseline.test_name
        )));
    }

    integrity::verify_baseline_impl(&baseline)?;

    debug!(test_name, variants = baseline.variants.len(), "loaded golden baseline");
    Ok(Some(baseline))
}

pub(crate) fn load_impl(store: &GoldenStore, test_name: &str) -> CoreResult<GoldenBaseline> {
    match read_optional_impl(store, test_name)? {
        Some(baseline) if !baseline.is_empty() => Ok(baseline),
        _ => Err(CoreError::NoBaseline {
            test_name: test_name.to_string(),
        }),
    }
}

pub(crate) fn get_impl(
    store: &GoldenStore,
    test_name: &str,
    variant_id: &str,
) -> CoreResult<GoldenVariant> {
    keys::validate_name_impl("variant id", variant_id)?;
    read_optional_impl(store, test_name)?
        .and_then(|b| b.variants.into_iter().find(|v| v.variant_id == variant_id))
        .ok_or_else(|| CoreError::NotFound {
            test_name: test_name.to_string(),
            variant_id: variant_id.to_string(),
        })
}

pub(crate) fn list_tests_impl(store: &GoldenStore) -> CoreResult<Vec<String>> {
    if !store.root().exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(store.root()).map_err(|e| {
        CoreError::storage(format!(
            "failed to read golden dir {}: {}",
            store.root().display(),
            e
        ))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| CoreError::storage(format!("failed to read directory entry: {}", e)))?;
        if !entry.path().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_string();
        if let Some(name) = keys::test_name_from_file_impl(&file_name) {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}
