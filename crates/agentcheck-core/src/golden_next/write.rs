//! Write path: save, delete and default designation.

use chrono::Utc;
use tracing::info;

use crate::config::MAX_VARIANTS;
use crate::errors::{CoreError, CoreResult};
use crate::model::ExecutionTrace;

use super::super::{GoldenBaseline, GoldenStore, GoldenVariant, DEFAULT_VARIANT_ID};
use super::{io, keys, read};

pub(crate) fn save_impl(
    store: &GoldenStore,
    test_name: &str,
    trace: ExecutionTrace,
    variant_id: Option<&str>,
    notes: Option<String>,
) -> CoreResult<GoldenVariant> {
    let variant_id = variant_id.unwrap_or(DEFAULT_VARIANT_ID);
    keys::validate_name_impl("variant id", variant_id)?;
    check_finite(test_name, &trace)?;

    let mut baseline = read::read_optional_impl(store, test_name)?
        .unwrap_or_else(|| GoldenBaseline::empty(test_name));

    let existing = baseline
        .variants
        .iter()
        .position(|v| v.variant_id == variant_id);

    match existing {
        Some(idx) => {
            baseline.variants.remove(idx);
        }
        None if baseline.variants.len() >= MAX_VARIANTS => {
            return Err(CoreError::MaxVariantsExceeded {
                test_name: test_name.to_string(),
                variant_id: variant_id.to_string(),
                max: MAX_VARIANTS,
            });
        }
        None => {}
    }

    let variant = GoldenVariant::new(variant_id, trace, notes, Utc::now());
    baseline.variants.push(variant.clone());
    if baseline.default_variant.is_none() {
        baseline.default_variant = Some(variant_id.to_string());
    }

    write_baseline(store, &baseline)?;
    info!(
        test_name,
        variant_id,
        overwritten = existing.is_some(),
        variants = baseline.variants.len(),
        "saved golden variant"
    );
    Ok(variant)
}

pub(crate) fn delete_impl(
    store: &GoldenStore,
    test_name: &str,
    variant_id: &str,
) -> CoreResult<()> {
    keys::validate_name_impl("variant id", variant_id)?;
    let not_found = || CoreError::NotFound {
        test_name: test_name.to_string(),
        variant_id: variant_id.to_string(),
    };

    let mut baseline = read::read_optional_impl(store, test_name)?.ok_or_else(not_found)?;
    let idx = baseline
        .variants
        .iter()
        .position(|v| v.variant_id == variant_id)
        .ok_or_else(not_found)?;
    baseline.variants.remove(idx);

    if baseline.variants.is_empty() {
        io::remove_impl(&store.baseline_path(test_name)?)?;
        info!(test_name, variant_id, "deleted last golden variant");
        return Ok(());
    }

    // Promote the oldest remaining variant when the default goes away.
    if baseline.default_variant.as_deref() == Some(variant_id) {
        baseline.default_variant = baseline.variants.first().map(|v| v.variant_id.clone());
    }

    write_baseline(store, &baseline)?;
    info!(
        test_name,
        variant_id,
        variants = baseline.variants.len(),
        "deleted golden variant"
    );
    Ok(())
}

pub(crate) fn set_default_impl(
    store: &GoldenStore,
    test_name: &str,
    variant_id: &str,
) -> CoreResult<()> {
    keys::validate_name_impl("variant id", variant_id)?;
    let mut baseline = read::load_impl(store, test_name)?;
    if baseline.get(variant_id).is_none() {
        return Err(CoreError::NotFound {
            test_name: test_name.to_string(),
            variant_id: variant_id.to_string(),
        });
    }
    baseline.default_variant = Some(variant_id.to_string());
    write_baseline(store, &baseline)?;
    info!(test_name, variant_id, "set default golden variant");
    Ok(())
}

/// JSON has no NaN or infinity; such a field would persist as `null` and make
/// the whole document unreadable.
fn check_finite(test_name: &str, trace: &ExecutionTrace) -> CoreResult<()> {
    for (field, value) in [
        ("score", trace.score),
        ("cost", trace.cost),
        ("latency_ms", trace.latency_ms),
    ] {
        if !value.is_finite() {
            return Err(CoreError::InvalidTrace {
                test_name: test_name.to_string(),
                reason: format!("{} must be a finite number, got {}", field, value),
            });
        }
    }
    Ok(())
}

fn write_baseline(store: &GoldenStore, baseline: &GoldenBaseline) -> CoreResult<()> {
    let path = store.baseline_path(&baseline.test_name)?;
    let json = serde_json::to_vec_pretty(baseline)
        .map_err(|e| CoreError::storage(format!("failed to serialize golden baseline: {}", e)))?;
    io::write_atomic_impl(&path, &json)
}
