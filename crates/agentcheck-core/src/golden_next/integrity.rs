//! Trace digests recorded at save time and checked on read.

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::errors::{CoreError, CoreResult};
use crate::model::ExecutionTrace;

use super::super::GoldenBaseline;

pub(crate) fn trace_digest_impl(trace: &ExecutionTrace) -> String {
    // Parameter and JSON object keys serialize in sorted order.
    let canonical = serde_json::to_vec(trace).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

pub(crate) fn verify_baseline_impl(baseline: &GoldenBaseline) -> CoreResult<()> {
    for variant in &baseline.variants {
        let actual = trace_digest_impl(&variant.trace);
        if actual != variant.digest {
            warn!(
                test_name = %baseline.test_name,
                variant_id = %variant.variant_id,
                expected = %variant.digest,
                actual = %actual,
                "golden integrity check failed"
            );
            return Err(CoreError::CorruptBaseline {
                test_name: baseline.test_name.clone(),
                variant_id: variant.variant_id.clone(),
                expected: variant.digest.clone(),
                actual,
            });
        }
    }
    Ok(())
}
