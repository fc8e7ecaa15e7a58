//! Drift detection against golden baselines.
//!
//! Each stored variant is compared independently (tool sequence, parameters,
//! output, numeric deltas) and classified; the least severe comparison wins.
//! Everything here is a pure function of its inputs.

mod batch;
mod model;
mod params;
mod reasons;
mod sequence;

pub use batch::{diff_batch, BatchEntry, DiffCase};
pub use model::{DiffResult, FieldDiff, FieldDiffKind, ToolDiff, ToolParamDiff, ToolRef};

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::config::DiffConfig;
use crate::errors::{CoreError, CoreResult, ReasonCode};
use crate::golden::{GoldenBaseline, GoldenStore, GoldenVariant};
use crate::model::ExecutionTrace;
use crate::severity::classify;
use crate::similarity::text_similarity;

#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    config: DiffConfig,
}

impl DiffEngine {
    pub fn new(config: DiffConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub(crate) fn from_validated(config: DiffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compares `actual` against every variant in `baseline` and returns the
    /// least severe result.
    ///
    /// Ties go to the higher output similarity, then the most recently
    /// created variant.
    pub fn diff(
        &self,
        baseline: &GoldenBaseline,
        actual: &ExecutionTrace,
        actual_passed: bool,
    ) -> CoreResult<DiffResult> {
        if baseline.variants.is_empty() {
            return Err(CoreError::NoBaseline {
                test_name: baseline.test_name.clone(),
            });
        }

        let mut best: Option<(&GoldenVariant, DiffResult)> = None;
        for variant in &baseline.variants {
            let mut result = self.compare(&variant.trace, actual, actual_passed);
            result.matched_variant_id = Some(variant.variant_id.clone());
            debug!(
                test_name = %baseline.test_name,
                variant_id = %variant.variant_id,
                status = %result.status,
                output_similarity = result.output_similarity,
                score_delta = result.score_delta,
                "compared against variant"
            );

            let replace = match &best {
                None => true,
                Some((best_variant, best_result)) => {
                    prefer(&result, variant, best_result, best_variant) == Ordering::Less
                }
            };
            if replace {
                best = Some((variant, result));
            }
        }

        let (variant, result) = best.ok_or_else(|| CoreError::NoBaseline {
            test_name: baseline.test_name.clone(),
        })?;
        info!(
            test_name = %baseline.test_name,
            variant_id = %variant.variant_id,
            status = %result.status,
            variants = baseline.variants.len(),
            "selected golden variant"
        );
        Ok(result)
    }

    /// Loads the test's baseline from `store` and diffs against it.
    pub fn diff_stored(
        &self,
        store: &GoldenStore,
        test_name: &str,
        actual: &ExecutionTrace,
        actual_passed: bool,
    ) -> CoreResult<DiffResult> {
        let baseline = store.load(test_name)?;
        self.diff(&baseline, actual, actual_passed)
    }

    /// Compares one golden trace with one actual trace.
    ///
    /// The returned result has no `matched_variant_id`.
    pub fn compare(
        &self,
        golden: &ExecutionTrace,
        actual: &ExecutionTrace,
        actual_passed: bool,
    ) -> DiffResult {
        let mut reason_codes = Vec::new();

        let (tool_diff, matched) = self.compare_tools(golden, actual, &mut reason_codes);
        reasons::tool_failure_reasons(golden, actual, &matched, &mut reason_codes);

        let output_similarity = output_similarity(golden, actual);
        reasons::output_reasons(
            golden,
            actual,
            output_similarity,
            &self.config,
            &mut reason_codes,
        );

        let score_delta = actual.score - golden.score;
        reasons::score_reasons(
            golden,
            actual,
            score_delta,
            actual_passed,
            &self.config,
            &mut reason_codes,
        );

        let cost_delta_pct = pct_change(golden.cost, actual.cost);
        let latency_delta_pct = pct_change(golden.latency_ms, actual.latency_ms);
        reasons::resource_reasons(cost_delta_pct, latency_delta_pct, &mut reason_codes);

        let status = classify(
            &tool_diff,
            output_similarity,
            score_delta,
            actual_passed,
            &self.config,
        );

        // Most severe first; stable within a severity.
        reason_codes.sort_by(|a: &ReasonCode, b: &ReasonCode| b.severity.cmp(&a.severity));

        DiffResult {
            status,
            matched_variant_id: None,
            tool_diff,
            output_similarity,
            score_delta,
            cost_delta_pct,
            latency_delta_pct,
            reason_codes,
        }
    }

    fn compare_tools(
        &self,
        golden: &ExecutionTrace,
        actual: &ExecutionTrace,
        reason_codes: &mut Vec<ReasonCode>,
    ) -> (ToolDiff, Vec<(usize, usize)>) {
        let mode = self.config.sequence_mode;

        if actual.tool_calls.is_empty() && !golden.tool_calls.is_empty() {
            reason_codes.push(reasons::no_tool_calls_reason(golden.tool_calls.len()));
        }

        let golden_names = golden.tool_names();
        let actual_names = actual.tool_names();
        let alignment = sequence::align(mode, &golden_names, &actual_names);

        let mut diff = ToolDiff::empty(mode);
        diff.order_changed = alignment.order_changed;
        diff.removed_tools = alignment
            .removed
            .iter()
            .map(|&g| ToolRef::new(&golden.tool_calls[g].name, golden.tool_calls[g].position))
            .collect();
        diff.added_tools = alignment
            .added
            .iter()
            .map(|&a| ToolRef::new(&actual.tool_calls[a].name, actual.tool_calls[a].position))
            .collect();

        for &(g, a) in &alignment.matched {
            let (gc, ac) = (&golden.tool_calls[g], &actual.tool_calls[a]);
            let fields = params::diff_parameters(&gc.parameters, &ac.parameters);
            if !fields.is_empty() {
                diff.parameter_diffs.push(ToolParamDiff {
                    tool: gc.name.clone(),
                    golden_position: gc.position,
                    actual_position: ac.position,
                    fields,
                });
            }
        }

        reasons::tool_reasons(&diff, reason_codes);
        (diff, alignment.matched)
    }
}

/// Orders a candidate against the current best; `Less` means the candidate wins.
fn prefer(
    candidate: &DiffResult,
    candidate_variant: &GoldenVariant,
    best: &DiffResult,
    best_variant: &GoldenVariant,
) -> Ordering {
    candidate
        .status
        .cmp(&best.status)
        .then_with(|| {
            best.output_similarity
                .partial_cmp(&candidate.output_similarity)
                .unwrap_or(Ordering::Equal)
        })
        // Variants are visited in creation order, so an equal timestamp
        // still favors the later candidate.
        .then_with(|| match best_variant.created_at.cmp(&candidate_variant.created_at) {
            Ordering::Greater => Ordering::Greater,
            _ => Ordering::Less,
        })
}

fn output_similarity(golden: &ExecutionTrace, actual: &ExecutionTrace) -> f64 {
    let golden_empty = golden.final_output.trim().is_empty();
    let actual_empty = actual.final_output.trim().is_empty();
    match (golden_empty, actual_empty) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => text_similarity(&golden.final_output, &actual.final_output),
    }
}

/// Relative change in percent; `None` when the golden value is zero and the
/// actual value is not.
fn pct_change(golden: f64, actual: f64) -> Option<f64> {
    if golden == 0.0 {
        return if actual == 0.0 { Some(0.0) } else { None };
    }
    Some((actual - golden) / golden.abs() * 100.0)
}
