//! Reason-code construction for a single golden/actual comparison.

use crate::config::{DiffConfig, SequenceMode};
use crate::errors::reason::codes;
use crate::errors::ReasonCode;
use crate::model::ExecutionTrace;
use serde_json::json;

use super::model::{FieldDiffKind, ToolDiff};

/// Cost or latency growth above this percentage is flagged.
pub(crate) const RESOURCE_INCREASE_WARN_PCT: f64 = 50.0;

pub(crate) fn tool_reasons(diff: &ToolDiff, out: &mut Vec<ReasonCode>) {
    for removed in &diff.removed_tools {
        out.push(
            ReasonCode::error(
                codes::TOOL_MISSING,
                format!(
                    "expected tool '{}' (golden position {}) was not called {}",
                    removed.name,
                    removed.position,
                    mode_phrase(diff.sequence_mode)
                ),
            )
            .with_context(json!({
                "tool": removed.name,
                "golden_position": removed.position,
                "sequence_mode": diff.sequence_mode.as_str(),
            }))
            .with_remediation(format!(
                "Check why the agent skipped '{}'; if the new behavior is intended, save it as a golden variant",
                removed.name
            )),
        );
    }

    // Extras are tolerated under subsequence and untracked under unordered.
    if diff.sequence_mode == SequenceMode::Exact {
        for added in &diff.added_tools {
            out.push(
                ReasonCode::error(
                    codes::TOOL_UNEXPECTED,
                    format!(
                        "tool '{}' at position {} is not in the golden sequence",
                        added.name, added.position
                    ),
                )
                .with_context(json!({
                    "tool": added.name,
                    "actual_position": added.position,
                }))
                .with_remediation(
                    "Remove the extra call, or switch sequence_mode to subsequence if extras are acceptable",
                ),
            );
        }

        if diff.order_changed {
            out.push(
                ReasonCode::error(
                    codes::TOOL_ORDER_CHANGED,
                    "same tools were called in a different order",
                )
                .with_remediation(
                    "Restore the original call order, or use sequence_mode unordered if order does not matter",
                ),
            );
        }
    }

    for pd in &diff.parameter_diffs {
        for field in &pd.fields {
            let context = json!({
                "tool": pd.tool,
                "key": field.key,
                "golden_value": field.golden_value,
                "actual_value": field.actual_value,
                "similarity": field.similarity,
            });
            let reason = match field.kind {
                FieldDiffKind::TypeChanged => ReasonCode::warning(
                    codes::PARAM_TYPE_MISMATCH,
                    format!(
                        "'{}.{}' changed type from {} to {}",
                        pd.tool,
                        field.key,
                        type_of(field.golden_value.as_ref()),
                        type_of(field.actual_value.as_ref())
                    ),
                ),
                FieldDiffKind::Changed => ReasonCode::warning(
                    codes::PARAM_VALUE_CHANGED,
                    format!(
                        "'{}.{}' changed (similarity {:.2})",
                        pd.tool, field.key, field.similarity
                    ),
                ),
                FieldDiffKind::Removed => ReasonCode::warning(
                    codes::PARAM_REMOVED,
                    format!("'{}.{}' is no longer passed", pd.tool, field.key),
                ),
                FieldDiffKind::Added => ReasonCode::info(
                    codes::PARAM_ADDED,
                    format!("'{}.{}' is a new parameter", pd.tool, field.key),
                ),
            };
            out.push(reason.with_context(context));
        }
    }
}

pub(crate) fn tool_failure_reasons(
    golden: &ExecutionTrace,
    actual: &ExecutionTrace,
    matched: &[(usize, usize)],
    out: &mut Vec<ReasonCode>,
) {
    for &(g, a) in matched {
        let (gc, ac) = (&golden.tool_calls[g], &actual.tool_calls[a]);
        if gc.success && !ac.success {
            out.push(
                ReasonCode::warning(
                    codes::TOOL_FAILED,
                    format!("tool '{}' failed where the golden run succeeded", ac.name),
                )
                .with_context(json!({
                    "tool": ac.name,
                    "actual_position": a,
                    "output": ac.output,
                }))
                .with_remediation("Inspect the tool output for the failure cause"),
            );
        }
    }
}

pub(crate) fn no_tool_calls_reason(golden_count: usize) -> ReasonCode {
    ReasonCode::warning(
        codes::NO_TOOL_CALLS,
        format!(
            "actual execution recorded no tool calls (golden has {})",
            golden_count
        ),
    )
    .with_context(json!({ "golden_tool_count": golden_count }))
    .with_remediation("Verify the adapter captures tool calls for this agent")
}

pub(crate) fn output_reasons(
    golden: &ExecutionTrace,
    actual: &ExecutionTrace,
    similarity: f64,
    config: &DiffConfig,
    out: &mut Vec<ReasonCode>,
) {
    let golden_empty = golden.final_output.trim().is_empty();
    let actual_empty = actual.final_output.trim().is_empty();

    if golden_empty != actual_empty {
        let side = if actual_empty { "actual" } else { "golden" };
        out.push(
            ReasonCode::warning(
                codes::OUTPUT_MISSING,
                format!("{} final output is empty; output similarity set to 0", side),
            )
            .with_context(json!({ "empty_side": side }))
            .with_remediation("Check that the agent produced a final answer"),
        );
        return;
    }

    if similarity < config.output_similarity_threshold {
        out.push(
            ReasonCode::warning(
                codes::OUTPUT_CHANGED,
                format!(
                    "output similarity {:.2} is below threshold {:.2}",
                    similarity, config.output_similarity_threshold
                ),
            )
            .with_context(json!({
                "similarity": similarity,
                "threshold": config.output_similarity_threshold,
            }))
            .with_remediation(
                "Review the new output; if it is acceptable, save it as an additional golden variant",
            ),
        );
    }
}

pub(crate) fn score_reasons(
    golden: &ExecutionTrace,
    actual: &ExecutionTrace,
    score_delta: f64,
    actual_passed: bool,
    config: &DiffConfig,
    out: &mut Vec<ReasonCode>,
) {
    let context = json!({
        "golden_score": golden.score,
        "actual_score": actual.score,
        "score_delta": score_delta,
        "threshold": config.score_regression_threshold,
    });

    if score_delta <= -config.score_regression_threshold {
        out.push(
            ReasonCode::error(
                codes::SCORE_REGRESSION,
                format!(
                    "score dropped {:.1} points ({:.1} -> {:.1}), threshold {:.1}",
                    -score_delta, golden.score, actual.score, config.score_regression_threshold
                ),
            )
            .with_context(context)
            .with_remediation(
                "Compare tool calls and output against the golden run to locate the regression",
            ),
        );
    } else if score_delta < 0.0 {
        out.push(
            ReasonCode::info(
                codes::SCORE_DROPPED,
                format!("score dropped {:.1} points (within threshold)", -score_delta),
            )
            .with_context(context),
        );
    }

    if !actual_passed {
        out.push(
            ReasonCode::error(
                codes::THRESHOLDS_FAILED,
                "execution failed its own pass/fail thresholds",
            )
            .with_context(json!({ "actual_score": actual.score })),
        );
    }
}

pub(crate) fn resource_reasons(
    cost_delta_pct: Option<f64>,
    latency_delta_pct: Option<f64>,
    out: &mut Vec<ReasonCode>,
) {
    if let Some(pct) = cost_delta_pct {
        if pct > RESOURCE_INCREASE_WARN_PCT {
            out.push(
                ReasonCode::warning(codes::COST_INCREASED, format!("cost increased {:.0}%", pct))
                    .with_context(json!({ "cost_delta_pct": pct })),
            );
        }
    }
    if let Some(pct) = latency_delta_pct {
        if pct > RESOURCE_INCREASE_WARN_PCT {
            out.push(
                ReasonCode::warning(
                    codes::LATENCY_INCREASED,
                    format!("latency increased {:.0}%", pct),
                )
                .with_context(json!({ "latency_delta_pct": pct })),
            );
        }
    }
}

fn mode_phrase(mode: SequenceMode) -> &'static str {
    match mode {
        SequenceMode::Exact => "at the expected position",
        SequenceMode::Subsequence => "in the expected order",
        SequenceMode::Unordered => "at all",
    }
}

fn type_of(v: Option<&serde_json::Value>) -> &'static str {
    v.map(crate::similarity::json_type_name).unwrap_or("missing")
}
