use crate::config::SequenceMode;
use crate::errors::ReasonCode;
use crate::severity::DiffStatus;
use serde::{Deserialize, Serialize};

/// A tool call identified by name and its position in its own trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRef {
    pub name: String,
    pub position: usize,
}

impl ToolRef {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldDiffKind {
    Changed,
    Added,
    Removed,
    TypeChanged,
}

/// One parameter-level difference between matched tool calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDiff {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub golden_value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_value: Option<serde_json::Value>,
    pub similarity: f64,
    pub kind: FieldDiffKind,
}

/// Parameter differences for one matched (golden, actual) call pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParamDiff {
    pub tool: String,
    pub golden_position: usize,
    pub actual_position: usize,
    pub fields: Vec<FieldDiff>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDiff {
    pub sequence_mode: SequenceMode,
    #[serde(default)]
    pub added_tools: Vec<ToolRef>,
    #[serde(default)]
    pub removed_tools: Vec<ToolRef>,
    /// Exact mode only: same tools, different order.
    #[serde(default)]
    pub order_changed: bool,
    #[serde(default)]
    pub parameter_diffs: Vec<ToolParamDiff>,
}

impl ToolDiff {
    pub fn empty(sequence_mode: SequenceMode) -> Self {
        Self {
            sequence_mode,
            added_tools: Vec::new(),
            removed_tools: Vec::new(),
            order_changed: false,
            parameter_diffs: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added_tools.is_empty()
            && self.removed_tools.is_empty()
            && !self.order_changed
            && self.parameter_diffs.is_empty()
    }

    /// Whether the tool sequence differs in a way the active mode penalizes.
    ///
    /// Extra calls only count under `exact`; missing calls count everywhere.
    pub fn has_sequence_changes(&self) -> bool {
        if !self.removed_tools.is_empty() {
            return true;
        }
        match self.sequence_mode {
            SequenceMode::Exact => !self.added_tools.is_empty() || self.order_changed,
            SequenceMode::Subsequence | SequenceMode::Unordered => false,
        }
    }

    pub fn field_diff_count(&self) -> usize {
        self.parameter_diffs.iter().map(|p| p.fields.len()).sum()
    }
}

/// Outcome of comparing one execution against a test's golden baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub status: DiffStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_variant_id: Option<String>,
    pub tool_diff: ToolDiff,
    pub output_similarity: f64,
    pub score_delta: f64,
    /// `None` when the golden cost is zero and the actual cost is not.
    pub cost_delta_pct: Option<f64>,
    pub latency_delta_pct: Option<f64>,
    pub reason_codes: Vec<ReasonCode>,
}

impl DiffResult {
    pub fn has_reason(&self, code: &str) -> bool {
        self.reason_codes.iter().any(|r| r.code == code)
    }
}
