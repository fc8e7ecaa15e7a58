//! Maps raw comparison facts to a single drift status.

use crate::config::DiffConfig;
use crate::diff::ToolDiff;
use serde::{Deserialize, Serialize};

/// Drift classification, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiffStatus {
    Passed,
    OutputChanged,
    ToolsChanged,
    Regression,
}

impl DiffStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::OutputChanged => "OUTPUT_CHANGED",
            Self::ToolsChanged => "TOOLS_CHANGED",
            Self::Regression => "REGRESSION",
        }
    }

    pub fn is_pass(self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies one comparison.
///
/// `actual_passed` is the run's verdict against its own pass/fail thresholds,
/// decided by the external scorer.
pub fn classify(
    tool_diff: &ToolDiff,
    output_similarity: f64,
    score_delta: f64,
    actual_passed: bool,
    config: &DiffConfig,
) -> DiffStatus {
    if score_delta <= -config.score_regression_threshold || !actual_passed {
        DiffStatus::Regression
    } else if tool_diff.has_sequence_changes() {
        DiffStatus::ToolsChanged
    } else if output_similarity < config.output_similarity_threshold {
        DiffStatus::OutputChanged
    } else {
        DiffStatus::Passed
    }
}
