//! Caller-facing status codes and their process exit codes.

use crate::errors::CoreError;
use crate::severity::DiffStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Passed,
    OutputChanged,
    ToolsChanged,
    Regression,
    NoBaseline,
    InsufficientSamples,
    MaxVariantsExceeded,
}

impl StatusCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::OutputChanged => "OUTPUT_CHANGED",
            Self::ToolsChanged => "TOOLS_CHANGED",
            Self::Regression => "REGRESSION",
            Self::NoBaseline => "NO_BASELINE",
            Self::InsufficientSamples => "INSUFFICIENT_SAMPLES",
            Self::MaxVariantsExceeded => "MAX_VARIANTS_EXCEEDED",
        }
    }

    /// 0 = pass (warnings included), 1 = test failure, 2 = configuration error.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Passed | Self::OutputChanged => 0,
            Self::ToolsChanged | Self::Regression => 1,
            Self::NoBaseline | Self::InsufficientSamples => 1,
            Self::MaxVariantsExceeded => 2,
        }
    }

    pub fn from_error(err: &CoreError) -> Option<Self> {
        match err {
            CoreError::NoBaseline { .. } => Some(Self::NoBaseline),
            CoreError::MaxVariantsExceeded { .. } => Some(Self::MaxVariantsExceeded),
            _ => None,
        }
    }

    /// Most severe exit code across a set of statuses; 0 for an empty set.
    pub fn aggregate_exit_code<I>(statuses: I) -> i32
    where
        I: IntoIterator<Item = StatusCode>,
    {
        statuses
            .into_iter()
            .map(StatusCode::exit_code)
            .max()
            .unwrap_or(0)
    }
}

impl From<DiffStatus> for StatusCode {
    fn from(s: DiffStatus) -> Self {
        match s {
            DiffStatus::Passed => Self::Passed,
            DiffStatus::OutputChanged => Self::OutputChanged,
            DiffStatus::ToolsChanged => Self::ToolsChanged,
            DiffStatus::Regression => Self::Regression,
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
