use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// One machine-readable contributor to a diff classification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReasonCode {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub context: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ReasonCode {
    pub fn new(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            context: serde_json::json!({}),
            remediation: None,
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Info, message)
    }

    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = context;
        self
    }

    pub fn with_remediation(mut self, remediation: impl Into<String>) -> Self {
        self.remediation = Some(remediation.into());
        self
    }

    pub fn format_terminal(&self) -> String {
        let tag = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warn",
            Severity::Info => "info",
        };
        let mut s = format!("[{}] {}: {}", tag, self.code, self.message);
        if let Some(fix) = &self.remediation {
            s.push_str(&format!("\n  fix: {}", fix));
        }
        s
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_terminal())
    }
}

// Reason code registry
pub mod codes {
    // Tool sequence
    pub const TOOL_MISSING: &str = "TOOL_MISSING";
    pub const TOOL_UNEXPECTED: &str = "TOOL_UNEXPECTED";
    pub const TOOL_ORDER_CHANGED: &str = "TOOL_ORDER_CHANGED";
    pub const TOOL_FAILED: &str = "TOOL_FAILED";
    pub const NO_TOOL_CALLS: &str = "NO_TOOL_CALLS";

    // Parameters
    pub const PARAM_TYPE_MISMATCH: &str = "PARAM_TYPE_MISMATCH";
    pub const PARAM_VALUE_CHANGED: &str = "PARAM_VALUE_CHANGED";
    pub const PARAM_ADDED: &str = "PARAM_ADDED";
    pub const PARAM_REMOVED: &str = "PARAM_REMOVED";

    // Output
    pub const OUTPUT_CHANGED: &str = "OUTPUT_CHANGED";
    pub const OUTPUT_MISSING: &str = "OUTPUT_MISSING";

    // Score / thresholds
    pub const SCORE_REGRESSION: &str = "SCORE_REGRESSION";
    pub const SCORE_DROPPED: &str = "SCORE_DROPPED";
    pub const THRESHOLDS_FAILED: &str = "THRESHOLDS_FAILED";

    // Cost / latency
    pub const COST_INCREASED: &str = "COST_INCREASED";
    pub const LATENCY_INCREASED: &str = "LATENCY_INCREASED";
}
