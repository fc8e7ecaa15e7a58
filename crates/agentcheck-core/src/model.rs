use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single tool invocation captured during an agent execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(alias = "tool", alias = "tool_name")]
    pub name: String,

    /// Arguments passed to the tool. Keys are unique and iterate in sorted order.
    #[serde(default, alias = "args")]
    pub parameters: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub output: serde_json::Value,

    #[serde(default = "default_success")]
    pub success: bool,

    /// Ordinal index within the execution.
    #[serde(default, alias = "index")]
    pub position: usize,
}

fn default_success() -> bool {
    true
}

impl ToolCall {
    pub fn new(name: impl Into<String>, position: usize) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeMap::new(),
            output: serde_json::Value::Null,
            success: true,
            position,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_output(mut self, output: serde_json::Value) -> Self {
        self.output = output;
        self
    }

    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// One captured agent execution, produced by the adapter layer and scored
/// externally. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionTrace {
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    #[serde(default)]
    pub final_output: String,

    /// Output-quality score on a 0–100 scale.
    #[serde(default)]
    pub score: f64,

    #[serde(default)]
    pub cost: f64,

    #[serde(default)]
    pub latency_ms: f64,

    #[serde(default, alias = "tokens")]
    pub token_usage: TokenUsage,
}

impl ExecutionTrace {
    /// Builds a trace from tool names in call order, assigning positions.
    pub fn from_tools<I, S>(tools: I, final_output: impl Into<String>, score: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tool_calls = tools
            .into_iter()
            .enumerate()
            .map(|(idx, name)| ToolCall::new(name, idx))
            .collect();
        Self {
            tool_calls,
            final_output: final_output.into(),
            score,
            cost: 0.0,
            latency_ms: 0.0,
            token_usage: TokenUsage::default(),
        }
    }

    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: f64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tool_calls.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_adapter_shape_with_aliases() {
        let trace: ExecutionTrace = serde_json::from_value(serde_json::json!({
            "tool_calls": [
                {"name": "search", "parameters": {"q": "rust"}, "output": {"hits": 3}, "success": true},
                {"tool": "analyze", "args": {"depth": 2}}
            ],
            "final_output": "done",
            "score": 88.5,
            "cost": 0.02,
            "latency_ms": 1200,
            "tokens": {"input_tokens": 100, "output_tokens": 40}
        }))
        .unwrap();

        assert_eq!(trace.tool_names(), vec!["search", "analyze"]);
        assert_eq!(trace.tool_calls[1].parameters["depth"], serde_json::json!(2));
        assert!(trace.tool_calls[1].success);
        assert_eq!(trace.token_usage.total(), 140);
    }

    #[test]
    fn from_tools_assigns_positions() {
        let trace = ExecutionTrace::from_tools(["a", "b", "c"], "out", 90.0);
        let positions: Vec<usize> = trace.tool_calls.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }
}
