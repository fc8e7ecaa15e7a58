//! Regression detection and statistical reliability for agent executions.
//!
//! An [`ExecutionTrace`](model::ExecutionTrace) captured from an agent run is
//! compared against stored golden variants by the [`diff`] engine, or folded
//! together with repeated trials of the same scenario by the [`stats`]
//! analyzer. Neither calls an agent or computes a quality score; both are
//! pure computation over explicit inputs.

pub mod config;
pub mod diff;
pub mod errors;
pub mod golden;
pub mod model;
pub mod severity;
pub mod similarity;
pub mod stats;
pub mod status;

pub use config::{Config, DiffConfig, SequenceMode, StatsConfig};
pub use diff::{DiffEngine, DiffResult};
pub use errors::{CoreError, CoreResult};
pub use golden::{GoldenBaseline, GoldenStore, GoldenVariant};
pub use model::{ExecutionTrace, TokenUsage, ToolCall};
pub use severity::DiffStatus;
pub use stats::{ReliabilityReport, StatisticalAnalyzer, StatisticalRun};
pub use status::StatusCode;
