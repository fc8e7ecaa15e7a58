//! Error types for baseline storage, diffing and aggregation.

pub mod reason;

pub use reason::{ReasonCode, Severity};

/// Core errors.
///
/// Only structural failures surface here. Degraded metrics (empty output,
/// empty tool list) are reported as [`ReasonCode`]s on the result instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The test has no stored golden variants.
    #[error("no baseline stored for test '{test_name}'")]
    NoBaseline { test_name: String },

    /// A specific variant does not exist.
    #[error("variant '{variant_id}' not found for test '{test_name}'")]
    NotFound {
        test_name: String,
        variant_id: String,
    },

    /// Saving a new variant would exceed the per-test cap.
    #[error(
        "test '{test_name}' already has {max} variants; delete one before saving '{variant_id}'"
    )]
    MaxVariantsExceeded {
        test_name: String,
        variant_id: String,
        max: usize,
    },

    /// A statistical run contained zero samples.
    #[error("statistical run for '{test_name}' has no samples")]
    EmptyRun { test_name: String },

    /// Test name or variant id is not usable as a file name component.
    #[error("invalid {kind} '{value}': {reason}")]
    InvalidName {
        kind: &'static str,
        value: String,
        reason: String,
    },

    /// Trace cannot be stored as a golden snapshot.
    #[error("invalid trace for test '{test_name}': {reason}")]
    InvalidTrace { test_name: String, reason: String },

    /// Configuration value rejected at the boundary.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Filesystem or serialization failure in the golden store.
    #[error("storage error: {message}")]
    Storage { message: String },

    /// Stored snapshot does not match its recorded digest.
    #[error(
        "baseline '{test_name}/{variant_id}' is corrupt: expected digest {expected}, got {actual}"
    )]
    CorruptBaseline {
        test_name: String,
        variant_id: String,
        expected: String,
        actual: String,
    },
}

impl CoreError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoBaseline { .. } => "NO_BASELINE",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::MaxVariantsExceeded { .. } => "MAX_VARIANTS_EXCEEDED",
            Self::EmptyRun { .. } => "EMPTY_RUN",
            Self::InvalidName { .. } => "INVALID_NAME",
            Self::InvalidTrace { .. } => "INVALID_TRACE",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Storage { .. } => "STORAGE_ERROR",
            Self::CorruptBaseline { .. } => "CORRUPT_BASELINE",
        }
    }

    /// Exit code for CLI callers.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Test-level failures
            Self::NoBaseline { .. } => 1,
            Self::NotFound { .. } => 1,
            Self::EmptyRun { .. } => 1,

            // Configuration / user input
            Self::MaxVariantsExceeded { .. } => 2,
            Self::InvalidName { .. } => 2,
            Self::InvalidTrace { .. } => 2,
            Self::Config { .. } => 2,

            // Infra
            Self::Storage { .. } => 3,
            Self::CorruptBaseline { .. } => 3,
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
