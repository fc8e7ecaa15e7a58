use tracing::warn;

use crate::config::Config;
use crate::errors::CoreResult;
use crate::golden::GoldenStore;
use crate::model::ExecutionTrace;
use crate::status::StatusCode;

use super::{DiffEngine, DiffResult};

/// One test's actual execution awaiting comparison.
#[derive(Debug, Clone, Copy)]
pub struct DiffCase<'a> {
    pub test_name: &'a str,
    pub actual: &'a ExecutionTrace,
    pub actual_passed: bool,
}

#[derive(Debug)]
pub struct BatchEntry {
    pub test_name: String,
    pub outcome: CoreResult<DiffResult>,
}

impl BatchEntry {
    /// Caller-facing status, or `None` for failures outside the status registry.
    pub fn status_code(&self) -> Option<StatusCode> {
        match &self.outcome {
            Ok(result) => Some(result.status.into()),
            Err(err) => StatusCode::from_error(err),
        }
    }
}

/// Diffs many tests, each with its own resolved configuration.
///
/// A failure for one test (typically `NO_BASELINE`) is recorded on its entry
/// and the remaining tests are still evaluated.
pub fn diff_batch<'a, I>(config: &Config, store: &GoldenStore, cases: I) -> Vec<BatchEntry>
where
    I: IntoIterator<Item = DiffCase<'a>>,
{
    cases
        .into_iter()
        .map(|case| {
            let engine = DiffEngine::from_validated(config.for_test(case.test_name).diff);
            let outcome =
                engine.diff_stored(store, case.test_name, case.actual, case.actual_passed);
            if let Err(err) = &outcome {
                warn!(test_name = case.test_name, code = err.code(), "diff failed: {}", err);
            }
            BatchEntry {
                test_name: case.test_name.to_string(),
                outcome,
            }
        })
        .collect()
}
