//! Reliability statistics over repeated trials of one scenario.
//!
//! Trials are produced elsewhere (possibly concurrently) and handed over
//! once all have finished; the analyzer performs a single synchronous
//! reduction. A timed-out or crashed trial arrives as `passed = false`.
//!
//! pass@k and pass^k use the i.i.d. Bernoulli approximation from the
//! observed pass rate: `1 - (1 - p)^k` and `p^k`.

mod flakiness;
mod summary;
mod verdict;

pub use flakiness::{
    ContributingFactor, FlakinessCategory, FlakinessFactor, FLAKY_BELOW, LOW_VARIANCE_BELOW,
    SCORE_STD_NORMALIZER, STABLE_BELOW,
};
pub use summary::{pass_at_k, pass_pow_k, t_multiplier, Percentiles, ScoreSummary};
pub use verdict::{StatisticalVerdict, Violation};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DiffConfig, StatsConfig};
use crate::diff::{DiffEngine, ToolDiff};
use crate::errors::{CoreError, CoreResult};
use crate::golden::GoldenBaseline;
use crate::model::ExecutionTrace;
use crate::severity::{classify, DiffStatus};
use crate::status::StatusCode;

/// One independent execution and its own pass/fail verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub trace: ExecutionTrace,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalRun {
    pub test_name: String,
    pub trials: Vec<Trial>,
}

impl StatisticalRun {
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            trials: Vec::new(),
        }
    }

    pub fn push(&mut self, trace: ExecutionTrace, passed: bool) {
        self.trials.push(Trial { trace, passed });
    }

    pub fn with_trial(mut self, trace: ExecutionTrace, passed: bool) -> Self {
        self.push(trace, passed);
        self
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityReport {
    pub test_name: String,
    pub runs: usize,
    pub passed: usize,
    pub pass_rate: f64,

    /// `None` only when no trial carried a finite score.
    pub mean_score: Option<f64>,
    /// Undefined for fewer than two scored trials.
    pub std_dev: Option<f64>,
    pub min_score: Option<f64>,
    pub max_score: Option<f64>,
    pub percentiles: Option<Percentiles>,
    pub ci95_low: Option<f64>,
    pub ci95_high: Option<f64>,

    /// The `k` used for pass@k / pass^k.
    pub k: u32,
    pub pass_at_k: f64,
    pub pass_pow_k: f64,

    pub flakiness_score: f64,
    pub flakiness_category: FlakinessCategory,
    /// Sorted by value, largest first.
    pub contributing_factors: Vec<ContributingFactor>,
    /// Fraction of trials sharing the most common tool sequence.
    pub tool_consistency: f64,

    /// Per-trial drift classification.
    pub status_counts: BTreeMap<DiffStatus, usize>,

    pub verdict: StatisticalVerdict,

    /// Conditions such as `INSUFFICIENT_SAMPLES`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<StatusCode>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl ReliabilityReport {
    pub fn insufficient_samples(&self) -> bool {
        self.flags.contains(&StatusCode::InsufficientSamples)
    }

    pub fn dominant_factor(&self) -> Option<FlakinessFactor> {
        self.contributing_factors
            .iter()
            .find(|f| f.dominant)
            .map(|f| f.factor)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticalAnalyzer {
    config: StatsConfig,
}

impl StatisticalAnalyzer {
    pub fn new(config: StatsConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    /// Aggregates the run. Per-trial status ignores drift: each trial is
    /// PASSED or REGRESSION from its own verdict alone. Use
    /// [`Self::analyze_against_baseline`] for drift-aware status counts.
    pub fn analyze(&self, run: &StatisticalRun) -> CoreResult<ReliabilityReport> {
        let cfg = DiffConfig::default();
        let no_tool_diff = ToolDiff::empty(cfg.sequence_mode);
        let statuses = run
            .trials
            .iter()
            .map(|t| classify(&no_tool_diff, 1.0, 0.0, t.passed, &cfg))
            .collect::<Vec<_>>();
        self.reduce(run, statuses)
    }

    /// Aggregates the run and classifies every trial against `baseline`
    /// through the diff engine.
    pub fn analyze_against_baseline(
        &self,
        run: &StatisticalRun,
        engine: &DiffEngine,
        baseline: &GoldenBaseline,
    ) -> CoreResult<ReliabilityReport> {
        if run.is_empty() {
            return Err(CoreError::EmptyRun {
                test_name: run.test_name.clone(),
            });
        }
        let statuses = run
            .trials
            .iter()
            .map(|t| engine.diff(baseline, &t.trace, t.passed).map(|r| r.status))
            .collect::<CoreResult<Vec<_>>>()?;
        self.reduce(run, statuses)
    }

    fn reduce(
        &self,
        run: &StatisticalRun,
        statuses: Vec<DiffStatus>,
    ) -> CoreResult<ReliabilityReport> {
        let n = run.trials.len();
        if n == 0 {
            return Err(CoreError::EmptyRun {
                test_name: run.test_name.clone(),
            });
        }

        let passed = run.trials.iter().filter(|t| t.passed).count();
        let pass_rate = passed as f64 / n as f64;

        let mut notes = Vec::new();
        let scores: Vec<f64> = run
            .trials
            .iter()
            .map(|t| t.trace.score)
            .filter(|s| s.is_finite())
            .collect();
        if scores.len() < n {
            notes.push(format!(
                "{} of {} trials had no finite score and were excluded from score statistics",
                n - scores.len(),
                n
            ));
        }
        let summary = ScoreSummary::from_scores(&scores);
        let std_dev = summary.as_ref().and_then(|s| s.std_dev);

        let mut flags = Vec::new();
        if std_dev.is_none() {
            flags.push(StatusCode::InsufficientSamples);
            notes.push(format!(
                "{} scored trial(s); std_dev and confidence interval need at least 2",
                scores.len()
            ));
        }

        let tool_consistency = flakiness::tool_consistency(run.trials.iter().map(|t| &t.trace));
        let flaky = flakiness::assess(pass_rate, std_dev, tool_consistency);

        let mean_score = summary.as_ref().map(|s| s.mean);
        let verdict = verdict::evaluate(&self.config, pass_rate, mean_score, std_dev);

        let mut status_counts = BTreeMap::new();
        for status in statuses {
            *status_counts.entry(status).or_insert(0) += 1;
        }

        let k = self.config.runs;
        let report = ReliabilityReport {
            test_name: run.test_name.clone(),
            runs: n,
            passed,
            pass_rate,
            mean_score,
            std_dev,
            min_score: summary.as_ref().map(|s| s.min),
            max_score: summary.as_ref().map(|s| s.max),
            percentiles: summary.as_ref().map(|s| s.percentiles),
            ci95_low: summary.as_ref().and_then(|s| s.ci95).map(|(lo, _)| lo),
            ci95_high: summary.as_ref().and_then(|s| s.ci95).map(|(_, hi)| hi),
            k,
            pass_at_k: pass_at_k(pass_rate, k),
            pass_pow_k: pass_pow_k(pass_rate, k),
            flakiness_score: flaky.score,
            flakiness_category: flaky.category,
            contributing_factors: flaky.factors,
            tool_consistency,
            status_counts,
            verdict,
            flags,
            notes,
        };

        debug!(
            test_name = %report.test_name,
            runs = report.runs,
            pass_rate = report.pass_rate,
            flakiness = report.flakiness_score,
            verdict = report.verdict.passed,
            "reduced statistical run"
        );
        Ok(report)
    }
}
