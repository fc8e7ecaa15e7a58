//! Typed configuration for diffing and statistical evaluation.
//!
//! YAML is parsed into [`RawConfig`] and validated once into [`Config`];
//! nothing downstream reads untyped configuration. Invalid values are
//! rejected, never clamped.

use crate::errors::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Upper bound on trials per statistical evaluation.
pub const MAX_RUNS: u32 = 10_000;

/// Fixed per-test cap on stored golden variants.
pub const MAX_VARIANTS: usize = 5;

/// How tool-call order and extra calls are judged against the golden run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceMode {
    /// Same names, same order, same count.
    Exact,
    /// Golden tools appear in order; extra calls in between are allowed.
    #[default]
    Subsequence,
    /// Golden tools all appear; order ignored.
    Unordered,
}

impl SequenceMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Subsequence => "subsequence",
            Self::Unordered => "unordered",
        }
    }
}

impl std::str::FromStr for SequenceMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exact" => Ok(Self::Exact),
            "subsequence" => Ok(Self::Subsequence),
            "unordered" => Ok(Self::Unordered),
            other => Err(CoreError::config(format!(
                "unknown sequence_mode '{}' (expected exact, subsequence or unordered)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiffConfig {
    pub sequence_mode: SequenceMode,
    /// Output similarity below this is OUTPUT_CHANGED.
    pub output_similarity_threshold: f64,
    /// A score drop of at least this many points is a REGRESSION.
    pub score_regression_threshold: f64,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            sequence_mode: SequenceMode::Subsequence,
            output_similarity_threshold: 0.9,
            score_regression_threshold: 5.0,
        }
    }
}

impl DiffConfig {
    pub fn with_sequence_mode(mut self, mode: SequenceMode) -> Self {
        self.sequence_mode = mode;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        check_unit("output_similarity_threshold", self.output_similarity_threshold)?;
        check_non_negative("score_regression_threshold", self.score_regression_threshold)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Trials per statistical evaluation; also the `k` of pass@k / pass^k.
    pub runs: u32,
    pub required_pass_rate: f64,
    #[serde(default)]
    pub min_mean_score: Option<f64>,
    #[serde(default)]
    pub max_std_dev: Option<f64>,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            runs: 10,
            required_pass_rate: 0.8,
            min_mean_score: None,
            max_std_dev: None,
        }
    }
}

impl StatsConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.runs == 0 || self.runs > MAX_RUNS {
            return Err(CoreError::config(format!(
                "runs must be within [1, {}], got {}",
                MAX_RUNS, self.runs
            )));
        }
        check_unit("pass_rate", self.required_pass_rate)?;
        if let Some(min) = self.min_mean_score {
            if !min.is_finite() || !(0.0..=100.0).contains(&min) {
                return Err(CoreError::config(format!(
                    "min_mean_score must be within [0, 100], got {}",
                    min
                )));
            }
        }
        if let Some(max) = self.max_std_dev {
            check_non_negative("max_std_dev", max)?;
        }
        Ok(())
    }
}

/// Effective settings for one test after per-test overrides are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TestConfig {
    pub diff: DiffConfig,
    pub statistics: StatsConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub diff: DiffConfig,
    pub statistics: StatsConfig,
    tests: BTreeMap<String, TestConfig>,
}

impl Config {
    /// Suite defaults, then the test's own overrides if any.
    pub fn for_test(&self, test_name: &str) -> TestConfig {
        self.tests.get(test_name).copied().unwrap_or(TestConfig {
            diff: self.diff,
            statistics: self.statistics,
        })
    }

    pub fn overridden_tests(&self) -> impl Iterator<Item = &str> {
        self.tests.keys().map(String::as_str)
    }
}

/// Threshold fields shared by the suite level and per-test overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSettings {
    #[serde(default)]
    pub sequence_mode: Option<String>,
    #[serde(default)]
    pub output_similarity_threshold: Option<f64>,
    #[serde(default)]
    pub score_regression_threshold: Option<f64>,
    #[serde(default)]
    pub runs: Option<u32>,
    #[serde(default)]
    pub pass_rate: Option<f64>,
    #[serde(default)]
    pub min_mean_score: Option<f64>,
    #[serde(default)]
    pub max_std_dev: Option<f64>,
    #[serde(default)]
    pub max_variants: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(flatten)]
    pub settings: RawSettings,
    #[serde(default)]
    pub tests: BTreeMap<String, RawSettings>,
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

impl RawConfig {
    pub fn validate(self) -> CoreResult<Config> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(CoreError::config(format!(
                "unsupported config version {} (supported: {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }

        let suite = apply_settings("suite", &self.settings, TestConfig::default())?;

        let mut tests = BTreeMap::new();
        for (name, raw) in &self.tests {
            let resolved = apply_settings(&format!("tests.{}", name), raw, suite)?;
            tests.insert(name.clone(), resolved);
        }

        Ok(Config {
            diff: suite.diff,
            statistics: suite.statistics,
            tests,
        })
    }
}

fn apply_settings(scope: &str, raw: &RawSettings, base: TestConfig) -> CoreResult<TestConfig> {
    let scoped = |e: CoreError| match e {
        CoreError::Config { message } => CoreError::config(format!("{}: {}", scope, message)),
        other => other,
    };

    if let Some(max) = raw.max_variants {
        if max != MAX_VARIANTS {
            return Err(scoped(CoreError::config(format!(
                "max_variants is fixed at {}, got {}",
                MAX_VARIANTS, max
            ))));
        }
    }

    let mut diff = base.diff;
    if let Some(mode) = &raw.sequence_mode {
        diff.sequence_mode = mode.parse().map_err(scoped)?;
    }
    if let Some(v) = raw.output_similarity_threshold {
        diff.output_similarity_threshold = v;
    }
    if let Some(v) = raw.score_regression_threshold {
        diff.score_regression_threshold = v;
    }
    diff.validate().map_err(scoped)?;

    let mut statistics = base.statistics;
    if let Some(v) = raw.runs {
        statistics.runs = v;
    }
    if let Some(v) = raw.pass_rate {
        statistics.required_pass_rate = v;
    }
    if raw.min_mean_score.is_some() {
        statistics.min_mean_score = raw.min_mean_score;
    }
    if raw.max_std_dev.is_some() {
        statistics.max_std_dev = raw.max_std_dev;
    }
    statistics.validate().map_err(scoped)?;

    Ok(TestConfig { diff, statistics })
}

fn check_unit(name: &str, value: f64) -> CoreResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(CoreError::config(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

fn check_non_negative(name: &str, value: f64) -> CoreResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::config(format!(
            "{} must be a non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

pub fn parse_config(yaml: &str) -> CoreResult<Config> {
    let raw: RawConfig = serde_yaml::from_str(yaml)
        .map_err(|e| CoreError::config(format!("failed to parse YAML: {}", e)))?;
    raw.validate()
}

pub fn load_config(path: &Path) -> CoreResult<Config> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        CoreError::config(format!("failed to read config {}: {}", path.display(), e))
    })?;
    parse_config(&raw)
}
