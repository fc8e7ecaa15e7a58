//! Flakiness scoring across repeated trials.
//!
//! The score combines the pass-rate deficit `d = 1 - pass_rate` and the
//! normalized score spread `v = min(std_dev / 25, 1)` as `1 - (1-d)(1-v)`:
//! zero only when both are zero, increasing in each, and tending to 1 as the
//! pass rate tends to 0. Tool-call inconsistency is reported as a
//! contributing factor but does not enter the score.

use serde::{Deserialize, Serialize};

use crate::model::ExecutionTrace;

/// A score standard deviation at or above this saturates the variance term.
pub const SCORE_STD_NORMALIZER: f64 = 25.0;

pub const STABLE_BELOW: f64 = 0.2;
pub const LOW_VARIANCE_BELOW: f64 = 0.4;
pub const FLAKY_BELOW: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlakinessCategory {
    /// score < 0.2
    Stable,
    /// 0.2 <= score < 0.4
    LowVariance,
    /// 0.4 <= score < 0.7
    Flaky,
    /// score >= 0.7
    Unreliable,
}

impl FlakinessCategory {
    pub fn from_score(score: f64) -> Self {
        if score < STABLE_BELOW {
            Self::Stable
        } else if score < LOW_VARIANCE_BELOW {
            Self::LowVariance
        } else if score < FLAKY_BELOW {
            Self::Flaky
        } else {
            Self::Unreliable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlakinessFactor {
    PassRateDeficit,
    ScoreVariance,
    ToolInconsistency,
}

impl FlakinessFactor {
    /// Whether the factor is a term of the flakiness score.
    pub fn drives_score(self) -> bool {
        matches!(self, Self::PassRateDeficit | Self::ScoreVariance)
    }
}

/// `dominant` marks the largest non-zero term of the score; tool
/// inconsistency is listed for diagnosis but never dominant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributingFactor {
    pub factor: FlakinessFactor,
    /// Normalized to [0, 1].
    pub value: f64,
    pub dominant: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FlakinessAssessment {
    pub score: f64,
    pub category: FlakinessCategory,
    pub factors: Vec<ContributingFactor>,
}

pub(crate) fn assess(
    pass_rate: f64,
    std_dev: Option<f64>,
    tool_consistency: f64,
) -> FlakinessAssessment {
    let deficit = (1.0 - pass_rate).clamp(0.0, 1.0);
    let variance = normalized_variance(std_dev);
    let inconsistency = (1.0 - tool_consistency).clamp(0.0, 1.0);

    let score = (1.0 - (1.0 - deficit) * (1.0 - variance)).clamp(0.0, 1.0);

    let mut factors = vec![
        ContributingFactor {
            factor: FlakinessFactor::PassRateDeficit,
            value: deficit,
            dominant: false,
        },
        ContributingFactor {
            factor: FlakinessFactor::ScoreVariance,
            value: variance,
            dominant: false,
        },
        ContributingFactor {
            factor: FlakinessFactor::ToolInconsistency,
            value: inconsistency,
            dominant: false,
        },
    ];
    // Stable sort keeps the declaration order on ties.
    factors.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    if let Some(top) = factors
        .iter_mut()
        .find(|f| f.factor.drives_score() && f.value > 0.0)
    {
        top.dominant = true;
    }

    FlakinessAssessment {
        score,
        category: FlakinessCategory::from_score(score),
        factors,
    }
}

fn normalized_variance(std_dev: Option<f64>) -> f64 {
    match std_dev {
        Some(sd) if sd.is_finite() => (sd / SCORE_STD_NORMALIZER).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Fraction of traces whose tool-name sequence equals the most common one.
///
/// Ties between equally common sequences go to the one seen first.
pub(crate) fn tool_consistency<'a, I>(traces: I) -> f64
where
    I: IntoIterator<Item = &'a ExecutionTrace>,
{
    let mut seen: Vec<(Vec<&'a str>, usize)> = Vec::new();
    let mut total = 0usize;
    for trace in traces {
        total += 1;
        let names = trace.tool_names();
        match seen.iter_mut().find(|(seq, _)| *seq == names) {
            Some((_, count)) => *count += 1,
            None => seen.push((names, 1)),
        }
    }
    if total == 0 {
        return 1.0;
    }
    let modal = seen.iter().map(|(_, count)| *count).max().unwrap_or(0);
    modal as f64 / total as f64
}
