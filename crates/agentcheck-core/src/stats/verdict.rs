use serde::{Deserialize, Serialize};

use crate::config::StatsConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// `pass_rate`, `min_mean_score` or `max_std_dev`.
    pub constraint: String,
    pub expected: f64,
    pub actual: f64,
    pub message: String,
}

/// Pass/fail decision over the aggregate statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalVerdict {
    pub passed: bool,
    #[serde(default)]
    pub violations: Vec<Violation>,
    /// Configured constraints whose statistic is undefined for this run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub not_evaluated: Vec<String>,
}

pub(crate) fn evaluate(
    config: &StatsConfig,
    pass_rate: f64,
    mean_score: Option<f64>,
    std_dev: Option<f64>,
) -> StatisticalVerdict {
    let mut violations = Vec::new();
    let mut not_evaluated = Vec::new();

    if pass_rate < config.required_pass_rate {
        violations.push(Violation {
            constraint: "pass_rate".to_string(),
            expected: config.required_pass_rate,
            actual: pass_rate,
            message: format!(
                "pass rate {:.1}% is below required {:.1}%",
                pass_rate * 100.0,
                config.required_pass_rate * 100.0
            ),
        });
    }

    if let Some(min) = config.min_mean_score {
        match mean_score {
            Some(mean) if mean < min => violations.push(Violation {
                constraint: "min_mean_score".to_string(),
                expected: min,
                actual: mean,
                message: format!("mean score {:.2} is below minimum {:.2}", mean, min),
            }),
            Some(_) => {}
            None => not_evaluated.push("min_mean_score".to_string()),
        }
    }

    if let Some(max) = config.max_std_dev {
        match std_dev {
            Some(sd) if sd > max => violations.push(Violation {
                constraint: "max_std_dev".to_string(),
                expected: max,
                actual: sd,
                message: format!("score std dev {:.2} exceeds maximum {:.2}", sd, max),
            }),
            Some(_) => {}
            None => not_evaluated.push("max_std_dev".to_string()),
        }
    }

    StatisticalVerdict {
        passed: violations.is_empty(),
        violations,
        not_evaluated,
    }
}
