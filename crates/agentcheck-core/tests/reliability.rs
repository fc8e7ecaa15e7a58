//! Aggregation of repeated trials into a reliability report.

use agentcheck_core::stats::{FlakinessCategory, FlakinessFactor};
use agentcheck_core::{
    CoreError, DiffEngine, DiffStatus, ExecutionTrace, GoldenStore, StatisticalAnalyzer,
    StatisticalRun, StatsConfig, StatusCode,
};
use anyhow::Result;
use tempfile::TempDir;

fn trial(tools: &[&str], score: f64) -> ExecutionTrace {
    ExecutionTrace::from_tools(tools.iter().copied(), "answer", score)
}

fn eight_of_ten() -> StatisticalRun {
    let scores = [92.0, 88.0, 90.0, 91.0, 87.0, 89.0, 93.0, 90.0, 55.0, 60.0];
    let mut run = StatisticalRun::new("support_bot");
    for (i, score) in scores.iter().enumerate() {
        run.push(trial(&["search", "answer"], *score), i < 8);
    }
    run
}

#[test]
fn ten_trials_eight_passing() -> Result<()> {
    let analyzer = StatisticalAnalyzer::new(StatsConfig::default())?;
    let report = analyzer.analyze(&eight_of_ten())?;

    assert_eq!(report.runs, 10);
    assert_eq!(report.passed, 8);
    assert!((report.pass_rate - 0.8).abs() < 1e-12);
    assert_eq!(report.k, 10);
    assert!((report.pass_at_k - 0.999_999_897_6).abs() < 1e-9);
    assert!((report.pass_pow_k - 0.107_374_182_4).abs() < 1e-9);
    assert!(report.verdict.passed);
    assert!(!report.insufficient_samples());

    let (low, high) = (report.ci95_low.unwrap(), report.ci95_high.unwrap());
    let mean = report.mean_score.unwrap();
    assert!(low < mean && mean < high);
    assert_eq!(report.status_counts.get(&DiffStatus::Regression), Some(&2));
    assert_eq!(report.tool_consistency, 1.0);
    Ok(())
}

#[test]
fn noisy_scores_make_a_run_flaky() -> Result<()> {
    let analyzer = StatisticalAnalyzer::default();
    let report = analyzer.analyze(&eight_of_ten())?;

    assert!(report.flakiness_score > 0.2);
    assert_ne!(report.flakiness_category, FlakinessCategory::Stable);
    assert_eq!(report.dominant_factor(), Some(FlakinessFactor::ScoreVariance));
    Ok(())
}

#[test]
fn empty_run_is_rejected() {
    let err = StatisticalAnalyzer::default()
        .analyze(&StatisticalRun::new("nothing"))
        .unwrap_err();
    assert!(matches!(err, CoreError::EmptyRun { .. }));
    assert_eq!(err.code(), "EMPTY_RUN");
}

#[test]
fn single_trial_is_flagged() -> Result<()> {
    let run = StatisticalRun::new("once").with_trial(trial(&["search"], 80.0), true);
    let report = StatisticalAnalyzer::default().analyze(&run)?;

    assert!(report.insufficient_samples());
    assert_eq!(report.flags, vec![StatusCode::InsufficientSamples]);
    assert!(report.std_dev.is_none());
    assert_eq!(report.mean_score, Some(80.0));
    Ok(())
}

#[test]
fn verdict_lists_every_violated_constraint() -> Result<()> {
    let config = StatsConfig {
        required_pass_rate: 0.9,
        min_mean_score: Some(90.0),
        max_std_dev: Some(5.0),
        ..StatsConfig::default()
    };
    let report = StatisticalAnalyzer::new(config)?.analyze(&eight_of_ten())?;

    assert!(!report.verdict.passed);
    let constraints: Vec<&str> = report
        .verdict
        .violations
        .iter()
        .map(|v| v.constraint.as_str())
        .collect();
    assert_eq!(constraints, vec!["pass_rate", "min_mean_score", "max_std_dev"]);
    Ok(())
}

#[test]
fn invalid_config_is_rejected() {
    let config = StatsConfig {
        required_pass_rate: 1.5,
        ..StatsConfig::default()
    };
    assert!(StatisticalAnalyzer::new(config).is_err());
}

#[test]
fn trials_are_classified_against_the_baseline() -> Result<()> {
    let dir = TempDir::new()?;
    let store = GoldenStore::new(dir.path());
    store.save("support_bot", trial(&["search", "answer"], 90.0), None, None)?;
    let baseline = store.load("support_bot")?;

    let run = StatisticalRun::new("support_bot")
        .with_trial(trial(&["search", "answer"], 90.0), true)
        .with_trial(trial(&["search", "answer"], 89.0), true)
        .with_trial(trial(&["answer"], 88.0), true)
        .with_trial(trial(&["search", "answer"], 40.0), false);

    let report = StatisticalAnalyzer::default().analyze_against_baseline(
        &run,
        &DiffEngine::default(),
        &baseline,
    )?;

    assert_eq!(report.status_counts.get(&DiffStatus::Passed), Some(&2));
    assert_eq!(report.status_counts.get(&DiffStatus::ToolsChanged), Some(&1));
    assert_eq!(report.status_counts.get(&DiffStatus::Regression), Some(&1));
    assert!((report.tool_consistency - 0.75).abs() < 1e-12);
    Ok(())
}

#[test]
fn evenly_spread_scores_with_two_failures() -> Result<()> {
    let mut run = StatisticalRun::new("spread");
    for (i, score) in (75..=84).enumerate() {
        run.push(trial(&["search"], f64::from(score)), i < 8);
    }
    let report = StatisticalAnalyzer::default().analyze(&run)?;

    assert!((report.pass_rate - 0.8).abs() < 1e-12);
    assert!((report.pass_at_k - 0.999_999_9).abs() < 1e-6);
    assert!((report.pass_pow_k - 0.107).abs() < 1e-3);
    assert_eq!(report.mean_score, Some(79.5));
    assert_eq!(report.min_score, Some(75.0));
    assert_eq!(report.max_score, Some(84.0));
    Ok(())
}

#[test]
fn reordered_tools_alone_are_not_a_dominant_factor() -> Result<()> {
    let run = StatisticalRun::new("reordered")
        .with_trial(trial(&["a", "b"], 90.0), true)
        .with_trial(trial(&["b", "a"], 90.0), true);
    let report = StatisticalAnalyzer::default().analyze(&run)?;

    assert_eq!(report.flakiness_score, 0.0);
    assert_eq!(report.tool_consistency, 0.5);
    assert_eq!(report.dominant_factor(), None);
    assert!(report
        .contributing_factors
        .iter()
        .any(|f| f.factor == FlakinessFactor::ToolInconsistency && f.value == 0.5));
    Ok(())
}
