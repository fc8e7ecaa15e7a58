//! Golden store behavior through the public API only.

use agentcheck_core::config::MAX_VARIANTS;
use agentcheck_core::golden::DEFAULT_VARIANT_ID;
use agentcheck_core::{CoreError, ExecutionTrace, GoldenStore, StatusCode, ToolCall};
use anyhow::Result;
use serde_json::json;
use tempfile::TempDir;

fn trace(score: f64) -> ExecutionTrace {
    let mut trace = ExecutionTrace::from_tools(Vec::<String>::new(), "summary of results", score);
    trace.tool_calls = vec![
        ToolCall::new("search", 0).with_param("query", json!("rust tracing")),
        ToolCall::new("analyze", 1),
    ];
    trace
}

#[test]
fn save_then_list_and_get() -> Result<()> {
    let dir = TempDir::new()?;
    let store = GoldenStore::new(dir.path());

    let saved = store.save("checkout_flow", trace(90.0), None, Some("first".into()))?;
    assert_eq!(saved.variant_id, DEFAULT_VARIANT_ID);

    let variants = store.list("checkout_flow")?;
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].trace, trace(90.0));
    assert_eq!(variants[0].notes.as_deref(), Some("first"));

    let fetched = store.get("checkout_flow", DEFAULT_VARIANT_ID)?;
    assert_eq!(fetched, saved);
    Ok(())
}

#[test]
fn sixth_variant_is_rejected_without_eviction() -> Result<()> {
    let dir = TempDir::new()?;
    let store = GoldenStore::new(dir.path());

    for i in 0..MAX_VARIANTS {
        store.save("busy", trace(80.0 + i as f64), Some(format!("v{}", i).as_str()), None)?;
    }

    let err = store
        .save("busy", trace(99.0), Some("v_extra"), None)
        .unwrap_err();
    assert!(matches!(err, CoreError::MaxVariantsExceeded { .. }));
    assert_eq!(err.code(), "MAX_VARIANTS_EXCEEDED");
    assert_eq!(StatusCode::from_error(&err), Some(StatusCode::MaxVariantsExceeded));
    assert_eq!(err.exit_code(), 2);

    let ids: Vec<String> = store
        .list("busy")?
        .into_iter()
        .map(|v| v.variant_id)
        .collect();
    assert_eq!(ids, vec!["v0", "v1", "v2", "v3", "v4"]);
    Ok(())
}

#[test]
fn baselines_survive_a_new_store_handle() -> Result<()> {
    let dir = TempDir::new()?;
    GoldenStore::new(dir.path()).save("persisted", trace(75.0), Some("a"), None)?;

    let reopened = GoldenStore::new(dir.path());
    let baseline = reopened.load("persisted")?;
    assert_eq!(baseline.variant_ids(), vec!["a"]);
    assert_eq!(reopened.tests()?, vec!["persisted".to_string()]);
    Ok(())
}

#[test]
fn missing_baseline_reports_no_baseline() -> Result<()> {
    let dir = TempDir::new()?;
    let store = GoldenStore::new(dir.path());

    assert!(store.list("never_saved")?.is_empty());
    let err = store.load("never_saved").unwrap_err();
    assert_eq!(err.code(), "NO_BASELINE");
    assert_eq!(StatusCode::from_error(&err), Some(StatusCode::NoBaseline));
    Ok(())
}

#[test]
fn delete_variant_keeps_the_rest() -> Result<()> {
    let dir = TempDir::new()?;
    let store = GoldenStore::new(dir.path());
    store.save("t", trace(70.0), Some("a"), None)?;
    store.save("t", trace(71.0), Some("b"), None)?;

    store.delete("t", "a")?;
    let ids: Vec<String> = store.list("t")?.into_iter().map(|v| v.variant_id).collect();
    assert_eq!(ids, vec!["b"]);

    let err = store.delete("t", "a").unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
    Ok(())
}
