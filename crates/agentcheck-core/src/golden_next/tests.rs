use std::fs;

use tempfile::TempDir;

use crate::errors::CoreError;
use crate::model::ExecutionTrace;

use super::super::{GoldenStore, DEFAULT_VARIANT_ID};

fn store() -> (TempDir, GoldenStore) {
    let dir = TempDir::new().unwrap();
    let store = GoldenStore::new(dir.path().join("golden"));
    (dir, store)
}

fn trace(score: f64) -> ExecutionTrace {
    ExecutionTrace::from_tools(["search", "analyze"], "answer", score)
}

#[test]
fn save_without_id_uses_default_variant() {
    let (_dir, store) = store();
    let saved = store.save("checkout", trace(90.0), None, None).unwrap();
    assert_eq!(saved.variant_id, DEFAULT_VARIANT_ID);
    assert!(saved.digest.starts_with("sha256:"));

    let baseline = store.load("checkout").unwrap();
    assert_eq!(baseline.default_variant.as_deref(), Some(DEFAULT_VARIANT_ID));
    assert_eq!(baseline.default_variant().unwrap().trace, trace(90.0));
}

#[test]
fn list_preserves_creation_order() {
    let (_dir, store) = store();
    for id in ["a", "b", "c"] {
        store.save("t", trace(80.0), Some(id), None).unwrap();
    }
    let ids: Vec<String> = store
        .list("t")
        .unwrap()
        .into_iter()
        .map(|v| v.variant_id)
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn list_of_unknown_test_is_empty() {
    let (_dir, store) = store();
    assert!(store.list("missing").unwrap().is_empty());
}

#[test]
fn overwrite_moves_variant_to_end() {
    let (_dir, store) = store();
    store.save("t", trace(80.0), Some("a"), None).unwrap();
    store.save("t", trace(81.0), Some("b"), None).unwrap();
    store
        .save("t", trace(95.0), Some("a"), Some("re-recorded".into()))
        .unwrap();

    let variants = store.list("t").unwrap();
    assert_eq!(variants.len(), 2);
    assert_eq!(variants[1].variant_id, "a");
    assert_eq!(variants[1].trace.score, 95.0);
    assert_eq!(variants[1].notes.as_deref(), Some("re-recorded"));
}

#[test]
fn sixth_variant_is_rejected_and_nothing_is_evicted() {
    let (_dir, store) = store();
    for i in 0..5 {
        store
            .save("t", trace(80.0), Some(format!("v{}", i).as_str()), None)
            .unwrap();
    }

    let err = store.save("t", trace(80.0), Some("v5"), None).unwrap_err();
    assert!(matches!(err, CoreError::MaxVariantsExceeded { max: 5, .. }));
    assert_eq!(err.code(), "MAX_VARIANTS_EXCEEDED");
    assert_eq!(store.list("t").unwrap().len(), 5);

    // Overwriting an existing id is still fine at the cap.
    store.save("t", trace(99.0), Some("v2"), None).unwrap();
    store.delete("t", "v0").unwrap();
    store.save("t", trace(80.0), Some("v5"), None).unwrap();
    assert_eq!(store.list("t").unwrap().len(), 5);
}

#[test]
fn get_and_delete_report_not_found() {
    let (_dir, store) = store();
    assert!(matches!(
        store.get("t", "x").unwrap_err(),
        CoreError::NotFound { .. }
    ));
    assert!(matches!(
        store.delete("t", "x").unwrap_err(),
        CoreError::NotFound { .. }
    ));

    store.save("t", trace(80.0), Some("a"), None).unwrap();
    assert_eq!(store.get("t", "a").unwrap().variant_id, "a");
    assert!(matches!(
        store.delete("t", "b").unwrap_err(),
        CoreError::NotFound { .. }
    ));
}

#[test]
fn deleting_default_promotes_oldest_remaining() {
    let (_dir, store) = store();
    store.save("t", trace(80.0), Some("a"), None).unwrap();
    store.save("t", trace(81.0), Some("b"), None).unwrap();
    store.save("t", trace(82.0), Some("c"), None).unwrap();

    store.delete("t", "a").unwrap();
    let baseline = store.load("t").unwrap();
    assert_eq!(baseline.default_variant.as_deref(), Some("b"));

    store.set_default("t", "c").unwrap();
    assert_eq!(
        store.load("t").unwrap().default_variant.as_deref(),
        Some("c")
    );
    assert!(store.set_default("t", "zzz").is_err());
}

#[test]
fn deleting_last_variant_removes_baseline() {
    let (_dir, store) = store();
    store.save("t", trace(80.0), None, None).unwrap();
    store.delete("t", DEFAULT_VARIANT_ID).unwrap();

    assert!(matches!(
        store.load("t").unwrap_err(),
        CoreError::NoBaseline { .. }
    ));
    assert!(store.tests().unwrap().is_empty());
}

#[test]
fn tests_lists_stored_baselines() {
    let (_dir, store) = store();
    assert!(store.tests().unwrap().is_empty());
    store.save("b_test", trace(80.0), None, None).unwrap();
    store.save("a_test", trace(80.0), None, None).unwrap();
    assert_eq!(store.tests().unwrap(), vec!["a_test", "b_test"]);
}

#[test]
fn writes_leave_no_temp_files() {
    let (_dir, store) = store();
    store.save("t", trace(80.0), Some("a"), None).unwrap();
    store.save("t", trace(81.0), Some("b"), None).unwrap();
    store.delete("t", "a").unwrap();

    let files: Vec<String> = fs::read_dir(store.root())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(files, vec!["t.golden.json"]);
}

#[test]
fn tampered_trace_is_detected() {
    let (_dir, store) = store();
    store.save("t", trace(80.0), None, None).unwrap();

    let path = store.root().join("t.golden.json");
    let mut doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    doc["variants"][0]["trace"]["score"] = serde_json::json!(100.0);
    fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();

    let err = store.load("t").unwrap_err();
    assert!(matches!(err, CoreError::CorruptBaseline { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn unsafe_names_are_rejected() {
    let (_dir, store) = store();
    for bad in ["", "../escape", "a/b", "a\\b", ".hidden"] {
        let err = store.save(bad, trace(80.0), None, None).unwrap_err();
        assert!(
            matches!(err, CoreError::InvalidName { .. }),
            "expected InvalidName for {:?}",
            bad
        );
    }
    let err = store
        .save("ok", trace(80.0), Some("../v"), None)
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidName { .. }));
}

#[test]
fn non_round_floats_survive_a_reload() {
    let (_dir, store) = store();
    // Deterministic LCG so failures reproduce.
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    for i in 0..200 {
        let name = format!("t{}", i);
        let trace = ExecutionTrace::from_tools(["search"], "answer", next() * 100.0)
            .with_cost(next() * 0.37)
            .with_latency_ms(next() * 12_345.678);
        store.save(&name, trace.clone(), None, None).unwrap();

        let loaded = store.load(&name).unwrap();
        assert_eq!(loaded.variants[0].trace, trace, "round trip of {}", name);
    }
}

#[test]
fn non_finite_numbers_are_rejected_before_writing() {
    let (_dir, store) = store();
    store.save("t", trace(90.0), Some("good"), None).unwrap();

    let bad_traces = [
        trace(f64::NAN),
        trace(90.0).with_cost(f64::INFINITY),
        trace(90.0).with_latency_ms(f64::NEG_INFINITY),
    ];
    for bad in bad_traces {
        let err = store.save("t", bad, Some("bad"), None).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTrace { .. }));
        assert_eq!(err.code(), "INVALID_TRACE");
    }

    let baseline = store.load("t").unwrap();
    assert_eq!(baseline.variant_ids(), vec!["good"]);
}
