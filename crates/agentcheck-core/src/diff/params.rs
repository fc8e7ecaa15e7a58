use crate::similarity::{json_type_name, value_similarity};
use serde_json::Value;
use std::collections::BTreeMap;

use super::model::{FieldDiff, FieldDiffKind};

/// Per-key comparison of two parameter maps, in key order.
pub(crate) fn diff_parameters(
    golden: &BTreeMap<String, Value>,
    actual: &BTreeMap<String, Value>,
) -> Vec<FieldDiff> {
    let mut keys: Vec<&String> = golden.keys().chain(actual.keys()).collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .filter_map(|key| diff_field(key, golden.get(key), actual.get(key)))
        .collect()
}

fn diff_field(key: &str, golden: Option<&Value>, actual: Option<&Value>) -> Option<FieldDiff> {
    let (kind, similarity) = match (golden, actual) {
        (Some(g), Some(a)) if g == a => return None,
        (Some(g), Some(a)) if json_type_name(g) != json_type_name(a) => {
            (FieldDiffKind::TypeChanged, 0.0)
        }
        (Some(g), Some(a)) => (FieldDiffKind::Changed, value_similarity(g, a)),
        (Some(_), None) => (FieldDiffKind::Removed, 0.0),
        (None, Some(_)) => (FieldDiffKind::Added, 0.0),
        (None, None) => return None,
    };

    Some(FieldDiff {
        key: key.to_string(),
        golden_value: golden.cloned(),
        actual_value: actual.cloned(),
        similarity,
        kind,
    })
}
