//! Bounded, symmetric similarity measures in `[0, 1]`.
//!
//! Free text uses Sørensen–Dice over character bigrams, which is linear in
//! input length and so suits long agent outputs. Parameter values are short
//! and use normalized Levenshtein distance.

use serde_json::Value;

/// Similarity between two final outputs.
///
/// Whitespace runs are collapsed first so reflowed text compares equal.
pub fn text_similarity(a: &str, b: &str) -> f64 {
    let a = normalize_whitespace(a);
    let b = normalize_whitespace(b);
    if a == b {
        return 1.0;
    }
    clamp_unit(strsim::sorensen_dice(&a, &b))
}

/// Similarity between two parameter values of the same JSON type.
pub fn value_similarity(a: &Value, b: &Value) -> f64 {
    if a == b {
        return 1.0;
    }
    let sim = match (a, b) {
        (Value::String(x), Value::String(y)) => strsim::normalized_levenshtein(x, y),
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => numeric_similarity(x, y),
            _ => 0.0,
        },
        (Value::Bool(_), Value::Bool(_)) => 0.0,
        _ => {
            let x = canonical_json(a);
            let y = canonical_json(b);
            strsim::normalized_levenshtein(&x, &y)
        }
    };
    clamp_unit(sim)
}

fn numeric_similarity(x: f64, y: f64) -> f64 {
    let scale = x.abs().max(y.abs());
    if scale == 0.0 {
        return 1.0;
    }
    1.0 - ((x - y).abs() / scale).min(1.0)
}

/// JSON type label used in type-mismatch diagnostics.
pub fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn canonical_json(v: &Value) -> String {
    // serde_json maps iterate in key order, so this is stable.
    serde_json::to_string(v).unwrap_or_default()
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}
