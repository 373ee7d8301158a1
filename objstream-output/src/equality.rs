//! Structural equality for partial snapshots.
//!
//! The partial-object stream must suppress consecutive snapshots that carry
//! no new information, so equality here is structural: arrays element-wise,
//! objects as unordered key–value sets, and numbers by numeric value so
//! `1` and `1.0` compare equal even if the repair pass changes how a number
//! is re-parsed between chunks.

use serde_json::{Number, Value};

/// Structural deep equality over JSON values.
#[must_use]
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(v, w)| deep_equal(v, w))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| deep_equal(v, w)))
        }
        _ => false,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if x == y {
        return true;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert!(deep_equal(&json!(null), &json!(null)));
        assert!(deep_equal(&json!("a"), &json!("a")));
        assert!(!deep_equal(&json!("a"), &json!("b")));
        assert!(!deep_equal(&json!(null), &json!(0)));
    }

    #[test]
    fn test_numbers_across_representations() {
        assert!(deep_equal(&json!(1), &json!(1.0)));
        assert!(deep_equal(&json!(-2.5), &json!(-2.5)));
        assert!(!deep_equal(&json!(1), &json!(2)));
    }

    #[test]
    fn test_arrays() {
        assert!(deep_equal(&json!([1, "a"]), &json!([1, "a"])));
        assert!(!deep_equal(&json!([1, "a"]), &json!([1])));
        assert!(!deep_equal(&json!([1, 2]), &json!([2, 1])));
    }

    #[test]
    fn test_objects_ignore_key_order() {
        let a = serde_json::from_str::<Value>(r#"{"x": 1, "y": 2}"#).unwrap();
        let b = serde_json::from_str::<Value>(r#"{"y": 2, "x": 1}"#).unwrap();
        assert!(deep_equal(&a, &b));
    }

    #[test]
    fn test_nested() {
        let a = json!({"user": {"name": "Ada", "tags": [1, 2]}});
        let b = json!({"user": {"name": "Ada", "tags": [1, 2]}});
        let c = json!({"user": {"name": "Ada", "tags": [1]}});
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
    }
}
