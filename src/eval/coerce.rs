//! Canonical string form for operator comparisons.
//!
//! Every comparison in the operator set is string-based: both operands are
//! coerced first, so numbers, booleans, and whole objects compare via their
//! JSON text form.

use serde_json::Value;

/// Coerce a possibly-missing value to its comparable string form.
///
/// Missing and `null` become the empty string; strings pass through
/// unchanged; everything else renders as compact JSON.
pub fn to_comparable(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// JS-style truthiness, used by the `bool` RHS kind.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
