//! Dot-notation property access over nested JSON objects.
//!
//! Paths address object properties only: `a.b.c` walks three map keys.
//! There is no array indexing; walking into an array (or any non-object)
//! ends the lookup.

use serde_json::Value;

/// Resolve `dot_path` against `root`, one key at a time.
///
/// Returns `None` when the path is empty, a key is absent, or the current
/// node is not an object. An explicit JSON `null` at the final key is a
/// present value and resolves to `Some(&Value::Null)`.
pub fn get<'a>(root: &'a Value, dot_path: &str) -> Option<&'a Value> {
    if dot_path.is_empty() {
        return None;
    }
    let mut cur = root;
    for key in dot_path.split('.') {
        cur = cur.as_object()?.get(key)?;
    }
    Some(cur)
}

/// True iff `get` resolves to a value (including an explicit `null`).
pub fn has(root: &Value, dot_path: &str) -> bool {
    get(root, dot_path).is_some()
}
