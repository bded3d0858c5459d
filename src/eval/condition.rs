//! Rule guard conditions.
//!
//! A rule carries at most one honored condition: the first entry of
//! `conditions.and`. Entries beyond the first are ignored, matching the
//! original engine; this is a documented limitation, not a boolean AND.

use crate::eval::{op, path, rhs};
use crate::host::Host;
use crate::rules::Rule;
use serde_json::Value;

/// True iff the rule's guard condition is satisfied for this input, or the
/// rule has no condition at all (vacuous pass). A `false` result makes the
/// engine skip the rule entirely.
pub fn holds(rule: &Rule, root: &Value, msg: &Value, host: &Host) -> bool {
    let cond = match rule.conditions.as_ref().and_then(|c| c.and.first()) {
        Some(cond) => cond,
        None => return true,
    };

    let actual = path::get(root, &cond.attribute);
    let rhs = rhs::resolve(host, msg, cond.rhs_type, &cond.value);
    op::apply(actual, &cond.operator, rhs.as_ref())
}
