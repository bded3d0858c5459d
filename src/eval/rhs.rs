//! Typed right-hand-side resolution.
//!
//! A condition's `value` literal is interpreted according to its `rhsType`:
//! a plain literal (`str`, `num`, `bool`), an environment variable (`env`),
//! a dot-path into the input message or a host variable scope (`msg`,
//! `flow`, `global`), or a dynamic expression (`jsonata`). Unrecognized
//! kinds behave as `str`. `None` plays the role of "undefined": a lookup
//! or expression that produced nothing.

use crate::eval::coerce::{is_truthy, to_comparable};
use crate::eval::path;
use crate::host::Host;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RhsKind {
    #[default]
    Str,
    Num,
    Bool,
    Env,
    Msg,
    Flow,
    Global,
    #[serde(rename = "jsonata")]
    Expr,
}

impl RhsKind {
    pub fn parse(s: &str) -> RhsKind {
        match s {
            "num" => RhsKind::Num,
            "bool" => RhsKind::Bool,
            "env" => RhsKind::Env,
            "msg" => RhsKind::Msg,
            "flow" => RhsKind::Flow,
            "global" => RhsKind::Global,
            "jsonata" => RhsKind::Expr,
            // "str" and anything unrecognized.
            _ => RhsKind::Str,
        }
    }
}

impl<'de> Deserialize<'de> for RhsKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(RhsKind::parse(&s))
    }
}

/// Resolve `literal` as `kind` against the current input message and the
/// host's capabilities.
pub fn resolve(host: &Host, msg: &Value, kind: RhsKind, literal: &Value) -> Option<Value> {
    match kind {
        RhsKind::Num => Some(parse_number(literal)),
        RhsKind::Bool => Some(Value::Bool(is_truthy(literal))),
        RhsKind::Env => {
            let name = to_comparable(Some(literal));
            Some(Value::String(host.env.get(&name).unwrap_or_default()))
        }
        RhsKind::Msg => path::get(msg, &to_comparable(Some(literal))).cloned(),
        RhsKind::Flow => host.flow.get(&to_comparable(Some(literal))),
        RhsKind::Global => host.global.get(&to_comparable(Some(literal))),
        RhsKind::Expr => host.expr.evaluate(&to_comparable(Some(literal)), msg),
        RhsKind::Str => Some(literal.clone()),
    }
}

/// Numeric parse of a literal. A literal that is already a number is kept
/// as-is; a string is trimmed and parsed as a JSON number. Anything else,
/// or a failed parse, yields the string "NaN", which then takes part in
/// string comparison like any other coerced value.
fn parse_number(literal: &Value) -> Value {
    match literal {
        Value::Number(n) => Value::Number(n.clone()),
        Value::String(s) => match s.trim().parse::<Number>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String("NaN".to_string()),
        },
        _ => Value::String("NaN".to_string()),
    }
}
