//! The condition operator set.
//!
//! Operators compare the coerced string forms of both operands. Two error
//! policies coexist on purpose: an invalid regex pattern fails closed
//! (`false`), while an unknown operator symbol fails open (`true`) so that
//! rules written for a newer operator set never block here.

use crate::eval::coerce::to_comparable;
use regex::Regex;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Contains,
    NotContains,
    Regex,
    IsEmpty,
    NotEmpty,
    /// Unrecognized operator symbol, preserved for round-tripping.
    Unknown(String),
}

impl Default for Op {
    fn default() -> Self {
        Op::Eq
    }
}

impl Op {
    pub fn parse(s: &str) -> Op {
        match s {
            "==" => Op::Eq,
            "!=" => Op::Ne,
            "contains" => Op::Contains,
            "!contains" => Op::NotContains,
            "regex" => Op::Regex,
            "isEmpty" => Op::IsEmpty,
            "!isEmpty" => Op::NotEmpty,
            other => Op::Unknown(other.to_string()),
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Contains => "contains",
            Op::NotContains => "!contains",
            Op::Regex => "regex",
            Op::IsEmpty => "isEmpty",
            Op::NotEmpty => "!isEmpty",
            Op::Unknown(s) => s,
        }
    }
}

impl<'de> Deserialize<'de> for Op {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Op::parse(&s))
    }
}

impl Serialize for Op {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

/// Apply `op` to the coerced forms of `actual` and `rhs`.
pub fn apply(actual: Option<&Value>, op: &Op, rhs: Option<&Value>) -> bool {
    let a = to_comparable(actual);
    let b = to_comparable(rhs);

    match op {
        Op::Eq => a == b,
        Op::Ne => a != b,
        Op::Contains => a.contains(&b),
        Op::NotContains => !a.contains(&b),
        Op::Regex => match Regex::new(&b) {
            Ok(re) => re.is_match(&a),
            Err(_) => false,
        },
        Op::IsEmpty => a.trim().is_empty(),
        Op::NotEmpty => !a.trim().is_empty(),
        // Unknown operators never block a rule.
        Op::Unknown(_) => true,
    }
}
