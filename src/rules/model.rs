//! Rule model as it appears in rule files and editor configuration.
//!
//! JSON shape:
//! {
//!   "id": "r1",
//!   "type": "sheetsExist",          // or "sheetHasColumns"
//!   "description": "...",            // optional, copied into log entries
//!   "level": "error",               // optional failure severity
//!   "requiredSheets": ["Customers"], // sheetsExist
//!   "sheet": "Customers",           // sheetHasColumns
//!   "requiredColumns": ["id"],       // sheetHasColumns, dot paths allowed
//!   "conditions": { "and": [ { "attribute": "meta.kind",
//!                              "operator": "==",
//!                              "rhsType": "str",
//!                              "value": "import" } ] }
//! }
//!
//! A rule file is either a bare array of rules or `{ "rules": [...] }`.
//! Unknown `type` tags deserialize to `RuleCheck::Unknown` and execute as a
//! no-op, so rule files written for a newer checker still load.

use crate::eval::op::Op;
use crate::eval::rhs::RhsKind;
use crate::report::Level;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Failure severity. Absent means "use the engine's default level".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    #[serde(flatten)]
    pub check: RuleCheck,
}

/// The check a rule performs, dispatched on the `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuleCheck {
    #[serde(rename = "sheetsExist")]
    SheetsExist {
        #[serde(default, rename = "requiredSheets")]
        required_sheets: Vec<String>,
    },

    #[serde(rename = "sheetHasColumns")]
    SheetHasColumns {
        #[serde(default)]
        sheet: String,

        #[serde(default, rename = "requiredColumns")]
        required_columns: Vec<String>,
    },

    /// Any tag this build does not know. Executes as a no-op.
    #[serde(other, rename = "unknown")]
    Unknown,
}

impl RuleCheck {
    /// The wire tag, used in log entries.
    pub fn tag(&self) -> &'static str {
        match self {
            RuleCheck::SheetsExist { .. } => "sheetsExist",
            RuleCheck::SheetHasColumns { .. } => "sheetHasColumns",
            RuleCheck::Unknown => "unknown",
        }
    }
}

/// Guard conditions. Only the first entry of `and` is honored; additional
/// entries are ignored. Preserved behavior of the original engine, not a
/// full boolean AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default)]
    pub and: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dot path into the data root.
    #[serde(default)]
    pub attribute: String,

    #[serde(default)]
    pub operator: Op,

    #[serde(default, rename = "rhsType")]
    pub rhs_type: RhsKind,

    #[serde(default)]
    pub value: Value,
}

impl Rule {
    /// A copy of this rule with `level` defaulted. The shared rule object
    /// itself is never mutated, so concurrent runs over the same rule list
    /// cannot observe each other.
    pub fn with_default_level(&self, default: Level) -> Rule {
        let mut rule = self.clone();
        rule.level.get_or_insert(default);
        rule
    }

    /// Failure severity for this rule's log entries.
    pub fn failure_level(&self) -> Level {
        self.level.unwrap_or(Level::Error)
    }
}

/// A rule document: either a bare array or an object with a `rules` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleDoc {
    List(Vec<Rule>),
    // `rules` is required here: an object without it is not a rule document.
    Wrapped { rules: Vec<Rule> },
}

impl RuleDoc {
    pub fn into_rules(self) -> Vec<Rule> {
        match self {
            RuleDoc::List(rules) => rules,
            RuleDoc::Wrapped { rules } => rules,
        }
    }
}
