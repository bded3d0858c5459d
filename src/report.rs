//! Findings and severity aggregation.
//!
//! Rule executors emit `LogEntry` values; `summarize` folds them into a
//! severity histogram. Levels outside the known set count as `info`: the
//! engine is optimistic about levels it does not recognize, and that policy
//! is applied once, at deserialization.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    #[default]
    Info,
    Warning,
    Error,
}

impl Level {
    /// Case-insensitive parse; anything unrecognized folds to `Info`.
    pub fn parse(s: &str) -> Level {
        match s.to_ascii_lowercase().as_str() {
            "error" => Level::Error,
            "warning" => Level::Warning,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    // Strict parse for command-line use; rule files go through serde and
    // stay lenient.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(Level::Info),
            "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            other => Err(format!("unknown level '{other}' (expected info|warning|error)")),
        }
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Level::parse(&s))
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One finding produced by a rule. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,

    /// The rule's `type` tag.
    #[serde(rename = "type")]
    pub kind: String,

    pub level: Level,
    pub message: String,
    pub description: String,
}

/// Severity histogram over a log sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub total: usize,
}

impl Counts {
    /// Worst severity present: error > warning > info.
    pub fn worst(&self) -> Level {
        if self.error > 0 {
            Level::Error
        } else if self.warning > 0 {
            Level::Warning
        } else {
            Level::Info
        }
    }
}

/// Count logs by severity. Every entry is counted exactly once and
/// `total` is the sum of the three buckets.
pub fn summarize(logs: &[LogEntry]) -> Counts {
    let mut out = Counts::default();
    for log in logs {
        match log.level {
            Level::Error => out.error += 1,
            Level::Warning => out.warning += 1,
            Level::Info => out.info += 1,
        }
    }
    out.total = out.info + out.warning + out.error;
    out
}

/// The engine's output, attached to the outgoing message as `validation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub logs: Vec<LogEntry>,
    pub counts: Counts,
}

impl ValidationResult {
    /// The degenerate result for an invalid data root: no logs, all-zero
    /// counts. A defined outcome, not an error.
    pub fn empty() -> Self {
        Self {
            logs: Vec::new(),
            counts: Counts::default(),
        }
    }
}
