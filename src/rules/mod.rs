//! Rule layer: serde model, file persistence, hot reload.

pub mod file;
pub mod model;
pub mod watch;

pub use model::{Condition, Conditions, Rule, RuleCheck};
pub use watch::{RuleCache, RuleWatcher};
