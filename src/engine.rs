//! The validation engine.
//!
//! One invocation resolves the data root from the configured scope and
//! path, picks the active rule set (file snapshot over configured rules),
//! then runs each rule in order: default the level, evaluate the guard
//! condition, dispatch to the executor, and finally aggregate severity
//! counts. Evaluation is synchronous and never blocks on I/O; the only
//! shared state across invocations is the rule-set snapshot reference.

use crate::eval::{condition, exec, path};
use crate::host::{Host, StatusFill, StatusShape, StatusSink, StatusUpdate};
use crate::report::{Level, ValidationResult, summarize};
use crate::rules::{Rule, RuleCache, file};
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the data root is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Msg,
    Flow,
    Global,
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "msg" => Ok(Scope::Msg),
            "flow" => Ok(Scope::Flow),
            "global" => Ok(Scope::Global),
            other => Err(format!("unknown scope '{other}' (expected msg|flow|global)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub scope: Scope,

    /// Dot path to the data root within the chosen scope.
    pub source_path: String,

    /// Severity given to rules that carry no `level` of their own.
    pub default_level: Level,

    /// Configured (editor-supplied) rules.
    pub rules: Vec<Rule>,

    /// When set, file-loaded rules take precedence over configured rules
    /// whenever a loaded snapshot exists.
    pub use_rules_file: bool,
    pub rules_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scope: Scope::Msg,
            source_path: "data".to_string(),
            default_level: Level::Info,
            rules: Vec::new(),
            use_rules_file: false,
            rules_path: None,
        }
    }
}

pub struct Engine {
    config: EngineConfig,
    host: Host,
    editor_rules: Arc<Vec<Rule>>,
    file_rules: RuleCache,
}

impl Engine {
    /// Build an engine with default host capabilities. If file-backed mode
    /// is on and the path looks like a rule file, an initial lenient load
    /// fills the cache; failures leave it empty and the configured rules
    /// apply.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_host(config, Host::default())
    }

    pub fn with_host(mut config: EngineConfig, host: Host) -> Self {
        let editor_rules = Arc::new(std::mem::take(&mut config.rules));
        let file_rules = RuleCache::default();

        if config.use_rules_file {
            if let Some(path) = config.rules_path.as_deref() {
                if path.to_string_lossy().ends_with(".json") {
                    file_rules.swap(file::try_load(path));
                }
            }
        }

        Self {
            config,
            host,
            editor_rules,
            file_rules,
        }
    }

    /// Shared handle to the file-rule cache, for reload plumbing.
    pub fn rule_cache(&self) -> RuleCache {
        self.file_rules.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run every applicable rule against the data root found in `msg` (or
    /// the flow/global store) and return the aggregated result.
    pub fn run(&self, msg: &Value) -> ValidationResult {
        let root = match self.resolve_root(msg) {
            Some(root) => root,
            None => return self.invalid_root(),
        };
        let data = match root.as_object() {
            Some(map) => map,
            None => return self.invalid_root(),
        };

        let rules = self.active_rules();

        let mut logs = Vec::new();
        for rule in rules.iter() {
            let rule = rule.with_default_level(self.config.default_level);

            if !condition::holds(&rule, &root, msg, &self.host) {
                continue;
            }
            logs.extend(exec::execute(&rule, data));
        }

        let counts = summarize(&logs);
        let worst = counts.worst();
        self.status(
            match worst {
                Level::Error => StatusFill::Red,
                Level::Warning => StatusFill::Yellow,
                Level::Info => StatusFill::Green,
            },
            StatusShape::Dot,
            format!("E:{} W:{} I:{}", counts.error, counts.warning, counts.info),
        );

        ValidationResult { logs, counts }
    }

    /// File rules take precedence over configured rules when file-backed
    /// mode is on and a loaded snapshot exists.
    fn active_rules(&self) -> Arc<Vec<Rule>> {
        if self.config.use_rules_file {
            if let Some(snapshot) = self.file_rules.snapshot() {
                return snapshot;
            }
        }
        self.editor_rules.clone()
    }

    /// Announce a completed rule reload on the status indicator. Called by
    /// the reload plumbing after swapping in a fresh snapshot.
    pub fn rules_reloaded(&self) {
        self.status(StatusFill::Blue, StatusShape::Dot, "rules reloaded");
    }

    /// Degenerate outcome for a data root that is not a non-array object:
    /// zero rules run, visible only through the status indicator.
    fn invalid_root(&self) -> ValidationResult {
        self.status(StatusFill::Red, StatusShape::Ring, "invalid input root");
        ValidationResult::empty()
    }

    fn resolve_root<'a>(&self, msg: &'a Value) -> Option<Cow<'a, Value>> {
        match self.config.scope {
            Scope::Msg => path::get(msg, &self.config.source_path).map(Cow::Borrowed),
            Scope::Flow => self.host.flow.get(&self.config.source_path).map(Cow::Owned),
            Scope::Global => self
                .host
                .global
                .get(&self.config.source_path)
                .map(Cow::Owned),
        }
    }

    fn status(&self, fill: StatusFill, shape: StatusShape, text: impl Into<String>) {
        self.host.status.update(&StatusUpdate::new(fill, shape, text));
    }
}

/// Attach a result to the outgoing message as its `validation` field.
/// Non-object messages are left untouched.
pub fn attach(msg: &mut Value, result: &ValidationResult) {
    if let Value::Object(fields) = msg {
        if let Ok(value) = serde_json::to_value(result) {
            fields.insert("validation".to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::JsonStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config_with_rules(rules: Value) -> EngineConfig {
        EngineConfig {
            rules: serde_json::from_value(rules).unwrap(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn invalid_root_yields_the_empty_result() {
        let engine = Engine::new(config_with_rules(json!([
            {"type": "sheetsExist", "requiredSheets": ["A"]}
        ])));

        // Missing root, array root, scalar root: all degenerate.
        for msg in [json!({}), json!({"data": []}), json!({"data": 5})] {
            let result = engine.run(&msg);
            assert_eq!(result, ValidationResult::empty());
        }
    }

    #[test]
    fn root_comes_from_the_configured_path() {
        let config = EngineConfig {
            source_path: "payload.sheets".to_string(),
            ..config_with_rules(json!([{"type": "sheetsExist", "requiredSheets": ["A"]}]))
        };
        let engine = Engine::new(config);

        let msg = json!({"payload": {"sheets": {"A": [{"x": 1}]}}});
        let result = engine.run(&msg);
        assert_eq!(result.counts.info, 1);
        assert_eq!(result.counts.error, 0);
    }

    #[test]
    fn root_can_come_from_a_variable_store() {
        let config = EngineConfig {
            scope: Scope::Global,
            source_path: "staging".to_string(),
            ..config_with_rules(json!([{"type": "sheetsExist", "requiredSheets": ["A"]}]))
        };
        let host = Host {
            global: Box::new(JsonStore(json!({"staging": {"A": [{}]}}))),
            ..Host::default()
        };
        let engine = Engine::with_host(config, host);

        let result = engine.run(&json!({}));
        assert_eq!(result.counts.total, 1);
        assert_eq!(result.counts.info, 1);
    }

    #[test]
    fn rules_run_in_order_and_default_their_level() {
        let config = EngineConfig {
            default_level: Level::Error,
            ..config_with_rules(json!([
                {"type": "sheetsExist", "requiredSheets": ["Customers", "Orders"]},
                {"type": "sheetHasColumns", "sheet": "Customers",
                 "requiredColumns": ["id", "name", "email"]}
            ]))
        };
        let engine = Engine::new(config);

        let msg = json!({"data": {"Customers": [{"id": 1, "name": "A"}]}});
        let result = engine.run(&msg);

        let levels: Vec<Level> = result.logs.iter().map(|l| l.level).collect();
        assert_eq!(
            levels,
            vec![
                Level::Info,  // Customers exists
                Level::Error, // Orders missing
                Level::Info,  // id found
                Level::Info,  // name found
                Level::Error, // email missing
            ]
        );
        assert_eq!(result.counts.info, 3);
        assert_eq!(result.counts.warning, 0);
        assert_eq!(result.counts.error, 2);
        assert_eq!(result.counts.total, 5);
    }

    #[test]
    fn failed_condition_skips_the_rule_entirely() {
        let engine = Engine::new(config_with_rules(json!([{
            "type": "sheetsExist",
            "requiredSheets": ["A"],
            "conditions": {"and": [
                {"attribute": "env", "operator": "==", "rhsType": "str", "value": "prod"}
            ]}
        }])));

        let msg = json!({"data": {"A": [{}]}});
        let result = engine.run(&msg);
        assert_eq!(result.logs.len(), 0);
        assert_eq!(result.counts.total, 0);
    }

    #[test]
    fn unknown_rule_types_are_skipped_without_error() {
        let engine = Engine::new(config_with_rules(json!([
            {"type": "somethingNew", "requiredSheets": ["A"]},
            {"type": "sheetsExist", "requiredSheets": ["A"]}
        ])));

        let msg = json!({"data": {"A": [{}]}});
        let result = engine.run(&msg);
        assert_eq!(result.logs.len(), 1);
    }

    #[test]
    fn level_defaulting_does_not_mutate_configured_rules() {
        let engine = Engine::new(EngineConfig {
            default_level: Level::Warning,
            ..config_with_rules(json!([{"type": "sheetsExist", "requiredSheets": ["Missing"]}]))
        });

        let msg = json!({"data": {"Other": [{}]}});
        let first = engine.run(&msg);
        assert_eq!(first.logs[0].level, Level::Warning);

        // A second run sees the same defaulting, not a mutated rule.
        let second = engine.run(&msg);
        assert_eq!(second, first);
    }

    #[test]
    fn file_snapshot_takes_precedence_when_enabled() {
        let config = EngineConfig {
            use_rules_file: true,
            ..config_with_rules(json!([{"type": "sheetsExist", "requiredSheets": ["A"]}]))
        };
        let engine = Engine::new(config);
        let msg = json!({"data": {"A": [{}], "B": [{}]}});

        // No snapshot loaded: configured rules apply.
        assert_eq!(engine.run(&msg).logs.len(), 1);

        // A loaded snapshot wins.
        engine.rule_cache().swap(Some(
            serde_json::from_value(json!([
                {"type": "sheetsExist", "requiredSheets": ["A", "B"]}
            ]))
            .unwrap(),
        ));
        assert_eq!(engine.run(&msg).logs.len(), 2);

        // Clearing the cache falls back again.
        engine.rule_cache().swap(None);
        assert_eq!(engine.run(&msg).logs.len(), 1);
    }

    struct CaptureStatus(std::sync::Arc<std::sync::Mutex<Vec<StatusUpdate>>>);

    impl StatusSink for CaptureStatus {
        fn update(&self, status: &StatusUpdate) {
            self.0.lock().unwrap().push(status.clone());
        }
    }

    #[test]
    fn reload_announcement_reaches_the_status_sink() {
        let updates = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let host = Host {
            status: Box::new(CaptureStatus(updates.clone())),
            ..Host::default()
        };
        let engine = Engine::with_host(EngineConfig::default(), host);

        engine.rules_reloaded();

        let seen = updates.lock().unwrap();
        assert_eq!(
            *seen,
            vec![StatusUpdate::new(StatusFill::Blue, StatusShape::Dot, "rules reloaded")]
        );
    }

    #[test]
    fn run_outcome_drives_the_status_indicator() {
        let updates = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let host = Host {
            status: Box::new(CaptureStatus(updates.clone())),
            ..Host::default()
        };
        let engine = Engine::with_host(
            config_with_rules(json!([{"type": "sheetsExist", "requiredSheets": ["A"]}])),
            host,
        );

        engine.run(&json!({"data": {"A": [{}]}}));
        engine.run(&json!({"data": []}));

        let seen = updates.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                StatusUpdate::new(StatusFill::Green, StatusShape::Dot, "E:0 W:0 I:1"),
                StatusUpdate::new(StatusFill::Red, StatusShape::Ring, "invalid input root"),
            ]
        );
    }

    #[test]
    fn attach_sets_the_validation_field() {
        let mut msg = json!({"data": {}});
        let result = ValidationResult::empty();
        attach(&mut msg, &result);
        assert_eq!(
            msg["validation"],
            json!({"logs": [], "counts": {"info": 0, "warning": 0, "error": 0, "total": 0}})
        );

        // Non-object messages are left untouched.
        let mut scalar = json!(5);
        attach(&mut scalar, &result);
        assert_eq!(scalar, json!(5));
    }
}
