//! Rule executors.
//!
//! Each executor consumes one rule plus the data root and produces zero or
//! more log entries, in the order the rule lists its requirements. The
//! executors are pure: they never touch the rule, the data, or anything
//! outside their return value.

use crate::eval::path;
use crate::report::{Level, LogEntry};
use crate::rules::{Rule, RuleCheck};
use serde_json::{Map, Value};

/// Dispatch a rule to its executor. Unknown rule types produce no logs and
/// are not an error.
pub fn execute(rule: &Rule, data: &Map<String, Value>) -> Vec<LogEntry> {
    match &rule.check {
        RuleCheck::SheetsExist { required_sheets } => sheets_exist(rule, required_sheets, data),
        RuleCheck::SheetHasColumns {
            sheet,
            required_columns,
        } => sheet_has_columns(rule, sheet, required_columns, data),
        RuleCheck::Unknown => Vec::new(),
    }
}

/// One log per required sheet, in order. A sheet exists iff it is defined
/// and is a non-empty array or a non-array object with at least one key.
fn sheets_exist(rule: &Rule, required: &[String], data: &Map<String, Value>) -> Vec<LogEntry> {
    let mut logs = Vec::with_capacity(required.len());
    for name in required {
        let exists = match data.get(name) {
            Some(Value::Array(rows)) => !rows.is_empty(),
            Some(Value::Object(row)) => !row.is_empty(),
            _ => false,
        };
        logs.push(if exists {
            log_for(rule, Level::Info, format!("Sheet '{name}' exists and is not empty."))
        } else {
            log_for(
                rule,
                rule.failure_level(),
                format!("Sheet '{name}' is missing or empty."),
            )
        });
    }
    logs
}

/// Column presence is checked against a representative sample row: the
/// first element of an array sheet, or the sheet itself when it is a
/// single row object. Column names are dot paths into the sample.
fn sheet_has_columns(
    rule: &Rule,
    sheet_name: &str,
    columns: &[String],
    data: &Map<String, Value>,
) -> Vec<LogEntry> {
    let sheet = match data.get(sheet_name) {
        Some(sheet) => sheet,
        None => {
            return vec![log_for(
                rule,
                rule.failure_level(),
                format!("Sheet '{sheet_name}' not found."),
            )];
        }
    };

    let sample = match sheet {
        Value::Array(rows) => rows.first(),
        other => Some(other),
    };
    let sample = match sample {
        Some(row @ Value::Object(_)) => row,
        _ => {
            return vec![log_for(
                rule,
                rule.failure_level(),
                format!("Sheet '{sheet_name}' has no object rows to inspect."),
            )];
        }
    };

    let mut logs = Vec::with_capacity(columns.len());
    for col in columns {
        logs.push(if path::has(sample, col) {
            log_for(rule, Level::Info, format!("Column '{col}' found in '{sheet_name}'."))
        } else {
            log_for(
                rule,
                rule.failure_level(),
                format!("Missing column '{col}' in '{sheet_name}'."),
            )
        });
    }
    logs
}

fn log_for(rule: &Rule, level: Level, message: String) -> LogEntry {
    LogEntry {
        id: rule.id.clone().unwrap_or_default(),
        kind: rule.check.tag().to_string(),
        level,
        message,
        description: rule.description.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    fn rule(v: Value) -> Rule {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn sheets_exist_logs_follow_required_order() {
        let r = rule(json!({
            "id": "r1",
            "type": "sheetsExist",
            "requiredSheets": ["A", "B", "C"]
        }));
        let d = data(json!({"A": [{}], "B": []}));

        let logs = execute(&r, &d);
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].level, Level::Info);
        assert_eq!(logs[0].message, "Sheet 'A' exists and is not empty.");
        // B is an empty array, C is absent: both fail.
        assert_eq!(logs[1].level, Level::Error);
        assert_eq!(logs[1].message, "Sheet 'B' is missing or empty.");
        assert_eq!(logs[2].level, Level::Error);
        assert_eq!(logs[2].message, "Sheet 'C' is missing or empty.");
        assert!(logs.iter().all(|l| l.id == "r1" && l.kind == "sheetsExist"));
    }

    #[test]
    fn sheets_exist_failure_uses_the_rule_level() {
        let r = rule(json!({
            "type": "sheetsExist",
            "requiredSheets": ["Missing"],
            "level": "warning"
        }));
        let logs = execute(&r, &data(json!({})));
        assert_eq!(logs[0].level, Level::Warning);
    }

    #[test]
    fn single_row_object_counts_as_existing_sheet() {
        let r = rule(json!({"type": "sheetsExist", "requiredSheets": ["S", "Empty"]}));
        let d = data(json!({"S": {"k": 1}, "Empty": {}}));
        let logs = execute(&r, &d);
        assert_eq!(logs[0].level, Level::Info);
        assert_eq!(logs[1].level, Level::Error);
    }

    #[test]
    fn scalar_sheet_is_not_an_existing_sheet() {
        let r = rule(json!({"type": "sheetsExist", "requiredSheets": ["S"]}));
        let logs = execute(&r, &data(json!({"S": "text"})));
        assert_eq!(logs[0].level, Level::Error);
    }

    #[test]
    fn columns_checked_in_order_against_first_row() {
        let r = rule(json!({
            "type": "sheetHasColumns",
            "sheet": "Sheet1",
            "requiredColumns": ["x", "y", "z"]
        }));
        let d = data(json!({"Sheet1": [{"x": 1, "y": 2}]}));

        let logs = execute(&r, &d);
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].level, Level::Info);
        assert_eq!(logs[0].message, "Column 'x' found in 'Sheet1'.");
        assert_eq!(logs[1].level, Level::Info);
        assert_eq!(logs[2].level, Level::Error);
        assert_eq!(logs[2].message, "Missing column 'z' in 'Sheet1'.");
    }

    #[test]
    fn missing_sheet_yields_exactly_one_log() {
        let r = rule(json!({
            "type": "sheetHasColumns",
            "sheet": "Nope",
            "requiredColumns": ["x", "y"]
        }));
        let logs = execute(&r, &data(json!({"Other": [{}]})));
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, Level::Error);
        assert_eq!(logs[0].message, "Sheet 'Nope' not found.");
    }

    #[test]
    fn non_object_rows_yield_exactly_one_log() {
        let r = rule(json!({
            "type": "sheetHasColumns",
            "sheet": "S",
            "requiredColumns": ["x"]
        }));
        // First row is a scalar.
        let logs = execute(&r, &data(json!({"S": [1, 2]})));
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].message, "Sheet 'S' has no object rows to inspect.");

        // Empty array has no sample row at all.
        let logs = execute(&r, &data(json!({"S": []})));
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].level, Level::Error);
    }

    #[test]
    fn single_object_sheet_is_its_own_sample() {
        let r = rule(json!({
            "type": "sheetHasColumns",
            "sheet": "Config",
            "requiredColumns": ["host", "port"]
        }));
        let d = data(json!({"Config": {"host": "localhost"}}));
        let logs = execute(&r, &d);
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].level, Level::Info);
        assert_eq!(logs[1].level, Level::Error);
    }

    #[test]
    fn dotted_columns_address_nested_sub_objects() {
        let r = rule(json!({
            "type": "sheetHasColumns",
            "sheet": "S",
            "requiredColumns": ["contact.email", "contact.phone"]
        }));
        let d = data(json!({"S": [{"contact": {"email": "a@b"}}]}));
        let logs = execute(&r, &d);
        assert_eq!(logs[0].level, Level::Info);
        assert_eq!(logs[1].level, Level::Error);
    }

    #[test]
    fn unknown_rule_type_produces_no_logs() {
        let r = rule(json!({"type": "futureCheck", "level": "error"}));
        assert_eq!(execute(&r, &data(json!({"S": [{}]}))), vec![]);
    }

    #[test]
    fn description_is_copied_into_entries() {
        let r = rule(json!({
            "type": "sheetsExist",
            "requiredSheets": ["A"],
            "description": "input shape check"
        }));
        let logs = execute(&r, &data(json!({"A": [{}]})));
        assert_eq!(logs[0].description, "input shape check");
    }
}
