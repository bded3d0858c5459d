//! Rule-based validator for sheet-shaped JSON data.
//!
//! A data root maps sheet names to sheets; a sheet is an array of row
//! objects or a single row object. Declarative rules check that required
//! sheets exist (`sheetsExist`) and that required columns are present on a
//! sample row (`sheetHasColumns`). Each rule may carry one guard condition.
//! The engine returns every finding as a `LogEntry` plus severity counts.
//!
//! Layering, leaves first:
//! - `eval`: dot-path access, value coercion, operators, RHS resolution,
//!   condition gating, and the two rule executors
//! - `report`: log entries, severity counts, aggregation
//! - `rules`: the serde rule model, file persistence, hot reload
//! - `engine`: the orchestrator plus host capability traits

pub mod engine;
pub mod eval;
pub mod host;
pub mod report;
pub mod rules;

pub type Result<T> = anyhow::Result<T>;
