//! Host capability interfaces.
//!
//! The engine never talks to a concrete runtime: variable scopes, the
//! process environment, the dynamic expression language, and the status
//! indicator are all injected behind these traits. Defaults are inert
//! (empty stores, no expression language, log-backed status), so the
//! engine works standalone.

use crate::eval::path;
use serde_json::Value;

/// A dot-path keyed variable store (the flow and global scopes).
pub trait ScopedStore: Send + Sync {
    fn get(&self, dot_path: &str) -> Option<Value>;
}

/// A store with no entries.
pub struct EmptyStore;

impl ScopedStore for EmptyStore {
    fn get(&self, _dot_path: &str) -> Option<Value> {
        None
    }
}

/// A store backed by a JSON object, resolved with the same dot-path
/// mechanism conditions use.
pub struct JsonStore(pub Value);

impl ScopedStore for JsonStore {
    fn get(&self, dot_path: &str) -> Option<Value> {
        path::get(&self.0, dot_path).cloned()
    }
}

/// Access to environment variables.
pub trait EnvAccess: Send + Sync {
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
pub struct ProcessEnv;

impl EnvAccess for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Dynamic expression evaluation against the current input message.
/// Any compile or evaluation failure must yield `None`, never an error.
pub trait ExprEvaluator: Send + Sync {
    fn evaluate(&self, expr: &str, input: &Value) -> Option<Value>;
}

/// No expression language available; every expression yields `None`.
pub struct NoExpr;

impl ExprEvaluator for NoExpr {
    fn evaluate(&self, _expr: &str, _input: &Value) -> Option<Value> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFill {
    Green,
    Yellow,
    Red,
    Blue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusShape {
    Dot,
    Ring,
}

/// A coarse indicator update: short label plus color/shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub fill: StatusFill,
    pub shape: StatusShape,
    pub text: String,
}

impl StatusUpdate {
    pub fn new(fill: StatusFill, shape: StatusShape, text: impl Into<String>) -> Self {
        Self {
            fill,
            shape,
            text: text.into(),
        }
    }
}

/// Best-effort, fire-and-forget status indicator. Updates never affect
/// evaluation results.
pub trait StatusSink: Send + Sync {
    fn update(&self, status: &StatusUpdate);
}

/// Reports status changes through the `log` facade.
pub struct LogStatus;

impl StatusSink for LogStatus {
    fn update(&self, status: &StatusUpdate) {
        log::info!(
            "status [{:?} {:?}] {}",
            status.fill,
            status.shape,
            status.text
        );
    }
}

/// The bundle of capabilities handed to the engine at construction.
pub struct Host {
    pub flow: Box<dyn ScopedStore>,
    pub global: Box<dyn ScopedStore>,
    pub env: Box<dyn EnvAccess>,
    pub expr: Box<dyn ExprEvaluator>,
    pub status: Box<dyn StatusSink>,
}

impl Default for Host {
    fn default() -> Self {
        Self {
            flow: Box::new(EmptyStore),
            global: Box::new(EmptyStore),
            env: Box::new(ProcessEnv),
            expr: Box::new(NoExpr),
            status: Box::new(LogStatus),
        }
    }
}
