//! Evaluation core: path access, coercion, operators, RHS resolution,
//! condition gating, and the rule executors.
//!
//! Everything in here is pure and synchronous; the only outward calls are
//! through the host capability traits handed in by the engine.

pub mod coerce;
pub mod condition;
pub mod exec;
pub mod op;
pub mod path;
pub mod rhs;

pub use condition::holds;
pub use exec::execute;
pub use op::Op;
pub use rhs::RhsKind;
