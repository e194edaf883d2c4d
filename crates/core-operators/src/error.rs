//! Operator errors and outcomes.

use thiserror::Error;

/// Configuration failures raised before any buffer work happens.
#[derive(Debug, Error)]
pub enum OperatorError {
    #[error("{operator}: cannot set target {target}")]
    CannotSetTarget { operator: String, target: String },
    #[error("unknown operator: {0}")]
    UnknownOperator(String),
    #[error("unknown target: {0}")]
    UnknownTarget(String),
    /// The operator only hands off to another one and has no body of its own.
    #[error("{0} cannot be executed directly")]
    NotExecutable(&'static str),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// How an operator invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The buffer (or registers/marks) changed.
    Finished,
    /// Nothing was selected or matched; no transaction was opened.
    NoOp,
    /// An auto-detected pair was not found before prompting.
    Aborted,
    /// Input prompt cancelled or external command failed to spawn.
    Cancelled,
    /// Insert mode is active; `Session::leave_insert_mode` completes the operator.
    InsertPending,
    /// Control was handed to another operator (select list).
    Delegated,
}

impl Outcome {
    pub fn changed(self) -> bool {
        matches!(self, Outcome::Finished | Outcome::InsertPending)
    }
}
