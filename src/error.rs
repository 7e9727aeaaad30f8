use thiserror::Error;

use crate::model::solve::SolveStatus;

/// Errors surfaced by grid loading, model building and solving.
///
/// Lookup failures and malformed records are always reported as typed errors,
/// never as sentinel values a caller could mistake for a valid result.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("node not found: {0}")]
    NodeNotFound(String),

    #[error("no edge between {a} and {b}")]
    EdgeNotFound { a: String, b: String },

    #[error("malformed {kind} record at line {line}: {reason}")]
    MalformedRecord {
        kind: &'static str,
        line: usize,
        reason: String,
    },

    #[error("invalid plant {block}: {reason}")]
    InvalidPlant { block: String, reason: String },

    #[error("invalid edge {a}-{b}: {reason}")]
    InvalidEdge { a: String, b: String, reason: String },

    #[error("invalid node {name}: {reason}")]
    InvalidNode { name: String, reason: String },

    #[error("model error: {0}")]
    Model(String),

    #[error("solver terminated with status {0:?}")]
    Solver(SolveStatus),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
