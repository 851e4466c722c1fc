//! Errors surfaced by the interpreter.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpError {
    #[error(transparent)]
    Project(#[from] projgraph_core::ProjectError),

    #[error("unrecognised entity kind tag `{0}`")]
    BadEntityKind(String),

    #[error("`{0}` is reserved and not yet implemented")]
    NotImplemented(String),

    #[error("malformed AST node: {0}")]
    MalformedInput(String),
}
