//! Errors surfaced by project model mutations.

use thiserror::Error;

/// Errors raised by [`crate::Project`] CRUD operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("id must not be blank")]
    InvalidId,

    #[error("no entity with id `{0}`")]
    IdNotFound(String),

    #[error("entity with id `{0}` already exists")]
    IdExists(String),

    #[error("source and destination of a dependency must differ, got `{0}`")]
    SameId(String),
}
