//! Core error types.

use thiserror::Error;

/// Core database errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Storage layer error.
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),

    /// SQL parse error.
    #[error("parse error: {0}")]
    Parse(#[from] chronodb_lang::ParseError),

    /// Row encoding/decoding error.
    #[error("codec error: {0}")]
    Codec(String),

    /// Semantic error in a query or statement.
    #[error("semantic error: {0}")]
    Semantic(String),

    /// Database does not exist.
    #[error("database not found: {0}")]
    DatabaseNotFound(String),

    /// Database already exists.
    #[error("database already exists: {0}")]
    DatabaseExists(String),

    /// Table does not exist.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// Table already exists.
    #[error("table already exists: {0}")]
    TableExists(String),

    /// Super-table does not exist.
    #[error("stable not found: {0}")]
    StableNotFound(String),

    /// Super-table already exists.
    #[error("stable already exists: {0}")]
    StableExists(String),

    /// No database selected for a statement that requires one.
    #[error("no database selected")]
    NoDatabaseSelected,
}

impl Error {
    /// Whether this error was raised during semantic analysis, before any
    /// plan was built.
    pub fn is_semantic(&self) -> bool {
        matches!(
            self,
            Error::Semantic(_)
                | Error::TableNotFound(_)
                | Error::StableNotFound(_)
                | Error::DatabaseNotFound(_)
        )
    }
}
