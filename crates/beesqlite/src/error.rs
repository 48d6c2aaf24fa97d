//! Types for working with errors produced by beesqlite.

use std::io;
use std::path::PathBuf;

use crate::{ValueTag, sqlite::error::SqliteError};

/// A specialized `Result` type for beesqlite.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to attach a field to a statement parameter.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The statement has no parameter with the field's bind name.
    #[error("statement has no parameter named `{0}`")]
    UnknownParameter(String),

    /// The engine rejected the value, e.g. an out-of-range index or a value
    /// exceeding the engine's size limits.
    #[error("failed to bind `{name}`: {source}")]
    Engine {
        name: String,
        #[source]
        source: SqliteError,
    },
}

/// Represents all the ways a method can fail within beesqlite.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Error returned from the database outside of the statement lifecycle,
    /// e.g. while opening, closing or running [`exec`](crate::Connection::exec).
    #[error("error returned from database: {0}")]
    Sqlite(#[source] SqliteError),

    /// The engine could not compile the SQL text.
    #[error("failed to prepare `{sql}`: {source}")]
    Prepare {
        sql: String,
        #[source]
        source: SqliteError,
    },

    /// A field could not be bound to the prepared statement.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// Stepping the statement failed (busy, locked, constraint, corrupt, I/O...).
    #[error("error while stepping statement: {0}")]
    Step(#[source] SqliteError),

    /// Releasing or resetting a statement failed.
    #[error("failed to release statement: {0}")]
    Exhausted(#[source] SqliteError),

    /// A field accessor was called for a different storage class than the one
    /// the field holds.
    #[error("field `{name}` holds {found}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: ValueTag,
        found: ValueTag,
    },

    /// An operation that needs at least one field was given none.
    #[error("{0} requires at least one field")]
    EmptyInput(&'static str),

    /// A statement operation was called in a state that does not allow it,
    /// e.g. preparing while a previous statement is still live.
    #[error("cannot {operation} while statement is {state}")]
    InvalidState {
        operation: &'static str,
        state: crate::StatementState,
    },

    /// No column found for the given name.
    #[error("no column found for name: {0}")]
    ColumnNotFound(String),

    /// A column value could not be converted into a field.
    #[error("error occurred while decoding column `{column}`: {message}")]
    Decode { column: String, message: String },

    /// The path does not hold an SQLite database.
    #[error("{} is not an SQLite database", .0.display())]
    NotADatabase(PathBuf),

    /// Refused to create a database over an existing one.
    #[error("database {} already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Error reading or removing the database file.
    #[error("error communicating with database: {0}")]
    Io(#[from] io::Error),

    /// Unexpected or invalid input that never reached the engine.
    #[error("encountered unexpected or invalid data: {0}")]
    Protocol(String),
}

impl Error {
    /// The engine error behind this error, if there is one.
    pub fn sqlite_error(&self) -> Option<&SqliteError> {
        match self {
            Error::Sqlite(err)
            | Error::Prepare { source: err, .. }
            | Error::Step(err)
            | Error::Exhausted(err)
            | Error::Bind(BindError::Engine { source: err, .. }) => Some(err),
            _ => None,
        }
    }

    pub fn into_sqlite_error(self) -> Option<SqliteError> {
        match self {
            Error::Sqlite(err)
            | Error::Prepare { source: err, .. }
            | Error::Step(err)
            | Error::Exhausted(err)
            | Error::Bind(BindError::Engine { source: err, .. }) => Some(err),
            _ => None,
        }
    }
}

impl From<SqliteError> for Error {
    fn from(error: SqliteError) -> Self {
        Error::Sqlite(error)
    }
}
