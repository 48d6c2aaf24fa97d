//! A typed binding layer over SQLite's prepared-statement interface.
//!
//! Application values travel as named, tagged [`Field`]s. Writes bind fields
//! to `:name` parameters; reads come back as [`Row`]s of fields collected in
//! a [`ResultSet`].
//!
//! ```no_run
//! # fn main() -> beesqlite::Result<()> {
//! use beesqlite::{Connection, Field};
//!
//! let mut conn = Connection::open_in_memory()?;
//! conn.exec("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
//!
//! let id = conn.insert("users", &[Field::new("name", "Ann")])?;
//! conn.update("users", &Field::new("id", id), &[Field::new("name", "Anne")])?;
//!
//! for row in &conn.select("SELECT id, name FROM users")? {
//!     println!("{}: {}", row.field("id")?.as_int()?, row.field("name")?.as_text()?);
//! }
//! # Ok(())
//! # }
//! ```

#[macro_use]
mod enum_mode;

mod error;
mod field;
mod header;
mod logger;
mod options;
mod query_result;
mod result_set;
mod row;
mod sql_builder;
mod sqlite;
mod transaction;

pub use crate::{
    error::{BindError, Error, Result},
    field::{Field, FieldValue},
    header::{SQLITE_HEADER, is_database_file},
    logger::LogSettings,
    options::{JournalMode, LockingMode, Options, Synchronous},
    query_result::QueryResult,
    result_set::ResultSet,
    row::Row,
    sql_builder::quote_identifier,
    sqlite::{
        Connection, SqliteError, Statement, StatementState, ValueTag,
        error::{ExtendedErrCode, PrimaryErrCode},
    },
    transaction::Transaction,
};
