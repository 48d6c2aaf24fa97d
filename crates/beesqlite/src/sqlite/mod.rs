// The SQLite binding: the raw FFI surface and the two handle-owning types
// built on it.

pub(crate) mod connection;
pub mod error;
pub(crate) mod ffi;
pub(crate) mod statement;
mod type_info;

pub use connection::Connection;
pub use error::SqliteError;
pub use statement::{Statement, StatementState};
pub use type_info::ValueTag;
