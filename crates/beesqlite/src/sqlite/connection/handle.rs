use std::{ffi::CString, mem, ptr::NonNull};

use libsqlite3_sys::sqlite3;

use crate::{
    Error,
    sqlite::{SqliteError, ffi},
};

/// Owned handle to an open `sqlite3` database. Closed on drop unless
/// [`ConnectionHandle::close`] already did so.
#[derive(Debug)]
pub(crate) struct ConnectionHandle(NonNull<sqlite3>);

// SAFETY: a database handle may move between threads provided no two threads
// use it at once. The bundled library is built threadsafe and every use goes
// through `&mut Connection`.
// <https://www.sqlite.org/c3ref/threadsafe.html>
unsafe impl Send for ConnectionHandle {}

impl ConnectionHandle {
    pub(super) fn new(ptr: NonNull<sqlite3>) -> Self {
        Self(ptr)
    }

    pub(crate) fn as_ptr(&self) -> *mut sqlite3 {
        self.0.as_ptr()
    }

    pub(crate) fn last_insert_rowid(&self) -> i64 {
        ffi::last_insert_rowid(self.as_ptr())
    }

    pub(crate) fn changes(&self) -> u64 {
        ffi::changes(self.as_ptr())
    }

    /// `true` while an explicit transaction is open.
    pub(crate) fn in_transaction(&self) -> bool {
        !ffi::get_autocommit(self.as_ptr())
    }

    pub(crate) fn last_error(&self) -> SqliteError {
        SqliteError::new(self.as_ptr())
    }

    /// Run one or more `;`-separated statements without parameters.
    pub(crate) fn exec(&self, query: &str) -> Result<(), Error> {
        let query = CString::new(query)
            .map_err(|_| Error::Protocol("query contains nul bytes".into()))?;

        ffi::exec(self.as_ptr(), query.as_ptr())?;
        Ok(())
    }

    /// Close the database, reporting failure instead of logging it.
    pub(crate) fn close(self) -> Result<(), SqliteError> {
        let ptr = self.as_ptr();
        mem::forget(self);
        ffi::close(ptr)
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        // https://sqlite.org/c3ref/close.html
        if let Err(e) = ffi::close(self.as_ptr()) {
            // only possible if a statement handle outlived its connection
            tracing::error!("failed to close database: {e}");
        }
    }
}
