use std::ffi::CString;
use std::mem;
use std::ptr::NonNull;

use libsqlite3_sys::sqlite3_stmt;

use crate::sqlite::{SqliteError, ValueTag, ffi};

/// Owned `sqlite3_stmt`. Finalized exactly once: either explicitly through
/// [`StatementHandle::finalize`] or, failing that, on drop.
#[derive(Debug)]
pub(crate) struct StatementHandle(NonNull<sqlite3_stmt>);

// SAFETY: a statement handle may move between threads as long as it is only
// used by one of them at a time, which `&mut` access on the owning connection
// ensures.
unsafe impl Send for StatementHandle {}

impl StatementHandle {
    pub(super) fn new(ptr: NonNull<sqlite3_stmt>) -> Self {
        Self(ptr)
    }

    fn as_ptr(&self) -> *mut sqlite3_stmt {
        self.0.as_ptr()
    }

    pub(crate) fn column_count(&self) -> usize {
        usize::try_from(ffi::column_count(self.as_ptr())).unwrap_or(0)
    }

    pub(crate) fn column_name(&self, index: usize) -> String {
        ffi::column_name(self.as_ptr(), index as i32)
    }

    // Number Of SQL Parameters

    pub(crate) fn bind_parameter_count(&self) -> usize {
        usize::try_from(ffi::bind_parameter_count(self.as_ptr())).unwrap_or(0)
    }

    /// Index of a named parameter. `None` if the statement has no parameter
    /// with that name. Parameter indices start at 1.
    pub(crate) fn bind_parameter_index(&self, name: &str) -> Option<usize> {
        let name = CString::new(name).ok()?;
        match ffi::bind_parameter_index(self.as_ptr(), name.as_ptr()) {
            0 => None,
            index => usize::try_from(index).ok(),
        }
    }

    // Binding Values To Prepared Statements
    // https://www.sqlite.org/c3ref/bind_blob.html

    pub(crate) fn bind_blob(&mut self, index: usize, v: &[u8]) -> Result<(), SqliteError> {
        ffi::bind_blob64(self.as_ptr(), index as i32, v)
    }

    pub(crate) fn bind_text(&mut self, index: usize, v: &str) -> Result<(), SqliteError> {
        ffi::bind_text64(self.as_ptr(), index as i32, v)
    }

    pub(crate) fn bind_int64(&mut self, index: usize, v: i64) -> Result<(), SqliteError> {
        ffi::bind_int64(self.as_ptr(), index as i32, v)
    }

    pub(crate) fn bind_double(&mut self, index: usize, v: f64) -> Result<(), SqliteError> {
        ffi::bind_double(self.as_ptr(), index as i32, v)
    }

    pub(crate) fn bind_null(&mut self, index: usize) -> Result<(), SqliteError> {
        ffi::bind_null(self.as_ptr(), index as i32)
    }

    // result values from the query
    // https://www.sqlite.org/c3ref/column_blob.html

    pub(crate) fn column_type(&self, index: usize) -> ValueTag {
        ValueTag::from_code(ffi::column_type(self.as_ptr(), index as i32)).unwrap_or(ValueTag::Null)
    }

    pub(crate) fn column_int64(&self, index: usize) -> i64 {
        ffi::column_int64(self.as_ptr(), index as i32)
    }

    pub(crate) fn column_double(&self, index: usize) -> f64 {
        ffi::column_double(self.as_ptr(), index as i32)
    }

    pub(crate) fn column_text(&self, index: usize) -> Vec<u8> {
        ffi::column_text(self.as_ptr(), index as i32)
    }

    pub(crate) fn column_bytes(&self, index: usize) -> Vec<u8> {
        ffi::column_bytes(self.as_ptr(), index as i32)
    }

    pub(crate) fn changes(&self) -> u64 {
        // number of changes of the most recently completed statement on the
        // connection, which is this one right after it reports DONE
        ffi::changes(ffi::db_handle(self.as_ptr()))
    }

    pub(crate) fn last_insert_rowid(&self) -> i64 {
        ffi::last_insert_rowid(ffi::db_handle(self.as_ptr()))
    }

    pub(crate) fn clear_bindings(&mut self) {
        ffi::clear_bindings(self.as_ptr());
    }

    pub(crate) fn reset(&mut self) -> Result<(), SqliteError> {
        ffi::reset(self.as_ptr())
    }

    /// Advance the statement. `Ok(true)` if a row is available.
    pub(crate) fn step(&mut self) -> Result<bool, SqliteError> {
        match ffi::step(self.as_ptr())? {
            ffi::Step::Row => Ok(true),
            ffi::Step::Done => Ok(false),
        }
    }

    /// Release the statement and report the engine's verdict.
    ///
    /// If the most recent step failed, SQLite repeats that failure here.
    pub(crate) fn finalize(self) -> Result<(), SqliteError> {
        let ptr = self.as_ptr();
        mem::forget(self);
        ffi::finalize(ptr)
    }
}

impl Drop for StatementHandle {
    fn drop(&mut self) {
        // https://sqlite.org/c3ref/finalize.html
        if let Err(e) = ffi::finalize(self.as_ptr()) {
            tracing::debug!("sqlite3_finalize on drop reported: {e}");
        }
    }
}
