// Thin wrappers around the libsqlite3_sys functions this crate calls.
// Every `unsafe` block that talks to the C API lives either here or in the
// two handle types, so the rest of the crate stays safe code.

use std::ffi::{CStr, c_void};
use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::sqlite::error::SqliteError;
use libsqlite3_sys::{self as ffi_sys, sqlite3, sqlite3_stmt};

const fn assert_c_int_is_32bit() {
    assert!(std::mem::size_of::<c_int>() == 4);
}

// Indices and lengths are narrowed to `c_int` throughout.
const _ASSERT_C_INT_32BIT: () = assert_c_int_is_32bit();

fn check(db: *mut sqlite3, rc: c_int) -> Result<(), SqliteError> {
    if rc == ffi_sys::SQLITE_OK {
        Ok(())
    } else {
        Err(SqliteError::new(db))
    }
}

fn check_stmt(stmt: *mut sqlite3_stmt, rc: c_int) -> Result<(), SqliteError> {
    if rc == ffi_sys::SQLITE_OK {
        Ok(())
    } else {
        Err(SqliteError::new(db_handle(stmt)))
    }
}

/// Wrapper around [`sqlite3_libversion`].
pub(crate) fn libversion() -> &'static str {
    // SAFETY: sqlite3_libversion returns a pointer to a static, nul terminated string.
    unsafe { CStr::from_ptr(ffi_sys::sqlite3_libversion()) }
        .to_str()
        .unwrap_or("unknown")
}

/// Wrapper around [`sqlite3_errstr`].
pub(crate) fn errstr(code: i32) -> String {
    // SAFETY: sqlite3_errstr always returns a static, nul terminated string.
    unsafe { CStr::from_ptr(ffi_sys::sqlite3_errstr(code as c_int)) }
        .to_string_lossy()
        .into_owned()
}

/// Wrapper around [`sqlite3_open_v2`].
///
/// On failure the partially opened handle is closed before returning.
pub(crate) fn open_v2(
    filename: *const c_char,
    handle: *mut *mut sqlite3,
    flags: i32,
) -> Result<(), SqliteError> {
    // SAFETY: filename is a valid C string and handle a valid out pointer.
    let rc = unsafe { ffi_sys::sqlite3_open_v2(filename, handle, flags as c_int, ptr::null()) };
    if rc == ffi_sys::SQLITE_OK {
        return Ok(());
    }

    // SAFETY: handle was written by sqlite3_open_v2 (possibly null on OOM).
    let db = unsafe { *handle };
    if db.is_null() {
        return Err(SqliteError::from_code(rc, errstr(rc)));
    }

    let err = SqliteError::new(db);
    // SAFETY: db is a handle returned by sqlite3_open_v2 that we own.
    unsafe {
        ffi_sys::sqlite3_close(db);
        *handle = ptr::null_mut();
    }
    Err(err)
}

/// Wrapper around [`sqlite3_extended_result_codes`].
pub(crate) fn extended_result_codes(db: *mut sqlite3, onoff: bool) -> Result<(), SqliteError> {
    // SAFETY: db is an open connection handle.
    let rc = unsafe { ffi_sys::sqlite3_extended_result_codes(db, c_int::from(onoff)) };
    check(db, rc)
}

/// Wrapper around [`sqlite3_busy_timeout`].
pub(crate) fn busy_timeout(db: *mut sqlite3, ms: i32) -> Result<(), SqliteError> {
    // SAFETY: db is an open connection handle.
    let rc = unsafe { ffi_sys::sqlite3_busy_timeout(db, ms as c_int) };
    check(db, rc)
}

/// Wrapper around [`sqlite3_close`].
pub(crate) fn close(db: *mut sqlite3) -> Result<(), SqliteError> {
    // SAFETY: db is an open connection handle that the caller gives up.
    let rc = unsafe { ffi_sys::sqlite3_close(db) };
    check(db, rc)
}

/// Wrapper around [`sqlite3_exec`] with no callback.
pub(crate) fn exec(db: *mut sqlite3, sql: *const c_char) -> Result<(), SqliteError> {
    // SAFETY: db is open and sql is a valid nul terminated string.
    let rc = unsafe { ffi_sys::sqlite3_exec(db, sql, None, ptr::null_mut(), ptr::null_mut()) };
    check(db, rc)
}

/// Wrapper around [`sqlite3_prepare_v2`].
///
/// Only the first statement of `sql` is compiled. A null statement pointer
/// with `Ok` means the text held no SQL at all.
pub(crate) fn prepare_v2(
    db: *mut sqlite3,
    sql: *const c_char,
    n_byte: i32,
    stmt: *mut *mut sqlite3_stmt,
) -> Result<(), SqliteError> {
    // SAFETY: db is open, sql points at n_byte readable bytes.
    let rc = unsafe {
        ffi_sys::sqlite3_prepare_v2(db, sql, n_byte as c_int, stmt, ptr::null_mut())
    };
    check(db, rc)
}

/// Wrapper around [`sqlite3_extended_errcode`].
pub(crate) fn extended_errcode(db: *mut sqlite3) -> i32 {
    // SAFETY: db is an open connection handle.
    unsafe { ffi_sys::sqlite3_extended_errcode(db) as i32 }
}

/// Wrapper around [`sqlite3_errmsg`].
pub(crate) fn errmsg(db: *mut sqlite3) -> String {
    // SAFETY: sqlite3_errmsg never returns null for a valid handle; the
    // string is copied out before any other call can invalidate it.
    unsafe {
        let msg = ffi_sys::sqlite3_errmsg(db);
        debug_assert!(!msg.is_null());
        CStr::from_ptr(msg).to_string_lossy().into_owned()
    }
}

/// Wrapper around [`sqlite3_last_insert_rowid`].
pub(crate) fn last_insert_rowid(db: *mut sqlite3) -> i64 {
    // SAFETY: db is an open connection handle.
    unsafe { ffi_sys::sqlite3_last_insert_rowid(db) }
}

/// Wrapper around [`sqlite3_changes64`].
pub(crate) fn changes(db: *mut sqlite3) -> u64 {
    // SAFETY: db is an open connection handle.
    let n = unsafe { ffi_sys::sqlite3_changes64(db) };
    u64::try_from(n).unwrap_or(0)
}

/// Wrapper around [`sqlite3_get_autocommit`].
pub(crate) fn get_autocommit(db: *mut sqlite3) -> bool {
    // SAFETY: db is an open connection handle.
    unsafe { ffi_sys::sqlite3_get_autocommit(db) != 0 }
}

/// Wrapper around [`sqlite3_db_handle`].
pub(crate) fn db_handle(stmt: *mut sqlite3_stmt) -> *mut sqlite3 {
    // SAFETY: stmt is a live prepared statement.
    unsafe { ffi_sys::sqlite3_db_handle(stmt) }
}

/// Wrapper around [`sqlite3_column_count`].
pub(crate) fn column_count(stmt: *mut sqlite3_stmt) -> i32 {
    // SAFETY: stmt is a live prepared statement.
    unsafe { ffi_sys::sqlite3_column_count(stmt) as i32 }
}

/// Wrapper around [`sqlite3_column_name`]. Returns an owned copy of the name.
pub(crate) fn column_name(stmt: *mut sqlite3_stmt, index: i32) -> String {
    // SAFETY: stmt is live and index is below column_count. The returned
    // pointer is only valid until the next call on stmt, so it is copied.
    unsafe {
        let name = ffi_sys::sqlite3_column_name(stmt, index as c_int);
        if name.is_null() {
            return String::new();
        }
        CStr::from_ptr(name).to_string_lossy().into_owned()
    }
}

/// Wrapper around [`sqlite3_bind_parameter_count`].
pub(crate) fn bind_parameter_count(stmt: *mut sqlite3_stmt) -> i32 {
    // SAFETY: stmt is a live prepared statement.
    unsafe { ffi_sys::sqlite3_bind_parameter_count(stmt) as i32 }
}

/// Wrapper around [`sqlite3_bind_parameter_index`]. Returns 0 if no parameter
/// has the given name.
pub(crate) fn bind_parameter_index(stmt: *mut sqlite3_stmt, name: *const c_char) -> i32 {
    // SAFETY: stmt is live and name is a valid nul terminated string.
    unsafe { ffi_sys::sqlite3_bind_parameter_index(stmt, name) as i32 }
}

/// Wrapper around [`sqlite3_bind_blob64`].
pub(crate) fn bind_blob64(stmt: *mut sqlite3_stmt, index: i32, v: &[u8]) -> Result<(), SqliteError> {
    // SAFETY: v outlives the call and SQLITE_TRANSIENT makes SQLite copy it.
    // An empty slice still has a non-null pointer, so SQLite binds a
    // zero-length blob rather than NULL.
    let rc = unsafe {
        ffi_sys::sqlite3_bind_blob64(
            stmt,
            index as c_int,
            v.as_ptr() as *const c_void,
            v.len() as u64,
            ffi_sys::SQLITE_TRANSIENT(),
        )
    };
    check_stmt(stmt, rc)
}

/// Wrapper around [`sqlite3_bind_text64`].
pub(crate) fn bind_text64(stmt: *mut sqlite3_stmt, index: i32, v: &str) -> Result<(), SqliteError> {
    // SAFETY: v outlives the call and SQLITE_TRANSIENT makes SQLite copy it.
    let rc = unsafe {
        ffi_sys::sqlite3_bind_text64(
            stmt,
            index as c_int,
            v.as_ptr() as *const c_char,
            v.len() as u64,
            ffi_sys::SQLITE_TRANSIENT(),
            ffi_sys::SQLITE_UTF8 as u8,
        )
    };
    check_stmt(stmt, rc)
}

/// Wrapper around [`sqlite3_bind_int64`].
pub(crate) fn bind_int64(stmt: *mut sqlite3_stmt, index: i32, v: i64) -> Result<(), SqliteError> {
    // SAFETY: stmt is a live prepared statement.
    let rc = unsafe { ffi_sys::sqlite3_bind_int64(stmt, index as c_int, v) };
    check_stmt(stmt, rc)
}

/// Wrapper around [`sqlite3_bind_double`].
pub(crate) fn bind_double(stmt: *mut sqlite3_stmt, index: i32, v: f64) -> Result<(), SqliteError> {
    // SAFETY: stmt is a live prepared statement.
    let rc = unsafe { ffi_sys::sqlite3_bind_double(stmt, index as c_int, v) };
    check_stmt(stmt, rc)
}

/// Wrapper around [`sqlite3_bind_null`].
pub(crate) fn bind_null(stmt: *mut sqlite3_stmt, index: i32) -> Result<(), SqliteError> {
    // SAFETY: stmt is a live prepared statement.
    let rc = unsafe { ffi_sys::sqlite3_bind_null(stmt, index as c_int) };
    check_stmt(stmt, rc)
}

/// Wrapper around [`sqlite3_column_type`].
pub(crate) fn column_type(stmt: *mut sqlite3_stmt, index: i32) -> i32 {
    // SAFETY: stmt is positioned on a row and index is in range.
    unsafe { ffi_sys::sqlite3_column_type(stmt, index as c_int) as i32 }
}

/// Wrapper around [`sqlite3_column_int64`].
pub(crate) fn column_int64(stmt: *mut sqlite3_stmt, index: i32) -> i64 {
    // SAFETY: stmt is positioned on a row and index is in range.
    unsafe { ffi_sys::sqlite3_column_int64(stmt, index as c_int) }
}

/// Wrapper around [`sqlite3_column_double`].
pub(crate) fn column_double(stmt: *mut sqlite3_stmt, index: i32) -> f64 {
    // SAFETY: stmt is positioned on a row and index is in range.
    unsafe { ffi_sys::sqlite3_column_double(stmt, index as c_int) }
}

/// Copies the bytes of a BLOB column.
///
/// The engine-reported length is authoritative; a zero-length value yields an
/// empty vector even though SQLite hands back a null pointer for it.
pub(crate) fn column_bytes(stmt: *mut sqlite3_stmt, index: i32) -> Vec<u8> {
    // SAFETY: sqlite3_column_blob must be called before sqlite3_column_bytes
    // (https://sqlite.org/c3ref/column_blob.html). The pointer stays valid
    // until the next step/reset/finalize, and the bytes are copied out first.
    unsafe {
        let ptr = ffi_sys::sqlite3_column_blob(stmt, index as c_int) as *const u8;
        let len = ffi_sys::sqlite3_column_bytes(stmt, index as c_int);
        let len = usize::try_from(len).unwrap_or(0);
        if ptr.is_null() || len == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(ptr, len).to_vec()
        }
    }
}

/// Copies a column as UTF-8 text, converting from the database encoding if
/// it is UTF-16.
pub(crate) fn column_text(stmt: *mut sqlite3_stmt, index: i32) -> Vec<u8> {
    // SAFETY: sqlite3_column_text must be called before sqlite3_column_bytes
    // so the length refers to the UTF-8 form. The pointer stays valid until
    // the next step/reset/finalize, and the bytes are copied out first.
    unsafe {
        let ptr = ffi_sys::sqlite3_column_text(stmt, index as c_int);
        let len = ffi_sys::sqlite3_column_bytes(stmt, index as c_int);
        let len = usize::try_from(len).unwrap_or(0);
        if ptr.is_null() || len == 0 {
            Vec::new()
        } else {
            std::slice::from_raw_parts(ptr, len).to_vec()
        }
    }
}

/// Wrapper around [`sqlite3_clear_bindings`].
pub(crate) fn clear_bindings(stmt: *mut sqlite3_stmt) {
    // SAFETY: stmt is a live prepared statement.
    unsafe { ffi_sys::sqlite3_clear_bindings(stmt) };
}

/// Wrapper around [`sqlite3_reset`].
pub(crate) fn reset(stmt: *mut sqlite3_stmt) -> Result<(), SqliteError> {
    // SAFETY: stmt is a live prepared statement.
    let rc = unsafe { ffi_sys::sqlite3_reset(stmt) };
    check_stmt(stmt, rc)
}

/// Outcome of a successful [`sqlite3_step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Row,
    Done,
}

/// Wrapper around [`sqlite3_step`]. Anything other than `SQLITE_ROW` or
/// `SQLITE_DONE` is an error carrying the engine's code and message.
pub(crate) fn step(stmt: *mut sqlite3_stmt) -> Result<Step, SqliteError> {
    // SAFETY: stmt is a live prepared statement.
    let rc = unsafe { ffi_sys::sqlite3_step(stmt) };
    match rc {
        ffi_sys::SQLITE_ROW => Ok(Step::Row),
        ffi_sys::SQLITE_DONE => Ok(Step::Done),
        _ => Err(SqliteError::new(db_handle(stmt))),
    }
}

/// Wrapper around [`sqlite3_finalize`].
///
/// The error code is read from the connection before the statement pointer
/// becomes invalid.
pub(crate) fn finalize(stmt: *mut sqlite3_stmt) -> Result<(), SqliteError> {
    let db = db_handle(stmt);
    // SAFETY: stmt is live and is never used again after this call.
    let rc = unsafe { ffi_sys::sqlite3_finalize(stmt) };
    check(db, rc)
}
