use std::{
    ffi::CString,
    io,
    path::Path,
    ptr::{NonNull, null_mut},
    time::Duration,
};

use libsqlite3_sys::{
    SQLITE_OPEN_CREATE, SQLITE_OPEN_MEMORY, SQLITE_OPEN_NOMUTEX, SQLITE_OPEN_PRIVATECACHE,
    SQLITE_OPEN_READONLY, SQLITE_OPEN_READWRITE,
};

use crate::{
    Error, Options,
    sqlite::{connection::handle::ConnectionHandle, ffi},
};

/// Which database a connection is opened on.
#[derive(Debug, Clone, Copy)]
pub(crate) enum OpenTarget<'a> {
    /// A database file that must already exist.
    Existing(&'a Path),
    /// A database file that may be created.
    New(&'a Path),
    /// A private in-memory database.
    Memory,
}

impl OpenTarget<'_> {
    pub(crate) fn path(&self) -> Option<&Path> {
        match self {
            OpenTarget::Existing(path) | OpenTarget::New(path) => Some(path),
            OpenTarget::Memory => None,
        }
    }
}

pub(crate) struct EstablishParams {
    filename: CString,
    open_flags: i32,
    busy_timeout: Duration,
}

impl EstablishParams {
    pub(crate) fn new(options: &Options, target: OpenTarget<'_>) -> Result<Self, Error> {
        let filename = match target.path() {
            Some(path) => path
                .to_str()
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        "filename passed to SQLite must be valid UTF-8",
                    )
                })?
                .to_owned(),
            None => ":memory:".to_owned(),
        };

        // The connection is only ever used through `&mut`, so SQLite's own
        // mutexes are not needed.
        let mut flags = SQLITE_OPEN_NOMUTEX | SQLITE_OPEN_PRIVATECACHE;

        flags |= match target {
            _ if options.read_only => SQLITE_OPEN_READONLY,
            OpenTarget::Existing(_) => SQLITE_OPEN_READWRITE,
            OpenTarget::New(_) => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE,
            OpenTarget::Memory => SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_MEMORY,
        };

        let filename = CString::new(filename).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "filename passed to SQLite must not contain nul bytes",
            )
        })?;

        Ok(Self {
            filename,
            open_flags: flags,
            busy_timeout: options.busy_timeout,
        })
    }

    /// Open the database, enable extended result codes and set the busy
    /// timeout.
    ///
    /// The busy timeout is clamped to `i32::MAX` milliseconds.
    pub(crate) fn establish(&self) -> Result<ConnectionHandle, Error> {
        let mut handle = null_mut();

        // <https://www.sqlite.org/c3ref/open.html>
        ffi::open_v2(self.filename.as_ptr(), &mut handle, self.open_flags)?;

        let handle = NonNull::new(handle).map(ConnectionHandle::new).ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "SQLite is unable to allocate memory to hold the sqlite3 object",
            ))
        })?;

        // Extended codes tell e.g. SQLITE_CONSTRAINT_UNIQUE apart from
        // SQLITE_CONSTRAINT_FOREIGNKEY.
        // <https://www.sqlite.org/c3ref/extended_result_codes.html>
        ffi::extended_result_codes(handle.as_ptr(), true)?;

        // <https://www.sqlite.org/c3ref/busy_timeout.html>
        let ms = i32::try_from(self.busy_timeout.as_millis()).unwrap_or(i32::MAX);
        ffi::busy_timeout(handle.as_ptr(), ms)?;

        Ok(handle)
    }
}
