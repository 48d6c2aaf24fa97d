use crate::sqlite::ffi;
use libsqlite3_sys::{self, sqlite3};

// Error Codes And Messages
// https://www.sqlite.org/rescode.html

/// Primary SQLite result codes (the low byte of an extended code).
///
/// **Note:** This enum is marked `#[non_exhaustive]`; avoid exhaustive
/// matches as new variants may be introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum PrimaryErrCode {
    Error,
    Internal,
    Perm,
    Abort,
    Busy,
    Locked,
    NoMem,
    ReadOnly,
    Interrupt,
    IoErr,
    Corrupt,
    NotFound,
    Full,
    CantOpen,
    Protocol,
    Empty,
    Schema,
    TooBig,
    Constraint,
    Mismatch,
    Misuse,
    NoLfs,
    Auth,
    Format,
    Range,
    NotADB,
    Notice,
    Warning,
    Unknown(i32),
}

impl PrimaryErrCode {
    pub(crate) fn from_code(code: i32) -> Self {
        match code & 0xff {
            libsqlite3_sys::SQLITE_ERROR => Self::Error,
            libsqlite3_sys::SQLITE_INTERNAL => Self::Internal,
            libsqlite3_sys::SQLITE_PERM => Self::Perm,
            libsqlite3_sys::SQLITE_ABORT => Self::Abort,
            libsqlite3_sys::SQLITE_BUSY => Self::Busy,
            libsqlite3_sys::SQLITE_LOCKED => Self::Locked,
            libsqlite3_sys::SQLITE_NOMEM => Self::NoMem,
            libsqlite3_sys::SQLITE_READONLY => Self::ReadOnly,
            libsqlite3_sys::SQLITE_INTERRUPT => Self::Interrupt,
            libsqlite3_sys::SQLITE_IOERR => Self::IoErr,
            libsqlite3_sys::SQLITE_CORRUPT => Self::Corrupt,
            libsqlite3_sys::SQLITE_NOTFOUND => Self::NotFound,
            libsqlite3_sys::SQLITE_FULL => Self::Full,
            libsqlite3_sys::SQLITE_CANTOPEN => Self::CantOpen,
            libsqlite3_sys::SQLITE_PROTOCOL => Self::Protocol,
            libsqlite3_sys::SQLITE_EMPTY => Self::Empty,
            libsqlite3_sys::SQLITE_SCHEMA => Self::Schema,
            libsqlite3_sys::SQLITE_TOOBIG => Self::TooBig,
            libsqlite3_sys::SQLITE_CONSTRAINT => Self::Constraint,
            libsqlite3_sys::SQLITE_MISMATCH => Self::Mismatch,
            libsqlite3_sys::SQLITE_MISUSE => Self::Misuse,
            libsqlite3_sys::SQLITE_NOLFS => Self::NoLfs,
            libsqlite3_sys::SQLITE_AUTH => Self::Auth,
            libsqlite3_sys::SQLITE_FORMAT => Self::Format,
            libsqlite3_sys::SQLITE_RANGE => Self::Range,
            libsqlite3_sys::SQLITE_NOTADB => Self::NotADB,
            libsqlite3_sys::SQLITE_NOTICE => Self::Notice,
            libsqlite3_sys::SQLITE_WARNING => Self::Warning,
            _ => Self::Unknown(code),
        }
    }
}

/// Extended SQLite result codes for the conditions callers usually branch on.
///
/// Codes outside this set are reported as [`ExtendedErrCode::Unknown`] with
/// the raw value; the primary code is always available as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExtendedErrCode {
    BusyRecovery,
    BusySnapshot,
    BusyTimeout,
    LockedSharedCache,
    LockedVTab,
    ConstraintCheck,
    ConstraintForeignKey,
    ConstraintNotNull,
    ConstraintPrimaryKey,
    ConstraintUnique,
    ConstraintRowId,
    ConstraintDataType,
    CorruptVTab,
    CorruptSequence,
    CorruptIndex,
    IOErrRead,
    IOErrShortRead,
    IOErrWrite,
    IOErrFsync,
    IOErrNoMem,
    IOErrLock,
    CantOpenIsDir,
    CantOpenFullPath,
    ReadOnlyRollback,
    ReadOnlyDbMoved,
    ReadOnlyDirectory,
    AbortRollback,
    Unknown(i32),
}

impl ExtendedErrCode {
    pub(crate) fn from_code(code: i32) -> Self {
        match code {
            libsqlite3_sys::SQLITE_BUSY_RECOVERY => Self::BusyRecovery,
            libsqlite3_sys::SQLITE_BUSY_SNAPSHOT => Self::BusySnapshot,
            libsqlite3_sys::SQLITE_BUSY_TIMEOUT => Self::BusyTimeout,
            libsqlite3_sys::SQLITE_LOCKED_SHAREDCACHE => Self::LockedSharedCache,
            libsqlite3_sys::SQLITE_LOCKED_VTAB => Self::LockedVTab,
            libsqlite3_sys::SQLITE_CONSTRAINT_CHECK => Self::ConstraintCheck,
            libsqlite3_sys::SQLITE_CONSTRAINT_FOREIGNKEY => Self::ConstraintForeignKey,
            libsqlite3_sys::SQLITE_CONSTRAINT_NOTNULL => Self::ConstraintNotNull,
            libsqlite3_sys::SQLITE_CONSTRAINT_PRIMARYKEY => Self::ConstraintPrimaryKey,
            libsqlite3_sys::SQLITE_CONSTRAINT_UNIQUE => Self::ConstraintUnique,
            libsqlite3_sys::SQLITE_CONSTRAINT_ROWID => Self::ConstraintRowId,
            libsqlite3_sys::SQLITE_CONSTRAINT_DATATYPE => Self::ConstraintDataType,
            libsqlite3_sys::SQLITE_CORRUPT_VTAB => Self::CorruptVTab,
            libsqlite3_sys::SQLITE_CORRUPT_SEQUENCE => Self::CorruptSequence,
            libsqlite3_sys::SQLITE_CORRUPT_INDEX => Self::CorruptIndex,
            libsqlite3_sys::SQLITE_IOERR_READ => Self::IOErrRead,
            libsqlite3_sys::SQLITE_IOERR_SHORT_READ => Self::IOErrShortRead,
            libsqlite3_sys::SQLITE_IOERR_WRITE => Self::IOErrWrite,
            libsqlite3_sys::SQLITE_IOERR_FSYNC => Self::IOErrFsync,
            libsqlite3_sys::SQLITE_IOERR_NOMEM => Self::IOErrNoMem,
            libsqlite3_sys::SQLITE_IOERR_LOCK => Self::IOErrLock,
            libsqlite3_sys::SQLITE_CANTOPEN_ISDIR => Self::CantOpenIsDir,
            libsqlite3_sys::SQLITE_CANTOPEN_FULLPATH => Self::CantOpenFullPath,
            libsqlite3_sys::SQLITE_READONLY_ROLLBACK => Self::ReadOnlyRollback,
            libsqlite3_sys::SQLITE_READONLY_DBMOVED => Self::ReadOnlyDbMoved,
            libsqlite3_sys::SQLITE_READONLY_DIRECTORY => Self::ReadOnlyDirectory,
            libsqlite3_sys::SQLITE_ABORT_ROLLBACK => Self::AbortRollback,
            _ => Self::Unknown(code),
        }
    }

    fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::BusyRecovery | Self::BusySnapshot | Self::BusyTimeout
        )
    }
}

/// An error reported by the SQLite engine, with its code and message verbatim.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} (code: {code}, {primary:?})")]
pub struct SqliteError {
    pub primary: PrimaryErrCode,
    pub extended: ExtendedErrCode,
    /// The raw extended result code.
    pub code: i32,
    pub message: String,
}

impl SqliteError {
    /// Capture the most recent error recorded on a connection handle.
    pub(crate) fn new(handle: *mut sqlite3) -> Self {
        let code = ffi::extended_errcode(handle);
        Self::from_code(code, ffi::errmsg(handle))
    }

    pub(crate) fn from_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            primary: PrimaryErrCode::from_code(code),
            extended: ExtendedErrCode::from_code(code),
            code,
            message: message.into(),
        }
    }

    pub fn primary_code(&self) -> PrimaryErrCode {
        self.primary
    }

    pub fn extended_code(&self) -> ExtendedErrCode {
        self.extended
    }

    /// `SQLITE_BUSY` or one of its extended forms.
    pub fn is_busy(&self) -> bool {
        self.primary == PrimaryErrCode::Busy || self.extended.is_busy()
    }

    /// `SQLITE_LOCKED` or one of its extended forms.
    pub fn is_locked(&self) -> bool {
        self.primary == PrimaryErrCode::Locked
    }

    pub fn is_constraint(&self) -> bool {
        self.primary == PrimaryErrCode::Constraint
    }
}
