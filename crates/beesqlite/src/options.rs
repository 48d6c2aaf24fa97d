use std::{fmt::Write, path::Path, time::Duration};

use indexmap::IndexMap;
use log::LevelFilter;

use crate::{
    Connection, Error, Result, header::is_database_file, logger::LogSettings,
    sqlite::connection::OpenTarget,
};

enum_mode! {
    /// Refer to [SQLite documentation] for the meaning of the connection locking mode.
    ///
    /// [SQLite documentation]: https://www.sqlite.org/pragma.html#pragma_locking_mode
    pub LockingMode {
        Normal => "NORMAL",
        Exclusive => "EXCLUSIVE",
    }
    default Normal
}

enum_mode! {
    /// Refer to [SQLite documentation] for the meaning of the database journaling mode.
    ///
    /// [SQLite documentation]: https://www.sqlite.org/pragma.html#pragma_journal_mode
    pub JournalMode {
        Delete => "DELETE",
        Truncate => "TRUNCATE",
        Persist => "PERSIST",
        Memory => "MEMORY",
        Wal => "WAL",
        Off => "OFF",
    }
    default Delete
}

enum_mode! {
    /// Refer to [SQLite documentation] for the meaning of various synchronous settings.
    ///
    /// [SQLite documentation]: https://www.sqlite.org/pragma.html#pragma_synchronous
    pub Synchronous {
        Off => "OFF",
        Normal => "NORMAL",
        Full => "FULL",
        Extra => "EXTRA",
    }
    default Full
}

/// How to open a [`Connection`].
///
/// ```no_run
/// # fn main() -> beesqlite::Result<()> {
/// use beesqlite::{JournalMode, Options};
///
/// let conn = Options::new()
///     .journal_mode(JournalMode::Wal)
///     .foreign_keys(false)
///     .open("app.db")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Options {
    pub(crate) read_only: bool,
    pub(crate) busy_timeout: Duration,
    pub(crate) log_settings: LogSettings,
    pub(crate) pragmas: IndexMap<String, Option<String>>,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    #[must_use]
    pub fn new() -> Self {
        let mut pragmas: IndexMap<String, Option<String>> = IndexMap::new();

        // Inserted up front so the order holds even when a setter overrides
        // one of them later. page_size has to come first to have any effect
        // on a new database, and locking_mode has to precede journal_mode.
        pragmas.insert("page_size".into(), None);
        pragmas.insert("locking_mode".into(), None);
        pragmas.insert("journal_mode".into(), None);

        // SQLite leaves enforcement off for backward compatibility.
        pragmas.insert("foreign_keys".into(), Some("ON".into()));

        pragmas.insert("synchronous".into(), None);

        Self {
            read_only: false,
            busy_timeout: Duration::from_secs(5),
            log_settings: LogSettings::default(),
            pragmas,
        }
    }

    /// Open the database for reading only.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// How long the engine waits on a locked database before reporting
    /// `SQLITE_BUSY`. Defaults to 5 seconds; durations beyond `i32::MAX`
    /// milliseconds are clamped.
    #[must_use]
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Set the enforcement of [foreign key constraints](https://www.sqlite.org/pragma.html#pragma_foreign_keys).
    /// On by default.
    #[must_use]
    pub fn foreign_keys(self, on: bool) -> Self {
        self.pragma("foreign_keys", if on { "ON" } else { "OFF" })
    }

    /// Sets the [journal mode](https://www.sqlite.org/pragma.html#pragma_journal_mode).
    /// Left to the database's own setting unless called.
    #[must_use]
    pub fn journal_mode(self, mode: JournalMode) -> Self {
        self.pragma("journal_mode", mode.as_str())
    }

    #[must_use]
    pub fn locking_mode(self, mode: LockingMode) -> Self {
        self.pragma("locking_mode", mode.as_str())
    }

    #[must_use]
    pub fn synchronous(self, synchronous: Synchronous) -> Self {
        self.pragma("synchronous", synchronous.as_str())
    }

    /// Sets the [page size](https://www.sqlite.org/pragma.html#pragma_page_size). Only
    /// effective before the database's first page is written.
    #[must_use]
    pub fn page_size(self, page_size: u32) -> Self {
        self.pragma("page_size", &page_size.to_string())
    }

    /// Run `PRAGMA key = value` on every connection opened with these options.
    #[must_use]
    pub fn pragma(mut self, key: &str, value: &str) -> Self {
        self.pragmas.insert(key.into(), Some(value.into()));
        self
    }

    /// Level at which every executed statement is logged.
    #[must_use]
    pub fn log_statements(mut self, level: LevelFilter) -> Self {
        self.log_settings.log_statements(level);
        self
    }

    /// Level at which statements running longer than `duration` are logged.
    #[must_use]
    pub fn log_slow_statements(mut self, level: LevelFilter, duration: Duration) -> Self {
        self.log_settings.log_slow_statements(level, duration);
        self
    }

    /// Open an existing database. Fails with [`Error::NotADatabase`] unless
    /// the file starts with the SQLite header.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Connection> {
        let path = path.as_ref();
        if !is_database_file(path) {
            return Err(Error::NotADatabase(path.to_owned()));
        }
        Connection::establish(self, OpenTarget::Existing(path))
    }

    /// Create a new database. Fails with [`Error::AlreadyExists`] if the
    /// path already holds one.
    pub fn create(&self, path: impl AsRef<Path>) -> Result<Connection> {
        let path = path.as_ref();
        if is_database_file(path) {
            return Err(Error::AlreadyExists(path.to_owned()));
        }
        Connection::establish(self, OpenTarget::New(path))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory(&self) -> Result<Connection> {
        Connection::establish(self, OpenTarget::Memory)
    }

    /// The PRAGMA statements run after opening, in application order.
    pub(crate) fn pragma_string(&self) -> String {
        let mut string = String::new();

        for (key, value) in &self.pragmas {
            if let Some(value) = value {
                // writing to a String cannot fail
                let _ = write!(string, "PRAGMA {key} = {value}; ");
            }
        }

        string
    }
}
