use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    BindError, Error, Field, Options, QueryResult, ResultSet, Result, Transaction, ValueTag,
    logger::{LogSettings, QueryLogger},
    sql_builder::{insert_sql, is_parameter_name, update_sql},
    sqlite::{
        SqliteError, ffi,
        statement::{Statement, StatementState},
    },
};

mod establish;
mod handle;

pub(crate) use establish::OpenTarget;
pub(crate) use handle::ConnectionHandle;

use establish::EstablishParams;

/// An open SQLite database with a single prepared-statement slot.
///
/// Every operation takes `&mut self`, so statements on one connection run
/// strictly one after another.
#[derive(Debug)]
pub struct Connection {
    // declared before `handle` so a live statement is finalized before the
    // database is closed
    statement: Statement,
    handle: ConnectionHandle,
    path: Option<PathBuf>,
    log_settings: LogSettings,
}

impl Connection {
    /// Open an existing database with default [`Options`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Options::new().open(path)
    }

    /// Create a new database with default [`Options`].
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Options::new().create(path)
    }

    /// Open a private in-memory database with default [`Options`].
    pub fn open_in_memory() -> Result<Self> {
        Options::new().open_in_memory()
    }

    pub(crate) fn establish(options: &Options, target: OpenTarget<'_>) -> Result<Self> {
        let handle = EstablishParams::new(options, target)?.establish()?;

        let conn = Self {
            statement: Statement::new(options.log_settings.clone()),
            handle,
            path: target.path().map(Path::to_path_buf),
            log_settings: options.log_settings.clone(),
        };

        // https://www.sqlite.org/pragma.html
        let pragmas = options.pragma_string();
        if !pragmas.is_empty() {
            conn.handle.exec(&pragmas)?;
        }

        tracing::debug!(path = ?conn.path, "opened database");
        Ok(conn)
    }

    /// Version of the linked SQLite library, e.g. `3.49.1`.
    pub fn version() -> &'static str {
        ffi::libversion()
    }

    /// Path of the database file; `None` for an in-memory database.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Compile `sql` into the statement slot.
    ///
    /// The slot must not hold a live statement: finish or
    /// [`finalize`](Statement::finalize) the previous one first.
    pub fn prepare(&mut self, sql: &str) -> Result<&mut Statement> {
        self.statement.prepare(&self.handle, sql)?;
        Ok(&mut self.statement)
    }

    /// The statement slot, in whatever state the last operation left it.
    pub fn statement(&mut self) -> &mut Statement {
        &mut self.statement
    }

    pub fn statement_state(&self) -> StatementState {
        self.statement.state()
    }

    /// Insert one record and return its rowid.
    ///
    /// Field names double as parameter names, so they must be plain
    /// identifiers (letters, digits, `_`, `$`, not starting with a digit);
    /// anything else fails with [`BindError::UnknownParameter`].
    pub fn insert(&mut self, table: &str, fields: &[Field]) -> Result<i64> {
        if fields.is_empty() {
            return Err(Error::EmptyInput("insert"));
        }
        check_parameter_names(fields.iter())?;

        let sql = insert_sql(table, fields);
        let result = self.prepare(&sql)?.bind_and_execute(fields)?;
        Ok(result.last_insert_rowid())
    }

    /// Update the record whose `id.name()` column equals `id`, returning the
    /// number of rows changed.
    ///
    /// `id` must hold an integer. Names are restricted as for
    /// [`insert`](Self::insert).
    pub fn update(&mut self, table: &str, id: &Field, fields: &[Field]) -> Result<u64> {
        if fields.is_empty() {
            return Err(Error::EmptyInput("update"));
        }
        if id.tag() != ValueTag::Integer {
            return Err(Error::TypeMismatch {
                name: id.name().to_owned(),
                expected: ValueTag::Integer,
                found: id.tag(),
            });
        }
        check_parameter_names(std::iter::once(id).chain(fields))?;

        let sql = update_sql(table, id, fields);
        let params: Vec<Field> = std::iter::once(id)
            .chain(fields.iter().filter(|f| f.name() != id.name()))
            .cloned()
            .collect();

        let result = self.prepare(&sql)?.bind_and_execute(&params)?;
        Ok(result.rows_affected())
    }

    /// Run a query and collect every row.
    pub fn select(&mut self, sql: &str) -> Result<ResultSet> {
        self.select_with(sql, &[])
    }

    /// Run a query with named parameters and collect every row.
    pub fn select_with(&mut self, sql: &str, fields: &[Field]) -> Result<ResultSet> {
        let statement = self.prepare(sql)?;
        statement.bind(fields)?;
        statement.fetch_all()
    }

    /// Run one parameterized statement that returns no rows.
    pub fn execute(&mut self, sql: &str, fields: &[Field]) -> Result<QueryResult> {
        self.prepare(sql)?.bind_and_execute(fields)
    }

    /// Run one or more `;`-separated statements without parameters, e.g. a
    /// schema.
    pub fn exec(&mut self, sql: &str) -> Result<()> {
        let _logger = QueryLogger::start(sql, &self.log_settings);
        self.handle.exec(sql)
    }

    pub fn begin(&mut self) -> Result<()> {
        self.exec("BEGIN IMMEDIATE TRANSACTION")
    }

    pub fn commit(&mut self) -> Result<()> {
        self.exec("COMMIT TRANSACTION")
    }

    pub fn rollback(&mut self) -> Result<()> {
        self.exec("ROLLBACK TRANSACTION")
    }

    /// Commit if `success`, roll back otherwise.
    pub fn end(&mut self, success: bool) -> Result<()> {
        if success {
            self.commit()
        } else {
            self.rollback()
        }
    }

    /// Begin a transaction that is rolled back unless committed.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Transaction::begin(self)
    }

    pub fn in_transaction(&self) -> bool {
        self.handle.in_transaction()
    }

    /// Rowid of the most recent successful insert; 0 if there was none.
    pub fn last_insert_rowid(&self) -> i64 {
        self.handle.last_insert_rowid()
    }

    /// Rows changed by the most recently completed write.
    pub fn changes(&self) -> u64 {
        self.handle.changes()
    }

    /// Code and message of the most recent engine failure on this connection.
    pub fn last_error(&self) -> SqliteError {
        self.handle.last_error()
    }

    /// Finalize any live statement and close the database.
    pub fn close(self) -> Result<()> {
        let Self {
            mut statement,
            handle,
            path,
            ..
        } = self;

        let finalized = statement.finalize();
        drop(statement);
        handle.close()?;
        tracing::debug!(?path, "closed database");
        finalized
    }

    /// Close the database and delete its file.
    pub fn remove(self) -> Result<()> {
        let path = self.path.clone();
        self.close()?;

        if let Some(path) = path {
            fs::remove_file(&path)?;
            tracing::debug!(?path, "removed database file");
        }
        Ok(())
    }
}

fn check_parameter_names<'a>(mut fields: impl Iterator<Item = &'a Field>) -> Result<()> {
    match fields.find(|f| !is_parameter_name(f.name())) {
        Some(f) => Err(BindError::UnknownParameter(f.bind_name()).into()),
        None => Ok(()),
    }
}
