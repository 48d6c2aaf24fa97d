use std::fmt::{self, Display, Formatter};
use std::mem;
use std::os::raw::c_char;
use std::ptr::{self, NonNull};

use crate::{
    Error, Field, FieldValue, QueryResult, ResultSet, Result, Row,
    error::BindError,
    logger::{LogSettings, QueryLogger},
    sqlite::{connection::ConnectionHandle, ffi},
};

mod handle;

pub(crate) use handle::StatementHandle;

/// Where a [`Statement`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    /// No statement has been prepared yet.
    Idle,
    /// Compiled, no parameters bound.
    Prepared,
    /// Parameters bound, not yet stepped.
    Bound,
    /// At least one row has been produced and more may follow.
    Stepping,
    /// The native handle has been released.
    Finalized,
}

impl Display for StatementState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            StatementState::Idle => "idle",
            StatementState::Prepared => "prepared",
            StatementState::Bound => "bound",
            StatementState::Stepping => "stepping",
            StatementState::Finalized => "finalized",
        })
    }
}

// The live states own the native handle, so a handle can only exist while the
// statement is in one of them.
#[derive(Debug)]
enum Slot {
    Idle,
    Prepared(StatementHandle),
    Bound(StatementHandle),
    Stepping(StatementHandle),
    Finalized,
}

impl Slot {
    fn state(&self) -> StatementState {
        match self {
            Slot::Idle => StatementState::Idle,
            Slot::Prepared(_) => StatementState::Prepared,
            Slot::Bound(_) => StatementState::Bound,
            Slot::Stepping(_) => StatementState::Stepping,
            Slot::Finalized => StatementState::Finalized,
        }
    }

    fn handle(&self) -> Option<&StatementHandle> {
        match self {
            Slot::Prepared(h) | Slot::Bound(h) | Slot::Stepping(h) => Some(h),
            Slot::Idle | Slot::Finalized => None,
        }
    }
}

/// The single prepared-statement slot of a [`Connection`](crate::Connection).
///
/// Drives one statement through prepare, bind, step and finalize. Operations
/// called out of order fail with [`Error::InvalidState`]; any live native
/// handle is released when the statement is dropped.
#[derive(Debug)]
pub struct Statement {
    slot: Slot,
    sql: Option<String>,
    logger: Option<QueryLogger>,
    log_settings: LogSettings,
}

impl Statement {
    pub(crate) fn new(log_settings: LogSettings) -> Self {
        Self {
            slot: Slot::Idle,
            sql: None,
            logger: None,
            log_settings,
        }
    }

    pub fn state(&self) -> StatementState {
        self.slot.state()
    }

    /// SQL text of the current (or most recently finalized) statement.
    pub fn sql(&self) -> Option<&str> {
        self.sql.as_deref()
    }

    /// Number of result columns; 0 when no handle is live.
    pub fn column_count(&self) -> usize {
        self.slot.handle().map_or(0, StatementHandle::column_count)
    }

    pub fn column_names(&self) -> Vec<String> {
        match self.slot.handle() {
            Some(handle) => (0..handle.column_count())
                .map(|i| handle.column_name(i))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Number of SQL parameters; 0 when no handle is live.
    pub fn parameter_count(&self) -> usize {
        self.slot
            .handle()
            .map_or(0, StatementHandle::bind_parameter_count)
    }

    fn take_slot(&mut self) -> Slot {
        mem::replace(&mut self.slot, Slot::Idle)
    }

    fn refuse<T>(&mut self, operation: &'static str, slot: Slot) -> Result<T> {
        let state = slot.state();
        self.slot = slot;
        Err(Error::InvalidState { operation, state })
    }

    /// Compile `sql`, moving the slot to [`StatementState::Prepared`].
    pub(crate) fn prepare(&mut self, conn: &ConnectionHandle, sql: &str) -> Result<()> {
        let state = self.state();
        if !matches!(state, StatementState::Idle | StatementState::Finalized) {
            return Err(Error::InvalidState {
                operation: "prepare",
                state,
            });
        }

        self.slot = Slot::Idle;
        self.sql = None;
        self.logger = None;

        let handle = prepare_handle(conn, sql)?;
        self.sql = Some(sql.to_owned());
        self.logger = QueryLogger::start(sql, &self.log_settings);
        self.slot = Slot::Prepared(handle);
        Ok(())
    }

    /// Attach each field to the parameter named by its bind name.
    ///
    /// On failure the statement is finalized.
    pub fn bind(&mut self, fields: &[Field]) -> Result<()> {
        let mut handle = match self.take_slot() {
            Slot::Prepared(h) => h,
            other => return self.refuse("bind", other),
        };

        match bind_fields(&mut handle, fields) {
            Ok(()) => {
                self.slot = Slot::Bound(handle);
                Ok(())
            }
            Err(e) => self.finish(handle, Err(e)),
        }
    }

    /// Step once and finalize. Completion and a produced row both count as
    /// success.
    pub fn execute(&mut self) -> Result<QueryResult> {
        let mut handle = match self.take_slot() {
            Slot::Prepared(h) | Slot::Bound(h) => h,
            other => return self.refuse("execute", other),
        };

        let outcome = match handle.step() {
            Ok(_) => {
                let result = QueryResult {
                    changes: handle.changes(),
                    last_insert_rowid: handle.last_insert_rowid(),
                };
                if let Some(logger) = &mut self.logger {
                    logger.inc_rows_affected(result.changes);
                }
                Ok(result)
            }
            Err(e) => Err(Error::Step(e)),
        };

        self.finish(handle, outcome)
    }

    /// [`bind`](Self::bind) followed by [`execute`](Self::execute). The
    /// statement ends finalized whatever the outcome.
    pub fn bind_and_execute(&mut self, fields: &[Field]) -> Result<QueryResult> {
        self.bind(fields)?;
        self.execute()
    }

    /// Fetch the next row, or `None` once the statement has completed (at
    /// which point it is finalized).
    ///
    /// A statement without result columns is finalized without being stepped.
    pub fn step_row(&mut self) -> Result<Option<Row>> {
        let mut handle = match self.take_slot() {
            Slot::Prepared(h) | Slot::Bound(h) | Slot::Stepping(h) => h,
            other => return self.refuse("step", other),
        };

        if handle.column_count() == 0 {
            return self.finish(handle, Ok(None));
        }

        match handle.step() {
            Ok(true) => match Row::current(&handle) {
                Ok(row) => {
                    if let Some(logger) = &mut self.logger {
                        logger.inc_rows_returned();
                    }
                    self.slot = Slot::Stepping(handle);
                    Ok(Some(row))
                }
                Err(e) => self.finish(handle, Err(e)),
            },
            Ok(false) => self.finish(handle, Ok(None)),
            Err(e) => self.finish(handle, Err(Error::Step(e))),
        }
    }

    /// Step to completion, collecting every row in fetch order.
    pub fn fetch_all(&mut self) -> Result<ResultSet> {
        let mut result = ResultSet::default();
        while let Some(row) = self.step_row()? {
            result.push(row);
        }
        Ok(result)
    }

    /// Release the native handle. A no-op when none is live.
    pub fn finalize(&mut self) -> Result<()> {
        match self.take_slot() {
            Slot::Prepared(h) | Slot::Bound(h) | Slot::Stepping(h) => self.finish(h, Ok(())),
            other => {
                self.slot = other;
                Ok(())
            }
        }
    }

    /// Rewind the statement and clear its bindings so it can be bound and
    /// run again.
    pub fn reset(&mut self) -> Result<()> {
        let mut handle = match self.take_slot() {
            Slot::Prepared(h) | Slot::Bound(h) | Slot::Stepping(h) => h,
            other => return self.refuse("reset", other),
        };

        let reset = handle.reset();
        handle.clear_bindings();
        self.slot = Slot::Prepared(handle);

        // each run is logged separately
        if let Some(sql) = &self.sql {
            self.logger = QueryLogger::start(sql, &self.log_settings);
        }

        reset.map_err(Error::Exhausted)
    }

    // Finalize `handle` and fold the engine's verdict into `outcome`. An
    // earlier failure takes precedence, since sqlite3_finalize repeats it.
    fn finish<T>(&mut self, handle: StatementHandle, outcome: Result<T>) -> Result<T> {
        let finalized = handle.finalize();
        self.slot = Slot::Finalized;
        self.logger = None;

        match (outcome, finalized) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(Error::Exhausted(e)),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(fin)) => {
                tracing::debug!("sqlite3_finalize after failed statement reported: {fin}");
                Err(e)
            }
        }
    }
}

fn prepare_handle(conn: &ConnectionHandle, sql: &str) -> Result<StatementHandle> {
    if sql.contains('\0') {
        return Err(Error::Protocol(format!(
            "SQL contains an interior nul byte: {sql:?}"
        )));
    }

    let n_byte = i32::try_from(sql.len())
        .map_err(|_| Error::Protocol(format!("SQL is too long: {} bytes", sql.len())))?;

    let mut stmt = ptr::null_mut();
    ffi::prepare_v2(
        conn.as_ptr(),
        sql.as_ptr() as *const c_char,
        n_byte,
        &mut stmt,
    )
    .map_err(|source| Error::Prepare {
        sql: sql.to_owned(),
        source,
    })?;

    // a comment or whitespace compiles to nothing
    NonNull::new(stmt)
        .map(StatementHandle::new)
        .ok_or_else(|| Error::Protocol(format!("no SQL statement in {sql:?}")))
}

fn bind_fields(handle: &mut StatementHandle, fields: &[Field]) -> Result<()> {
    for field in fields {
        let name = field.bind_name();
        let index = handle
            .bind_parameter_index(&name)
            .ok_or_else(|| BindError::UnknownParameter(name.clone()))?;

        let bound = match field.value() {
            FieldValue::Null => handle.bind_null(index),
            FieldValue::Integer(v) => handle.bind_int64(index, *v),
            FieldValue::Float(v) => handle.bind_double(index, *v),
            FieldValue::Text(v) => handle.bind_text(index, v),
            FieldValue::Blob(v) => handle.bind_blob(index, v),
        };

        bound.map_err(|source| BindError::Engine { name, source })?;
    }

    Ok(())
}
