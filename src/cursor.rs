//! The cursor: statement execution, fetching and multi-result-set handling.

pub mod dict;
pub mod scroll;

pub use dict::DictCursor;
pub use scroll::{FETCH_ABSOLUTE, FETCH_FIRST, FETCH_LAST, FETCH_NEXT, FETCH_PRIOR, FETCH_RELATIVE, ScrollMode};

use tracing::{debug, trace, warn};

use crate::catalog::{self, ColumnDescriptor, NamedColumnDescriptor};
use crate::codec;
use crate::driver::NativeCursor;
use crate::error::{DbError, Result};
use crate::params::{self, Param};
use crate::results::{BufferState, ResultSet, ResultSetBuffer, Row, project_row, project_rows};
use crate::types::{LobLocator, Value};

/// Default number of rows returned by `fetchmany` without an explicit size.
pub const DEFAULT_ARRAYSIZE: usize = 10;

/// Where a cursor stands relative to its current result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// No result set to read from
    Idle,
    /// Rows may be fetched
    HasResult,
    /// A fetch came back short or empty
    Exhausted,
}

/// Whether `executemany` should capture each execution's rows. The check is a
/// case-insensitive substring search, so `select` inside a literal or comment
/// also counts.
#[must_use]
pub fn is_select_statement(statement: &str) -> bool {
    statement.to_lowercase().contains("select")
}

/// A cursor over a native statement handle.
///
/// A cursor must not be shared between threads; the connection that created it
/// may be.
pub struct Cursor<C: NativeCursor> {
    native: C,
    arraysize: usize,
    auto_lob_read: bool,
    buffer: ResultSetBuffer,
    position: usize,
    state: CursorState,
    closed: bool,
}

impl<C: NativeCursor> Cursor<C> {
    /// Wrap a native statement handle.
    #[must_use]
    pub fn new(native: C) -> Self {
        Self {
            native,
            arraysize: DEFAULT_ARRAYSIZE,
            auto_lob_read: true,
            buffer: ResultSetBuffer::new(),
            position: 0,
            state: CursorState::Idle,
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(DbError::Interface("cursor is closed".to_string()))
        } else {
            Ok(())
        }
    }

    /// Rows returned by `fetchmany` when no size is given.
    #[must_use]
    pub fn arraysize(&self) -> usize {
        self.arraysize
    }

    /// Set the default `fetchmany` size
    ///
    /// # Arguments
    ///
    /// * `arraysize` - Rows per `fetchmany` call, at least 1
    ///
    /// # Errors
    ///
    /// Returns `DbError::Validation` for a size of zero.
    pub fn set_arraysize(&mut self, arraysize: usize) -> Result<()> {
        if arraysize == 0 {
            return Err(DbError::Validation("arraysize must be at least 1".to_string()));
        }
        self.arraysize = arraysize;
        Ok(())
    }

    /// Whether LOB columns are read inline while fetching. On by default.
    #[must_use]
    pub fn auto_lob_read(&self) -> bool {
        self.auto_lob_read
    }

    /// When disabled, LOB columns come back as `TypedLiteral::LobRef` and can be
    /// read later with [`read_lob`](Self::read_lob).
    pub fn set_auto_lob_read(&mut self, auto_lob_read: bool) {
        self.auto_lob_read = auto_lob_read;
    }

    /// Where the cursor stands relative to its current result.
    #[must_use]
    pub fn state(&self) -> CursorState {
        self.state
    }

    /// State of the result-set buffer filled by `executemany` and `callproc`.
    #[must_use]
    pub fn buffer_state(&self) -> BufferState {
        self.buffer.state()
    }

    /// Rows read or skipped in the current result set.
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Rows affected by the last DML statement, or rows in the result of a
    /// scrollable SELECT. `-1` when the driver does not know.
    #[must_use]
    pub fn rowcount(&self) -> i64 {
        self.native.rowcount()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Column descriptors of the current result set
    ///
    /// # Returns
    ///
    /// While buffered results are being read, the descriptors of the buffered
    /// set at the head; otherwise the driver's. `None` when no result set is
    /// open or the buffer is used up.
    #[must_use]
    pub fn description(&self) -> Option<Vec<ColumnDescriptor>> {
        if self.buffer.is_engaged() {
            self.buffer.head_description().map(<[ColumnDescriptor]>::to_vec)
        } else {
            self.native.description()
        }
    }

    /// Column descriptors with type codes resolved to names. Recomputed on
    /// every call from [`description`](Self::description).
    #[must_use]
    pub fn description2(&self) -> Option<Vec<NamedColumnDescriptor>> {
        self.description().map(|desc| catalog::augment(&desc))
    }

    fn reset_for_execution(&mut self) {
        self.buffer.reset();
        self.position = 0;
        self.state = CursorState::Idle;
    }

    fn settle_after_execution(&mut self) {
        self.state = if self.buffer.is_engaged() || self.native.description().is_some() {
            CursorState::HasResult
        } else {
            CursorState::Idle
        };
    }

    /// Execute a statement with positional parameters
    ///
    /// # Arguments
    ///
    /// * `statement` - SQL text with `?` placeholders
    /// * `args` - One argument per placeholder; a single sequence argument is
    ///   spread over the placeholders
    ///
    /// # Returns
    ///
    /// The driver's row count when it reports one
    ///
    /// # Errors
    ///
    /// Propagates driver errors unchanged (arity, type, truncation, syntax).
    pub fn execute(&mut self, statement: &str, args: &[Param]) -> Result<Option<i64>> {
        self.ensure_open()?;
        self.execute_once(statement, args)
    }

    fn execute_once(&mut self, statement: &str, args: &[Param]) -> Result<Option<i64>> {
        let wire = params::bind(args)?;
        debug!(statement, params = wire.len(), "execute");
        self.reset_for_execution();
        let count = self.native.execute(statement, &wire)?;
        self.settle_after_execution();
        Ok(count)
    }

    /// Execute `statement` once per parameter row. For SELECT statements every
    /// non-empty result is buffered, to be read back with the fetch methods
    /// and [`nextset`](Self::nextset). LOB locators in buffered rows stay
    /// readable until the next execution.
    ///
    /// # Arguments
    ///
    /// * `statement` - SQL text with `?` placeholders
    /// * `rows` - One parameter row per execution
    ///
    /// # Errors
    ///
    /// Stops at and returns the first driver error.
    pub fn executemany<I>(&mut self, statement: &str, rows: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Param>,
    {
        self.ensure_open()?;
        let outcome = self.run_batch(statement, rows);
        self.native.hold_locators(false);
        let captured = outcome?;
        self.reset_for_execution();
        for set in captured {
            self.buffer.push(set)?;
        }
        self.settle_after_execution();
        Ok(())
    }

    /// Call a stored procedure and return its echoed parameters, with OUT and
    /// INOUT positions updated by the procedure. Result sets the procedure
    /// opened are buffered for the fetch methods.
    ///
    /// # Errors
    ///
    /// Propagates driver errors unchanged.
    pub fn callproc(&mut self, name: &str, args: &[Param]) -> Result<Vec<Value>> {
        self.ensure_open()?;
        let wire = params::bind(args)?;
        debug!(procedure = name, params = wire.len(), "callproc");
        self.reset_for_execution();
        let echoed = self.native.callproc(name, &wire)?;
        let echoed = project_row(&mut self.native, echoed, self.auto_lob_read)?;
        if self.native.description().is_some() {
            self.buffer_procedure_results()?;
        }
        self.settle_after_execution();
        Ok(echoed)
    }

    fn run_batch<I>(&mut self, statement: &str, rows: I) -> Result<Vec<ResultSet>>
    where
        I: IntoIterator,
        I::Item: Into<Param>,
    {
        let capture = is_select_statement(statement);
        let mut captured = Vec::new();
        let mut executions = 0usize;
        for row in rows {
            let arg = row.into();
            self.execute_once(statement, std::slice::from_ref(&arg))?;
            // The first execution released the previous statement's locators
            self.native.hold_locators(true);
            executions += 1;
            if capture {
                let description = self.native.description();
                let rows = self.fetchall()?;
                if !rows.is_empty() {
                    captured.push(ResultSet::from(rows).with_description(description));
                }
            }
        }
        debug!(statement, executions, buffered = captured.len(), "executemany");
        Ok(captured)
    }

    fn drain_native(&mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        loop {
            let batch = self.native.fetch(self.arraysize)?;
            if batch.is_empty() {
                return Ok(rows);
            }
            rows.extend(project_rows(&mut self.native, batch, self.auto_lob_read)?);
        }
    }

    fn buffer_procedure_results(&mut self) -> Result<()> {
        let mut sets = Vec::new();
        loop {
            let description = self.native.description();
            sets.push(ResultSet::from(self.drain_native()?).with_description(description));
            match self.native.nextset() {
                Ok(true) => {}
                Ok(false) | Err(DbError::NotSupported(_)) => break,
                Err(e) => return Err(e),
            }
        }
        for set in sets {
            self.buffer.push(set)?;
        }
        Ok(())
    }

    fn record_read(&mut self, requested: usize, returned: usize) {
        self.position += returned;
        if returned < requested {
            self.state = CursorState::Exhausted;
        }
        trace!(requested, returned, position = self.position, "fetch");
    }

    /// Next row, or `None` once the result set is exhausted. Reading past the
    /// end keeps returning `None`.
    ///
    /// # Errors
    ///
    /// Propagates driver errors, e.g. fetching when no statement produced rows.
    pub fn fetchone(&mut self) -> Result<Option<Row>> {
        self.ensure_open()?;
        let row = if self.buffer.is_engaged() {
            self.buffer.fetch_one()
        } else {
            match self.native.fetch(1)?.into_iter().next() {
                Some(raw) => Some(project_row(&mut self.native, raw, self.auto_lob_read)?),
                None => None,
            }
        };
        self.record_read(1, usize::from(row.is_some()));
        Ok(row)
    }

    /// Up to `size` rows (default [`arraysize`](Self::arraysize)). Fewer rows
    /// than requested means the set is exhausted; a size of zero returns
    /// nothing.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub fn fetchmany(&mut self, size: Option<usize>) -> Result<Vec<Row>> {
        self.ensure_open()?;
        let size = size.unwrap_or(self.arraysize);
        if size == 0 {
            return Ok(Vec::new());
        }
        let rows = if self.buffer.is_engaged() {
            self.buffer.fetch_many(size)
        } else {
            let batch = self.native.fetch(size)?;
            project_rows(&mut self.native, batch, self.auto_lob_read)?
        };
        self.record_read(size, rows.len());
        Ok(rows)
    }

    /// Every remaining row of the current set; empty when nothing is left.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub fn fetchall(&mut self) -> Result<Vec<Row>> {
        self.ensure_open()?;
        let rows = if self.buffer.is_engaged() {
            self.buffer.fetch_all()
        } else {
            self.drain_native()?
        };
        self.record_read(usize::MAX, rows.len());
        Ok(rows)
    }

    /// Move to the next result set.
    ///
    /// Buffered results are served first; once the buffer is used up this
    /// returns `false` for the rest of the execution. Without buffered results
    /// the driver's own `nextset` is used.
    ///
    /// # Errors
    ///
    /// Returns `DbError::NotSupported` when the driver cannot advance result
    /// sets, and propagates other driver errors.
    pub fn nextset(&mut self) -> Result<bool> {
        self.ensure_open()?;
        let more = match self.buffer.state() {
            BufferState::Empty => self.native.nextset()?,
            BufferState::Retired => false,
            BufferState::Populated | BufferState::Draining => self.buffer.advance(),
        };
        self.position = 0;
        self.state = if more { CursorState::HasResult } else { CursorState::Exhausted };
        Ok(more)
    }

    /// Read a LOB that was returned as a locator while
    /// [`auto_lob_read`](Self::auto_lob_read) was off.
    ///
    /// # Errors
    ///
    /// Propagates the driver's error when the locator is no longer valid.
    pub fn read_lob(&mut self, locator: &LobLocator) -> Result<Value> {
        self.ensure_open()?;
        let data = self.native.read_lob(locator)?;
        Ok(codec::decode_lob(locator.kind, data))
    }

    /// Query timeout in seconds, `0` meaning none.
    #[must_use]
    pub fn timeout(&self) -> u32 {
        self.native.timeout()
    }

    /// Set the query timeout
    ///
    /// # Arguments
    ///
    /// * `seconds` - Timeout for later statements, `0` for none
    ///
    /// # Errors
    ///
    /// Propagates the driver's error.
    pub fn set_timeout(&mut self, seconds: u32) -> Result<()> {
        self.ensure_open()?;
        self.native.set_timeout(seconds)
    }

    /// Whether SELECTs run with a scrollable cursor, which makes `rowcount`
    /// report the result size.
    #[must_use]
    pub fn scrollable(&self) -> bool {
        self.native.scrollable()
    }

    /// Applies to the next execute.
    pub fn set_scrollable(&mut self, scrollable: bool) {
        self.native.set_scrollable(scrollable);
    }

    /// Discard up to `count` rows of the current set. `None` when no result set
    /// is open.
    ///
    /// # Errors
    ///
    /// Propagates driver errors.
    pub fn skip(&mut self, count: usize) -> Result<Option<usize>> {
        self.ensure_open()?;
        let skipped = if self.buffer.is_engaged() {
            Some(self.buffer.skip(count))
        } else {
            self.native.skip(count)?
        };
        if let Some(n) = skipped {
            self.record_read(count, n);
        }
        Ok(skipped)
    }

    /// Accepted for API compatibility; sizes are not used.
    pub fn setinputsizes(&mut self, _sizes: &[usize]) {}

    /// Accepted for API compatibility; sizes are not used.
    pub fn setoutputsize(&mut self, _size: usize, _column: Option<usize>) {}

    /// Release the cursor. Calling this again is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the driver's error from the first close.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.buffer.reset();
        self.state = CursorState::Idle;
        self.native.close()
    }
}

impl<C: NativeCursor> Drop for Cursor<C> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close cursor on drop");
        }
    }
}
