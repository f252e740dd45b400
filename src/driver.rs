//! Capabilities a native driver must provide.
//!
//! Cursors and connections only ever talk to the driver through these traits.
//! Optional capabilities have default implementations that report
//! `DbError::NotSupported`.

use crate::catalog::ColumnDescriptor;
use crate::config::ConnectOptions;
use crate::error::{DbError, Result};
use crate::types::{LobData, LobLocator, NativeRow, NativeValue, WireValue};

/// Entry point of a native driver.
pub trait NativeDriver {
    type Session: NativeSession;

    /// Open a session.
    ///
    /// # Errors
    ///
    /// Returns the driver's error when the session cannot be established.
    fn connect(&self, options: &ConnectOptions) -> Result<Self::Session>;
}

/// Descriptive information about the server behind a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerInfo {
    pub dbms_name: String,
    pub dbms_version: String,
    pub driver_name: String,
    pub driver_version: String,
    pub server_name: String,
}

/// A live driver session. Sessions may be shared between threads.
pub trait NativeSession: Send + Sync {
    type Cursor: NativeCursor;

    /// # Errors
    ///
    /// Returns the driver's error when no statement handle can be allocated.
    fn cursor(&self) -> Result<Self::Cursor>;

    /// # Errors
    ///
    /// Returns the driver's error when the transaction cannot be committed.
    fn commit(&self) -> Result<()>;

    /// # Errors
    ///
    /// Returns the driver's error when the transaction cannot be rolled back.
    fn rollback(&self) -> Result<()>;

    /// Release the session. Must tolerate being called more than once.
    ///
    /// # Errors
    ///
    /// Returns the driver's error when disconnecting fails.
    fn close(&self) -> Result<()>;

    fn server_info(&self) -> ServerInfo {
        ServerInfo::default()
    }
}

/// A driver statement handle.
pub trait NativeCursor {
    /// Run a statement. Returns the affected row count when the driver knows it.
    ///
    /// # Errors
    ///
    /// Returns the driver's error for syntax, arity, type or truncation problems.
    fn execute(&mut self, statement: &str, params: &[WireValue]) -> Result<Option<i64>>;

    /// Call a stored procedure, returning the echoed IN/OUT/INOUT parameters.
    ///
    /// # Errors
    ///
    /// Returns the driver's error, or `NotSupported` when the driver has no
    /// procedure support.
    fn callproc(&mut self, name: &str, params: &[WireValue]) -> Result<Vec<NativeValue>> {
        let _ = (name, params);
        Err(DbError::NotSupported("callproc".to_string()))
    }

    /// Fetch up to `count` rows of the current result set. An empty vector
    /// means the set is exhausted.
    ///
    /// # Errors
    ///
    /// Returns the driver's error, typically a programming error when no
    /// result set is open.
    fn fetch(&mut self, count: usize) -> Result<Vec<NativeRow>>;

    /// Advance to the next result set of a multi-result operation.
    ///
    /// # Errors
    ///
    /// Returns `NotSupported` unless the driver implements it.
    fn nextset(&mut self) -> Result<bool> {
        Err(DbError::NotSupported("nextset".to_string()))
    }

    /// Column descriptors of the current result set, `None` when no result set
    /// is open.
    fn description(&self) -> Option<Vec<ColumnDescriptor>>;

    /// Materialize a LOB the driver handed out as a locator.
    ///
    /// # Errors
    ///
    /// Returns the driver's error when the locator is no longer valid.
    fn read_lob(&mut self, locator: &LobLocator) -> Result<LobData>;

    /// While `hold` is set, LOB locators issued by earlier executions stay
    /// valid across further executes. Cursors hold locators for the length of
    /// an `executemany` so that every buffered set can still be read with
    /// `read_lob`. Drivers whose locators already outlive an execute can
    /// ignore this.
    fn hold_locators(&mut self, hold: bool) {
        let _ = hold;
    }

    /// Rows affected by the last statement, `-1` when unknown.
    fn rowcount(&self) -> i64 {
        -1
    }

    /// Query timeout in seconds, `0` meaning none.
    fn timeout(&self) -> u32;

    /// # Errors
    ///
    /// Returns the driver's error when the timeout cannot be applied.
    fn set_timeout(&mut self, seconds: u32) -> Result<()>;

    fn scrollable(&self) -> bool;

    /// Takes effect on the next execute.
    fn set_scrollable(&mut self, scrollable: bool);

    /// Discard up to `count` rows. Returns how many were skipped, or `None` when
    /// no result set is open.
    ///
    /// # Errors
    ///
    /// Returns the driver's error when fetching fails.
    fn skip(&mut self, count: usize) -> Result<Option<usize>>;

    /// Release the statement handle. Must tolerate being called more than once.
    ///
    /// # Errors
    ///
    /// Returns the driver's error when freeing the handle fails.
    fn close(&mut self) -> Result<()>;
}
