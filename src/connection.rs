use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::config::ConnectOptions;
use crate::cursor::{Cursor, DictCursor};
use crate::driver::{NativeCursor, NativeDriver, NativeSession, ServerInfo};
use crate::error::{DbError, Result};

/// An open session with the database.
///
/// Connections may be shared between threads (wrap them in an `Arc`); commit,
/// rollback and close take `&self`. Cursors never end transactions themselves.
pub struct Connection<S: NativeSession> {
    session: Arc<S>,
    closed: AtomicBool,
    default_timeout: u32,
}

impl<S: NativeSession> Connection<S> {
    /// Connect through `driver`.
    ///
    /// # Errors
    ///
    /// Propagates the driver's connection error.
    pub fn open<D>(driver: &D, options: &ConnectOptions) -> Result<Self>
    where
        D: NativeDriver<Session = S>,
    {
        debug!(dsn = %options.dsn, autocommit = options.autocommit, "connect");
        let session = driver.connect(options)?;
        Ok(Self::from_session(session, options.timeout))
    }

    /// Wrap an already established session.
    #[must_use]
    pub fn from_session(session: S, default_timeout: u32) -> Self {
        Self {
            session: Arc::new(session),
            closed: AtomicBool::new(false),
            default_timeout,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(DbError::Interface("connection is closed".to_string()))
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// # Errors
    ///
    /// Returns `DbError::Interface` on a closed connection and propagates
    /// driver errors.
    pub fn cursor(&self) -> Result<Cursor<S::Cursor>> {
        self.ensure_open()?;
        let mut native = self.session.cursor()?;
        if self.default_timeout > 0 {
            native.set_timeout(self.default_timeout)?;
        }
        Ok(Cursor::new(native))
    }

    /// Cursor whose fetches return rows keyed by column name.
    ///
    /// # Errors
    ///
    /// Same as [`cursor`](Self::cursor).
    pub fn dict_cursor(&self) -> Result<DictCursor<S::Cursor>> {
        self.cursor().map(DictCursor::new)
    }

    /// # Errors
    ///
    /// Returns `DbError::Interface` on a closed connection and propagates
    /// driver errors.
    pub fn commit(&self) -> Result<()> {
        self.ensure_open()?;
        self.session.commit()
    }

    /// # Errors
    ///
    /// Returns `DbError::Interface` on a closed connection and propagates
    /// driver errors.
    pub fn rollback(&self) -> Result<()> {
        self.ensure_open()?;
        self.session.rollback()
    }

    /// Close the session. Only the first call reaches the driver.
    ///
    /// # Errors
    ///
    /// Propagates the driver's error from that first call.
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        debug!("close connection");
        self.session.close()
    }

    #[must_use]
    pub fn server_info(&self) -> ServerInfo {
        self.session.server_info()
    }
}

impl<S: NativeSession> Drop for Connection<S> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close connection on drop");
        }
    }
}
