use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use super::cursor::SqliteCursor;
use crate::config::ConnectOptions;
use crate::driver::{NativeDriver, NativeSession, ServerInfo};
use crate::error::{DbError, Result};

pub(crate) type SharedConnection = Arc<Mutex<Option<rusqlite::Connection>>>;

fn lock(conn: &SharedConnection) -> MutexGuard<'_, Option<rusqlite::Connection>> {
    match conn.lock() {
        Ok(guard) => guard,
        // Clear the poison and continue with the recovered data
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Run `f` against the open connection.
pub(crate) fn with_connection<T>(
    conn: &SharedConnection,
    f: impl FnOnce(&rusqlite::Connection) -> Result<T>,
) -> Result<T> {
    let guard = lock(conn);
    match guard.as_ref() {
        Some(c) => f(c),
        None => Err(DbError::Interface("connection is closed".to_string())),
    }
}

/// Native driver backed by `rusqlite`. The DSN is a database path or
/// `:memory:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDriver;

impl NativeDriver for SqliteDriver {
    type Session = SqliteSession;

    fn connect(&self, options: &ConnectOptions) -> Result<SqliteSession> {
        let conn = rusqlite::Connection::open(&options.dsn)?;
        Ok(SqliteSession::new(conn, &options.dsn, options.autocommit))
    }
}

/// A `rusqlite` connection shared by the cursors created from it.
///
/// Without autocommit a transaction is opened before the first statement and
/// stays open until commit or rollback.
pub struct SqliteSession {
    conn: SharedConnection,
    dsn: String,
    autocommit: bool,
}

impl SqliteSession {
    #[must_use]
    pub fn new(conn: rusqlite::Connection, dsn: &str, autocommit: bool) -> Self {
        Self {
            conn: Arc::new(Mutex::new(Some(conn))),
            dsn: dsn.to_string(),
            autocommit,
        }
    }

    fn end_transaction(&self, sql: &str) -> Result<()> {
        with_connection(&self.conn, |c| {
            if !c.is_autocommit() {
                debug!(sql, "end transaction");
                c.execute_batch(sql)?;
            }
            Ok(())
        })
    }
}

impl NativeSession for SqliteSession {
    type Cursor = SqliteCursor;

    fn cursor(&self) -> Result<SqliteCursor> {
        with_connection(&self.conn, |_| Ok(()))?;
        Ok(SqliteCursor::new(Arc::clone(&self.conn), self.autocommit))
    }

    fn commit(&self) -> Result<()> {
        self.end_transaction("COMMIT")
    }

    fn rollback(&self) -> Result<()> {
        self.end_transaction("ROLLBACK")
    }

    fn close(&self) -> Result<()> {
        let conn = lock(&self.conn).take();
        match conn {
            Some(c) => c.close().map_err(|(_, err)| DbError::from(err)),
            None => Ok(()),
        }
    }

    fn server_info(&self) -> ServerInfo {
        ServerInfo {
            dbms_name: "SQLite".to_string(),
            dbms_version: rusqlite::version().to_string(),
            driver_name: "rusqlite".to_string(),
            driver_version: env!("CARGO_PKG_VERSION").to_string(),
            server_name: self.dsn.clone(),
        }
    }
}
