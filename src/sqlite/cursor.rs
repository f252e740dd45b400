use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use rusqlite::params_from_iter;
use rusqlite::types::Value as SqliteValue;

use super::session::{SharedConnection, with_connection};
use super::types::{describe_column, describe_expression, invalid_locator, is_clob_decltype, to_sqlite_value};
use crate::catalog::ColumnDescriptor;
use crate::driver::NativeCursor;
use crate::error::{DbError, Diagnostic, Result};
use crate::types::{LobData, LobKind, LobLocator, NativeRow, NativeValue, WireValue};

enum Outcome {
    Affected(usize),
    Rows {
        columns: Vec<(String, Option<String>)>,
        rows: Vec<Vec<SqliteValue>>,
    },
}

/// Statement handle over a shared `rusqlite` connection.
///
/// Query results are read completely at execute time and handed out by
/// `fetch`. BLOB values, and TEXT values of columns declared as CLOB, are
/// reported as LOB locators that stay valid until the next execute, or until
/// the first execute after locators stop being held.
pub struct SqliteCursor {
    conn: SharedConnection,
    autocommit: bool,
    rows: VecDeque<NativeRow>,
    description: Option<Vec<ColumnDescriptor>>,
    rowcount: i64,
    lobs: HashMap<u64, LobData>,
    next_locator: u64,
    hold_locators: bool,
    timeout: u32,
    scrollable: bool,
    closed: bool,
}

impl SqliteCursor {
    pub(crate) fn new(conn: SharedConnection, autocommit: bool) -> Self {
        Self {
            conn,
            autocommit,
            rows: VecDeque::new(),
            description: None,
            rowcount: -1,
            lobs: HashMap::new(),
            next_locator: 1,
            hold_locators: false,
            timeout: 0,
            scrollable: false,
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

    fn register_lob(&mut self, kind: LobKind, data: LobData) -> NativeValue {
        let token = self.next_locator;
        self.next_locator += 1;
        self.lobs.insert(token, data);
        NativeValue::Lob(LobLocator::new(token, kind))
    }

    fn to_native(&mut self, value: SqliteValue, clob: bool) -> NativeValue {
        match value {
            SqliteValue::Null => NativeValue::Null,
            SqliteValue::Integer(i) => NativeValue::Int(i),
            SqliteValue::Real(f) => NativeValue::Float(f),
            SqliteValue::Text(s) if clob => self.register_lob(LobKind::Clob, LobData::Text(s)),
            SqliteValue::Text(s) => NativeValue::Text(s),
            SqliteValue::Blob(b) => self.register_lob(LobKind::Blob, LobData::Bytes(b)),
        }
    }

    fn run(&self, statement: &str, params: Vec<SqliteValue>) -> Result<Outcome> {
        let timeout = self.timeout;
        let autocommit = self.autocommit;
        with_connection(&self.conn, |conn| {
            if timeout > 0 {
                conn.busy_timeout(Duration::from_secs(u64::from(timeout)))?;
            }
            if !autocommit && conn.is_autocommit() {
                conn.execute_batch("BEGIN")?;
            }
            let mut stmt = conn.prepare(statement)?;
            if stmt.column_count() == 0 {
                let affected = stmt.execute(params_from_iter(params.iter()))?;
                return Ok(Outcome::Affected(affected));
            }
            let columns: Vec<(String, Option<String>)> = stmt
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), c.decl_type().map(str::to_string)))
                .collect();
            let mut rows = Vec::new();
            let mut result = stmt.query(params_from_iter(params.iter()))?;
            while let Some(row) = result.next()? {
                let mut values = Vec::with_capacity(columns.len());
                for idx in 0..columns.len() {
                    values.push(row.get::<_, SqliteValue>(idx)?);
                }
                rows.push(values);
            }
            Ok(Outcome::Rows { columns, rows })
        })
    }
}

impl NativeCursor for SqliteCursor {
    fn execute(&mut self, statement: &str, params: &[WireValue]) -> Result<Option<i64>> {
        self.ensure_open()?;
        let params = params
            .iter()
            .map(|p| to_sqlite_value(p, &self.lobs))
            .collect::<Result<Vec<_>>>()?;
        self.rows.clear();
        self.description = None;
        if !self.hold_locators {
            self.lobs.clear();
        }
        self.rowcount = -1;

        match self.run(statement, params)? {
            Outcome::Affected(affected) => {
                self.rowcount = i64::try_from(affected).unwrap_or(i64::MAX);
                Ok(Some(self.rowcount))
            }
            Outcome::Rows { columns, rows } => {
                let description: Vec<ColumnDescriptor> = columns
                    .iter()
                    .enumerate()
                    .map(|(idx, (name, decl))| match decl {
                        Some(decl) => describe_column(name, decl),
                        None => describe_expression(name, rows.first().and_then(|r| r.get(idx))),
                    })
                    .collect();
                let clob: Vec<bool> = columns
                    .iter()
                    .map(|(_, decl)| decl.as_deref().is_some_and(is_clob_decltype))
                    .collect();
                for row in rows {
                    let native: NativeRow = row
                        .into_iter()
                        .zip(&clob)
                        .map(|(value, is_clob)| self.to_native(value, *is_clob))
                        .collect();
                    self.rows.push_back(native);
                }
                self.description = Some(description);
                if self.scrollable {
                    self.rowcount = i64::try_from(self.rows.len()).unwrap_or(i64::MAX);
                    Ok(Some(self.rowcount))
                } else {
                    Ok(None)
                }
            }
        }
    }

    fn callproc(&mut self, _name: &str, _params: &[WireValue]) -> Result<Vec<NativeValue>> {
        Err(DbError::NotSupported("SQLite has no stored procedures".to_string()))
    }

    fn fetch(&mut self, count: usize) -> Result<Vec<NativeRow>> {
        self.ensure_open()?;
        if self.description.is_none() {
            return Err(DbError::Programming(
                Diagnostic::new("no result set is open").with_sqlstate("24000"),
            ));
        }
        let count = count.min(self.rows.len());
        Ok(self.rows.drain(..count).collect())
    }

    fn description(&self) -> Option<Vec<ColumnDescriptor>> {
        self.description.clone()
    }

    fn read_lob(&mut self, locator: &LobLocator) -> Result<LobData> {
        self.ensure_open()?;
        self.lobs
            .get(&locator.token)
            .cloned()
            .ok_or_else(|| invalid_locator(locator.token))
    }

    fn hold_locators(&mut self, hold: bool) {
        self.hold_locators = hold;
    }

    fn rowcount(&self) -> i64 {
        self.rowcount
    }

    fn timeout(&self) -> u32 {
        self.timeout
    }

    fn set_timeout(&mut self, seconds: u32) -> Result<()> {
        self.timeout = seconds;
        Ok(())
    }

    fn scrollable(&self) -> bool {
        self.scrollable
    }

    fn set_scrollable(&mut self, scrollable: bool) {
        self.scrollable = scrollable;
    }

    fn skip(&mut self, count: usize) -> Result<Option<usize>> {
        self.ensure_open()?;
        if self.description.is_none() {
            return Ok(None);
        }
        let count = count.min(self.rows.len());
        self.rows.drain(..count);
        Ok(Some(count))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.rows.clear();
        self.lobs.clear();
        self.description = None;
        Ok(())
    }
}
