#![allow(dead_code)]

//! Scripted in-memory driver for exercising procedures, multiple result sets
//! and LOB locators, which SQLite cannot produce.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use dbapi_cursor::catalog::ColumnDescriptor;
use dbapi_cursor::driver::{NativeCursor, NativeDriver, NativeSession, ServerInfo};
use dbapi_cursor::types::{LobData, LobLocator, NativeRow, NativeValue, WireValue};
use dbapi_cursor::{ConnectOptions, Connection, DbError, Diagnostic, Result};

/// One result set the fake driver hands out.
#[derive(Debug, Clone, Default)]
pub struct FakeSet {
    pub description: Vec<ColumnDescriptor>,
    pub rows: Vec<NativeRow>,
}

impl FakeSet {
    pub fn new(columns: &[(&str, i16)], rows: Vec<NativeRow>) -> Self {
        let description = columns
            .iter()
            .map(|(name, code)| ColumnDescriptor::new(*name, *code))
            .collect();
        Self { description, rows }
    }
}

type StatementHandler = Arc<dyn Fn(&[WireValue]) -> Result<Vec<FakeSet>> + Send + Sync>;
type ProcedureHandler = Arc<dyn Fn(&[WireValue]) -> Result<(Vec<NativeValue>, Vec<FakeSet>)> + Send + Sync>;

/// How often each driver entry point was reached.
#[derive(Debug, Default)]
pub struct Counters {
    pub executes: AtomicUsize,
    pub fetches: AtomicUsize,
    pub nextsets: AtomicUsize,
    pub lob_reads: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub session_closes: AtomicUsize,
    pub cursor_closes: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Default)]
pub struct FakeDriver {
    statements: HashMap<String, StatementHandler>,
    procedures: HashMap<String, ProcedureHandler>,
    lobs: HashMap<u64, LobData>,
    pub counters: Arc<Counters>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statement<F>(mut self, sql: &str, handler: F) -> Self
    where
        F: Fn(&[WireValue]) -> Result<Vec<FakeSet>> + Send + Sync + 'static,
    {
        self.statements.insert(sql.to_string(), Arc::new(handler));
        self
    }

    /// Statement that always yields the same result sets.
    pub fn query(self, sql: &str, sets: Vec<FakeSet>) -> Self {
        self.statement(sql, move |_| Ok(sets.clone()))
    }

    pub fn procedure<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&[WireValue]) -> Result<(Vec<NativeValue>, Vec<FakeSet>)> + Send + Sync + 'static,
    {
        self.procedures.insert(name.to_string(), Arc::new(handler));
        self
    }

    pub fn lob(mut self, token: u64, data: LobData) -> Self {
        self.lobs.insert(token, data);
        self
    }

    pub fn connection(&self) -> Connection<FakeSession> {
        Connection::open(self, &ConnectOptions::new("fake")).expect("fake connect")
    }
}

impl NativeDriver for FakeDriver {
    type Session = FakeSession;

    fn connect(&self, _options: &ConnectOptions) -> Result<FakeSession> {
        Ok(FakeSession {
            driver: self.clone(),
            closed: AtomicBool::new(false),
        })
    }
}

pub struct FakeSession {
    driver: FakeDriver,
    closed: AtomicBool,
}

impl NativeSession for FakeSession {
    type Cursor = FakeCursor;

    fn cursor(&self) -> Result<FakeCursor> {
        Ok(FakeCursor {
            driver: self.driver.clone(),
            current: None,
            pending: VecDeque::new(),
            rowcount: -1,
            timeout: 0,
            scrollable: false,
        })
    }

    fn commit(&self) -> Result<()> {
        self.driver.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        self.driver.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) -> Result<()> {
        if !self.closed.swap(true, Ordering::SeqCst) {
            self.driver.counters.session_closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn server_info(&self) -> ServerInfo {
        ServerInfo {
            dbms_name: "FAKE".to_string(),
            ..ServerInfo::default()
        }
    }
}

struct OpenSet {
    description: Vec<ColumnDescriptor>,
    rows: VecDeque<NativeRow>,
}

impl From<FakeSet> for OpenSet {
    fn from(set: FakeSet) -> Self {
        Self {
            description: set.description,
            rows: set.rows.into(),
        }
    }
}

pub struct FakeCursor {
    driver: FakeDriver,
    current: Option<OpenSet>,
    pending: VecDeque<FakeSet>,
    rowcount: i64,
    timeout: u32,
    scrollable: bool,
}

impl FakeCursor {
    fn open(&mut self, sets: Vec<FakeSet>) {
        self.pending = sets.into();
        self.current = self.pending.pop_front().map(OpenSet::from);
        self.rowcount = match &self.current {
            Some(set) if self.scrollable => set.rows.len() as i64,
            _ => -1,
        };
    }

    fn no_result_set() -> DbError {
        DbError::Programming(Diagnostic::new("no result set is open").with_sqlstate("24000"))
    }
}

impl NativeCursor for FakeCursor {
    fn execute(&mut self, statement: &str, params: &[WireValue]) -> Result<Option<i64>> {
        self.driver.counters.executes.fetch_add(1, Ordering::SeqCst);
        let handler = self.driver.statements.get(statement).cloned().ok_or_else(|| {
            DbError::from_sqlstate("42601", Some(-104), format!("unexpected statement {statement}"))
        })?;
        let sets = handler(params)?;
        if sets.is_empty() {
            self.open(sets);
            self.rowcount = 1;
            return Ok(Some(1));
        }
        self.open(sets);
        Ok(self.scrollable.then_some(self.rowcount))
    }

    fn callproc(&mut self, name: &str, params: &[WireValue]) -> Result<Vec<NativeValue>> {
        self.driver.counters.executes.fetch_add(1, Ordering::SeqCst);
        let handler = self
            .driver
            .procedures
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::from_sqlstate("42884", Some(-440), format!("no procedure {name}")))?;
        let (echoed, sets) = handler(params)?;
        self.open(sets);
        Ok(echoed)
    }

    fn fetch(&mut self, count: usize) -> Result<Vec<NativeRow>> {
        self.driver.counters.fetches.fetch_add(1, Ordering::SeqCst);
        let set = self.current.as_mut().ok_or_else(Self::no_result_set)?;
        let count = count.min(set.rows.len());
        Ok(set.rows.drain(..count).collect())
    }

    fn nextset(&mut self) -> Result<bool> {
        self.driver.counters.nextsets.fetch_add(1, Ordering::SeqCst);
        self.current = self.pending.pop_front().map(OpenSet::from);
        Ok(self.current.is_some())
    }

    fn description(&self) -> Option<Vec<ColumnDescriptor>> {
        self.current.as_ref().map(|set| set.description.clone())
    }

    fn read_lob(&mut self, locator: &LobLocator) -> Result<LobData> {
        self.driver.counters.lob_reads.fetch_add(1, Ordering::SeqCst);
        self.driver.lobs.get(&locator.token).cloned().ok_or_else(|| {
            DbError::Programming(Diagnostic::new("invalid LOB locator").with_sqlstate("0F001"))
        })
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
        let Some(set) = self.current.as_mut() else {
            return Ok(None);
        };
        let count = count.min(set.rows.len());
        set.rows.drain(..count);
        Ok(Some(count))
    }

    fn close(&mut self) -> Result<()> {
        self.driver.counters.cursor_closes.fetch_add(1, Ordering::SeqCst);
        self.current = None;
        self.pending.clear();
        Ok(())
    }
}
