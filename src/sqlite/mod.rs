// SQLite module - reference native driver built on rusqlite
//
// This module is split into several sub-modules:
// - session: connecting, transactions and the shared connection handle
// - cursor: statement execution and row/LOB bookkeeping
// - types: declared type, parameter and error conversion

pub mod cursor;
pub mod session;
pub mod types;

// Re-export the public API
pub use cursor::SqliteCursor;
pub use session::{SqliteDriver, SqliteSession};
