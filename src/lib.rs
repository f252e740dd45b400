//! Database API layer over a native driver: typed parameter binding, result
//! projection, multi-result-set buffering and dictionary rows.
//!
//! The native driver is reached through the traits in [`driver`]. A driver
//! backed by `rusqlite` ships behind the `sqlite` feature.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod connection;
pub mod cursor;
pub mod driver;
pub mod error;
pub mod params;
pub mod prelude;
pub mod results;
pub mod types;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use catalog::{ColumnDescriptor, NamedColumnDescriptor, type_catalog, type_code, type_name};
pub use config::{ConnectOptions, ConnectOptionsBuilder, ConnectType};
pub use connection::Connection;
pub use cursor::{Cursor, CursorState, DictCursor, ScrollMode};
pub use driver::{NativeCursor, NativeDriver, NativeSession, ServerInfo};
pub use error::{DbError, Diagnostic, ErrorKind, Result};
pub use params::Param;
pub use results::{DictRow, Row};
pub use types::{
    LobKind, LobLocator, TypedLiteral, Value, binary, date, date_from_ticks, time, time_from_ticks, timestamp,
    timestamp_from_ticks, timestamp_micros,
};

/// Supported API level.
pub const API_LEVEL: &str = "2.0";
/// Connections may be shared between threads, cursors may not.
pub const THREAD_SAFETY: u8 = 2;
/// Parameter markers are question marks.
pub const PARAM_STYLE: &str = "qmark";

/// Open a connection through `driver`.
///
/// # Errors
///
/// Propagates the driver's connection error.
pub fn connect<D: NativeDriver>(driver: &D, options: &ConnectOptions) -> Result<Connection<D::Session>> {
    Connection::open(driver, options)
}
