//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{ConnectOptions, ConnectType};
pub use crate::connection::Connection;
pub use crate::cursor::{Cursor, DictCursor, ScrollMode};
pub use crate::driver::{NativeCursor, NativeDriver, NativeSession};
pub use crate::error::{DbError, ErrorKind, Result};
pub use crate::params;
pub use crate::params::Param;
pub use crate::results::{DictRow, Row};
pub use crate::types::{LobLocator, TypedLiteral, Value};
pub use crate::{connect, type_name};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteCursor, SqliteDriver, SqliteSession};
