use std::fmt;

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DbError>;

/// Diagnostic record attached to errors raised by a native driver.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostic {
    /// Five character SQLSTATE, when the driver reports one
    pub sqlstate: Option<String>,
    /// Driver specific error code
    pub native_code: Option<i32>,
    /// Driver message text
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sqlstate: None,
            native_code: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_sqlstate(mut self, sqlstate: impl Into<String>) -> Self {
        self.sqlstate = Some(sqlstate.into());
        self
    }

    #[must_use]
    pub fn with_native_code(mut self, code: i32) -> Self {
        self.native_code = Some(code);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(state) = &self.sqlstate {
            write!(f, "[{state}] ")?;
        }
        f.write_str(&self.message)?;
        if let Some(code) = self.native_code {
            write!(f, " (code {code})")?;
        }
        Ok(())
    }
}

/// Errors surfaced by cursors and connections.
///
/// Every variant except `Interface`, `Validation` and `NotSupported` carries the
/// diagnostic of the native driver unchanged.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Interface error: {0}")]
    Interface(String),

    #[error("Database error: {0}")]
    Database(Diagnostic),

    #[error("Data error: {0}")]
    Data(Diagnostic),

    #[error("Operational error: {0}")]
    Operational(Diagnostic),

    #[error("Integrity error: {0}")]
    Integrity(Diagnostic),

    #[error("Internal error: {0}")]
    Internal(Diagnostic),

    #[error("Programming error: {0}")]
    Programming(Diagnostic),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Invalid value: {0}")]
    Validation(String),
}

/// Flat classification of [`DbError`], following the DB-API exception names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InterfaceError,
    DatabaseError,
    DataError,
    OperationalError,
    IntegrityError,
    InternalError,
    ProgrammingError,
    NotSupportedError,
    ValueError,
}

const DATA_ERROR_STATES: &[&str] = &[
    "07006", // invalid conversion
];

const OPERATIONAL_ERROR_STATES: &[&str] = &[
    "25000", "25501", // invalid transaction state
    "40003", "08S01", // communication link failure
    "40001", // rolled back on deadlock or timeout
    "57011", // transaction log full
];

const PROGRAMMING_ERROR_STATES: &[&str] = &[
    "HY010", // function sequence error
    "07001", // wrong number of parameters
    "22007", // invalid datetime format
    "22001", // string data right truncation
    "24000", // invalid cursor state
    "01504", // statement modifies an entire table
];

impl ErrorKind {
    /// Classify a SQLSTATE the way the DB2 CLI layer does. Unknown states map to
    /// the generic `DatabaseError`.
    #[must_use]
    pub fn from_sqlstate(sqlstate: &str) -> Self {
        if DATA_ERROR_STATES.contains(&sqlstate) {
            ErrorKind::DataError
        } else if OPERATIONAL_ERROR_STATES.contains(&sqlstate) {
            ErrorKind::OperationalError
        } else if PROGRAMMING_ERROR_STATES.contains(&sqlstate) {
            ErrorKind::ProgrammingError
        } else {
            ErrorKind::DatabaseError
        }
    }
}

impl DbError {
    /// Build an error from a native diagnostic record, choosing the variant from
    /// its SQLSTATE.
    #[must_use]
    pub fn from_sqlstate(sqlstate: &str, native_code: Option<i32>, message: impl Into<String>) -> Self {
        let mut diag = Diagnostic::new(message).with_sqlstate(sqlstate);
        diag.native_code = native_code;
        match ErrorKind::from_sqlstate(sqlstate) {
            ErrorKind::DataError => DbError::Data(diag),
            ErrorKind::OperationalError => DbError::Operational(diag),
            ErrorKind::ProgrammingError => DbError::Programming(diag),
            _ => DbError::Database(diag),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Interface(_) => ErrorKind::InterfaceError,
            DbError::Database(_) => ErrorKind::DatabaseError,
            DbError::Data(_) => ErrorKind::DataError,
            DbError::Operational(_) => ErrorKind::OperationalError,
            DbError::Integrity(_) => ErrorKind::IntegrityError,
            DbError::Internal(_) => ErrorKind::InternalError,
            DbError::Programming(_) => ErrorKind::ProgrammingError,
            DbError::NotSupported(_) => ErrorKind::NotSupportedError,
            DbError::Validation(_) => ErrorKind::ValueError,
        }
    }

    /// True for every member of the `DatabaseError` family.
    #[must_use]
    pub fn is_database_error(&self) -> bool {
        !matches!(self, DbError::Interface(_) | DbError::Validation(_))
    }

    /// Driver diagnostic, when the error came from the native layer.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            DbError::Database(d)
            | DbError::Data(d)
            | DbError::Operational(d)
            | DbError::Integrity(d)
            | DbError::Internal(d)
            | DbError::Programming(d) => Some(d),
            _ => None,
        }
    }

    #[must_use]
    pub fn sqlstate(&self) -> Option<&str> {
        self.diagnostic().and_then(|d| d.sqlstate.as_deref())
    }
}
