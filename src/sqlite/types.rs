use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use rusqlite::ErrorCode;
use rusqlite::types::Value as SqliteValue;

use crate::catalog::{self, ColumnDescriptor};
use crate::error::{DbError, Diagnostic, Result};
use crate::types::{LobData, WireValue};

/// `NAME`, `NAME(n)` or `NAME(p, s)`
static DECLTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z0-9_ ]*?)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?\s*$")
        .expect("declared type pattern is valid")
});

const DEFAULT_LOB_SIZE: i32 = 1_048_576;

fn code_for_base(base: &str) -> i16 {
    if let Some(code) = catalog::type_code(base) {
        return code;
    }
    match base {
        "INT" | "MEDIUMINT" => catalog::SQL_INTEGER,
        "TINYINT" | "BOOLEAN" => catalog::SQL_SMALLINT,
        "CHARACTER" => catalog::SQL_CHAR,
        "CHARACTER VARYING" | "NVARCHAR" | "TEXT" => catalog::SQL_VARCHAR,
        "DATETIME" => catalog::SQL_TYPE_TIMESTAMP,
        // SQLite type affinity rules
        b if b.contains("INT") => catalog::SQL_BIGINT,
        b if b.contains("CHAR") || b.contains("TEXT") => catalog::SQL_VARCHAR,
        b if b.contains("CLOB") => catalog::SQL_CLOB,
        b if b.contains("BLOB") => catalog::SQL_BLOB,
        b if b.contains("REAL") || b.contains("FLOA") || b.contains("DOUB") => catalog::SQL_DOUBLE,
        _ => catalog::SQL_NUMERIC,
    }
}

/// Descriptor for a column of the given declared type.
#[must_use]
pub fn describe_column(name: &str, decltype: &str) -> ColumnDescriptor {
    let Some(caps) = DECLTYPE.captures(decltype) else {
        return ColumnDescriptor::new(name, catalog::SQL_VARCHAR);
    };
    let base = caps[1].to_ascii_uppercase();
    let size = caps.get(2).and_then(|m| m.as_str().parse::<i32>().ok());
    let scale = caps.get(3).and_then(|m| m.as_str().parse::<i32>().ok());
    let code = code_for_base(&base);
    let desc = ColumnDescriptor::new(name, code);
    match code {
        catalog::SQL_SMALLINT => desc.with_sizes(6, 2).with_precision(5, 0),
        catalog::SQL_INTEGER => desc.with_sizes(11, 4).with_precision(10, 0),
        catalog::SQL_BIGINT => desc.with_sizes(20, 8).with_precision(19, 0),
        catalog::SQL_REAL => desc.with_sizes(14, 4).with_precision(7, 0),
        catalog::SQL_DOUBLE | catalog::SQL_FLOAT => desc.with_sizes(24, 8).with_precision(15, 0),
        catalog::SQL_TYPE_DATE => desc.with_sizes(10, 6).with_precision(10, 0),
        catalog::SQL_TYPE_TIME => desc.with_sizes(8, 6).with_precision(8, 0),
        catalog::SQL_TYPE_TIMESTAMP => desc.with_sizes(26, 16).with_precision(26, 6),
        catalog::SQL_DECIMAL | catalog::SQL_NUMERIC => {
            let precision = size.unwrap_or(5);
            let scale = scale.unwrap_or(0);
            desc.with_sizes(precision.saturating_add(2), precision / 2 + 1)
                .with_precision(precision, scale)
        }
        catalog::SQL_BLOB | catalog::SQL_CLOB => {
            let size = size.unwrap_or(DEFAULT_LOB_SIZE);
            desc.with_sizes(size, size).with_precision(size, 0)
        }
        _ => {
            let size = size.unwrap_or(255);
            desc.with_sizes(size, size).with_precision(size, 0)
        }
    }
}

/// Descriptor for an expression column, typed after the first value seen.
#[must_use]
pub fn describe_expression(name: &str, sample: Option<&SqliteValue>) -> ColumnDescriptor {
    let decltype = match sample {
        Some(SqliteValue::Integer(_)) => "BIGINT",
        Some(SqliteValue::Real(_)) => "DOUBLE",
        Some(SqliteValue::Blob(_)) => "BLOB",
        Some(SqliteValue::Text(_) | SqliteValue::Null) | None => "VARCHAR",
    };
    describe_column(name, decltype)
}

/// Columns declared as CLOB report their text through LOB locators.
#[must_use]
pub fn is_clob_decltype(decltype: &str) -> bool {
    decltype.to_ascii_uppercase().contains("CLOB")
}

/// Convert a wire parameter, resolving LOB locators against the LOBs the
/// cursor still holds. Binary hex text becomes a BLOB.
///
/// # Errors
///
/// Returns a programming error for locators this cursor did not issue, and a
/// data error for malformed binary text.
pub fn to_sqlite_value(value: &WireValue, lobs: &HashMap<u64, LobData>) -> Result<SqliteValue> {
    Ok(match value {
        WireValue::Null => SqliteValue::Null,
        WireValue::Int(i) => SqliteValue::Integer(*i),
        WireValue::Float(f) => SqliteValue::Real(*f),
        WireValue::Text(s) => SqliteValue::Text(s.clone()),
        WireValue::Binary(text) => SqliteValue::Blob(hex::decode(text).map_err(|e| {
            DbError::Data(Diagnostic::new(format!("invalid binary parameter {text:?}: {e}")))
        })?),
        WireValue::Locator(locator) => match lobs.get(&locator.token) {
            Some(LobData::Bytes(bytes)) => SqliteValue::Blob(bytes.clone()),
            Some(LobData::Text(text)) => SqliteValue::Text(text.clone()),
            None => return Err(invalid_locator(locator.token)),
        },
    })
}

pub(crate) fn invalid_locator(token: u64) -> DbError {
    DbError::Programming(Diagnostic::new(format!("invalid LOB locator {token}")).with_sqlstate("0F001"))
}

// Convert rusqlite::Error into DbError.
impl From<rusqlite::Error> for DbError {
    fn from(err: rusqlite::Error) -> Self {
        let diag = Diagnostic::new(err.to_string());
        match &err {
            rusqlite::Error::SqliteFailure(ffi_err, _) => {
                let diag = diag.with_native_code(ffi_err.extended_code);
                match ffi_err.code {
                    ErrorCode::ConstraintViolation => DbError::Integrity(diag.with_sqlstate("23000")),
                    ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::DiskFull
                    | ErrorCode::NotADatabase
                    | ErrorCode::DatabaseCorrupt
                    | ErrorCode::FileLockingProtocolFailed
                    | ErrorCode::OperationInterrupted => DbError::Operational(diag),
                    ErrorCode::TypeMismatch | ErrorCode::TooBig | ErrorCode::ParameterOutOfRange => {
                        DbError::Data(diag)
                    }
                    ErrorCode::InternalMalfunction | ErrorCode::OutOfMemory => DbError::Internal(diag),
                    ErrorCode::ApiMisuse => DbError::Programming(diag.with_sqlstate("HY010")),
                    _ => DbError::Programming(diag),
                }
            }
            rusqlite::Error::InvalidParameterCount(..) => DbError::Programming(diag.with_sqlstate("07001")),
            rusqlite::Error::InvalidColumnType(..)
            | rusqlite::Error::IntegralValueOutOfRange(..)
            | rusqlite::Error::FromSqlConversionFailure(..)
            | rusqlite::Error::ToSqlConversionFailure(..)
            | rusqlite::Error::Utf8Error(..) => DbError::Data(diag),
            rusqlite::Error::MultipleStatement => DbError::Programming(diag),
            _ => DbError::Database(diag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LobKind, LobLocator};

    #[test]
    fn declared_types_map_to_catalog_codes() {
        let c = describe_column("C2", "VARCHAR(3)");
        assert_eq!(c.type_code, catalog::SQL_VARCHAR);
        assert_eq!(c.internal_size, Some(3));
        let c = describe_column("C1", "INTEGER");
        assert_eq!((c.type_code, c.display_size, c.precision), (catalog::SQL_INTEGER, Some(11), Some(10)));
        let d = describe_column("P", "decimal(9, 2)");
        assert_eq!((d.type_code, d.precision, d.scale), (catalog::SQL_DECIMAL, Some(9), Some(2)));
        assert_eq!(describe_column("B", "BLOB(1024)").internal_size, Some(1024));
        assert_eq!(describe_column("X", "UNSIGNED BIG INT").type_code, catalog::SQL_BIGINT);
        assert_eq!(describe_column("Y", "").type_code, catalog::SQL_VARCHAR);
    }

    #[test]
    fn huge_declared_precision_saturates() {
        let d = describe_column("P", "DECIMAL(2147483647)");
        assert_eq!(d.display_size, Some(i32::MAX));
        assert_eq!(d.precision, Some(i32::MAX));
    }

    #[test]
    fn expression_columns_follow_sample() {
        assert_eq!(describe_expression("N", Some(&SqliteValue::Integer(1))).type_code, catalog::SQL_BIGINT);
        assert_eq!(describe_expression("N", None).type_code, catalog::SQL_VARCHAR);
    }

    #[test]
    fn locators_resolve_against_current_lobs() {
        let mut lobs = HashMap::new();
        lobs.insert(1, LobData::Bytes(vec![1, 2]));
        let ok = to_sqlite_value(&WireValue::Locator(LobLocator::new(1, LobKind::Blob)), &lobs).unwrap();
        assert_eq!(ok, SqliteValue::Blob(vec![1, 2]));
        let err = to_sqlite_value(&WireValue::Locator(LobLocator::new(2, LobKind::Blob)), &lobs).unwrap_err();
        assert_eq!(err.sqlstate(), Some("0F001"));
    }

    #[test]
    fn binary_parameters_become_blobs() {
        let lobs = HashMap::new();
        let blob = to_sqlite_value(&WireValue::Binary("cafe".into()), &lobs).unwrap();
        assert_eq!(blob, SqliteValue::Blob(vec![0xca, 0xfe]));
        let err = to_sqlite_value(&WireValue::Binary("xyz".into()), &lobs).unwrap_err();
        assert!(matches!(err, DbError::Data(_)));
    }

    #[test]
    fn parameter_count_is_a_programming_error() {
        let err = DbError::from(rusqlite::Error::InvalidParameterCount(1, 2));
        assert_eq!(err.sqlstate(), Some("07001"));
        assert!(matches!(err, DbError::Programming(_)));
    }
}
