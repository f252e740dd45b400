use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Serialize, Serializer};

use crate::error::{DbError, Result};

/// Logical kind of a large object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LobKind {
    /// Binary large object
    Blob,
    /// Character large object
    Clob,
}

impl LobKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LobKind::Blob => "blob",
            LobKind::Clob => "clob",
        }
    }

    /// Parse the kind tag a driver reports next to a locator.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blob" => Some(LobKind::Blob),
            "clob" => Some(LobKind::Clob),
            _ => None,
        }
    }
}

/// Driver-issued handle to a large object that has not been read yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LobLocator {
    pub token: u64,
    pub kind: LobKind,
}

impl LobLocator {
    #[must_use]
    pub fn new(token: u64, kind: LobKind) -> Self {
        Self { token, kind }
    }
}

/// Content of a large object as returned by the driver's LOB read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobData {
    Bytes(Vec<u8>),
    Text(String),
}

/// Domain literals that need a wire rendering before they reach the driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum TypedLiteral {
    #[serde(serialize_with = "serialize_hex")]
    Binary(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    LobRef(LobLocator),
}

/// Tag of a [`TypedLiteral`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Binary,
    Date,
    Time,
    Timestamp,
    LobRef,
}

impl TypedLiteral {
    #[must_use]
    pub fn kind(&self) -> LiteralKind {
        match self {
            TypedLiteral::Binary(_) => LiteralKind::Binary,
            TypedLiteral::Date(_) => LiteralKind::Date,
            TypedLiteral::Time(_) => LiteralKind::Time,
            TypedLiteral::Timestamp(_) => LiteralKind::Timestamp,
            TypedLiteral::LobRef(_) => LiteralKind::LobRef,
        }
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

/// Values exchanged with callers, both as parameters and as row contents.
///
/// ```rust
/// use dbapi_cursor::prelude::*;
///
/// let params = vec![Value::from(1), Value::from("a"), Value::Null];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text value, also used for materialized CLOBs
    Text(String),
    /// Binary, date/time or LOB reference
    Literal(TypedLiteral),
}

impl Value {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        if let Value::Int(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let Value::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Value::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_binary(&self) -> Option<&[u8]> {
        if let Value::Literal(TypedLiteral::Binary(bytes)) = self {
            Some(bytes)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_lob(&self) -> Option<&LobLocator> {
        if let Value::Literal(TypedLiteral::LobRef(locator)) = self {
            Some(locator)
        } else {
            None
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<TypedLiteral> for Value {
    fn from(value: TypedLiteral) -> Self {
        Value::Literal(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Parameter representation handed to the native driver.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    /// Binary data as lowercase hex text, for the driver to convert for
    /// binary targets
    Binary(String),
    /// LOB locator passed back to the driver that issued it
    Locator(LobLocator),
}

/// Column value as reported by the native driver, before projection.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    /// Inline binary data
    Bytes(Vec<u8>),
    /// Placeholder for a LOB that still lives on the server
    Lob(LobLocator),
}

/// Row as reported by the native driver.
pub type NativeRow = Vec<NativeValue>;

#[must_use]
pub fn binary(bytes: impl Into<Vec<u8>>) -> TypedLiteral {
    TypedLiteral::Binary(bytes.into())
}

/// # Errors
///
/// Returns `DbError::Validation` when the components do not form a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> Result<TypedLiteral> {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(TypedLiteral::Date)
        .ok_or_else(|| DbError::Validation(format!("invalid date {year:04}-{month:02}-{day:02}")))
}

/// # Errors
///
/// Returns `DbError::Validation` when the components are out of range.
pub fn time(hour: u32, minute: u32, second: u32) -> Result<TypedLiteral> {
    NaiveTime::from_hms_opt(hour, minute, second)
        .map(TypedLiteral::Time)
        .ok_or_else(|| DbError::Validation(format!("invalid time {hour:02}:{minute:02}:{second:02}")))
}

/// # Errors
///
/// Returns `DbError::Validation` when the components are out of range.
pub fn timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<TypedLiteral> {
    timestamp_micros(year, month, day, hour, minute, second, 0)
}

/// Same as [`timestamp`] with a microsecond component.
///
/// # Errors
///
/// Returns `DbError::Validation` when the components are out of range.
pub fn timestamp_micros(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    micros: u32,
) -> Result<TypedLiteral> {
    let date = NaiveDate::from_ymd_opt(year, month, day);
    let time = NaiveTime::from_hms_micro_opt(hour, minute, second, micros);
    match (date, time) {
        (Some(d), Some(t)) => Ok(TypedLiteral::Timestamp(NaiveDateTime::new(d, t))),
        _ => Err(DbError::Validation(format!(
            "invalid timestamp {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micros:06}"
        ))),
    }
}

fn local_from_ticks(ticks: Option<i64>) -> Result<NaiveDateTime> {
    let secs = ticks.unwrap_or_else(|| Local::now().timestamp());
    Local
        .timestamp_opt(secs, 0)
        .single()
        .map(|dt| dt.naive_local())
        .ok_or_else(|| DbError::Validation(format!("ticks {secs} out of range")))
}

/// Date of the given epoch seconds in local time; `None` means now.
///
/// # Errors
///
/// Returns `DbError::Validation` when `ticks` is not representable.
pub fn date_from_ticks(ticks: Option<i64>) -> Result<TypedLiteral> {
    Ok(TypedLiteral::Date(local_from_ticks(ticks)?.date()))
}

/// Time of day of the given epoch seconds in local time; `None` means now.
///
/// # Errors
///
/// Returns `DbError::Validation` when `ticks` is not representable.
pub fn time_from_ticks(ticks: Option<i64>) -> Result<TypedLiteral> {
    Ok(TypedLiteral::Time(local_from_ticks(ticks)?.time()))
}

/// Local timestamp of the given epoch seconds; `None` means now.
///
/// # Errors
///
/// Returns `DbError::Validation` when `ticks` is not representable.
pub fn timestamp_from_ticks(ticks: Option<i64>) -> Result<TypedLiteral> {
    Ok(TypedLiteral::Timestamp(local_from_ticks(ticks)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_reject_out_of_range() {
        assert!(date(2005, 2, 30).is_err());
        assert!(time(24, 0, 0).is_err());
        assert!(timestamp_micros(2005, 3, 9, 8, 24, 59, 1_000_000).is_err());
        assert_eq!(
            date(2005, 3, 3).unwrap(),
            TypedLiteral::Date(NaiveDate::from_ymd_opt(2005, 3, 3).unwrap())
        );
    }

    #[test]
    fn ticks_constructors_agree() {
        let ticks = Some(1_110_356_699);
        let TypedLiteral::Timestamp(ts) = timestamp_from_ticks(ticks).unwrap() else {
            panic!("expected timestamp");
        };
        assert_eq!(date_from_ticks(ticks).unwrap(), TypedLiteral::Date(ts.date()));
        assert_eq!(time_from_ticks(ticks).unwrap(), TypedLiteral::Time(ts.time()));
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
    }

    #[test]
    fn binary_serializes_as_hex() {
        let json = serde_json::to_value(Value::from(binary(vec![0xae, 0x01]))).unwrap();
        assert_eq!(json, serde_json::json!("ae01"));
    }
}
