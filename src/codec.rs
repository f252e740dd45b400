//! Conversion between caller values and the driver's wire representation.
//!
//! Wire formats:
//!
//! | literal     | wire text                     |
//! |-------------|-------------------------------|
//! | `Binary`    | lowercase hex (`WireValue::Binary`) |
//! | `Date`      | `YYYY-MM-DD`                  |
//! | `Time`      | `HH:MM:SS`                    |
//! | `Timestamp` | `YYYY-MM-DD HH:MM:SS.ffffff`  |
//!
//! Timestamps always carry six fractional digits; sub-microsecond precision is
//! truncated.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{DbError, Diagnostic, Result};
use crate::types::{LiteralKind, LobData, LobKind, TypedLiteral, Value, WireValue};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

impl TypedLiteral {
    /// Render the literal in the form the native driver accepts.
    #[must_use]
    pub fn to_wire_value(&self) -> WireValue {
        match self {
            TypedLiteral::Binary(bytes) => WireValue::Binary(hex::encode(bytes)),
            TypedLiteral::Date(d) => WireValue::Text(d.format(DATE_FORMAT).to_string()),
            TypedLiteral::Time(t) => WireValue::Text(t.format(TIME_FORMAT).to_string()),
            TypedLiteral::Timestamp(ts) => WireValue::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
            TypedLiteral::LobRef(locator) => WireValue::Locator(locator.clone()),
        }
    }

    /// Parse the canonical wire text of a literal kind.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Data` when `text` is not in the canonical form, and
    /// `DbError::NotSupported` for LOB references, which have no text form.
    pub fn from_wire_text(kind: LiteralKind, text: &str) -> Result<Self> {
        let bad = |e: &dyn std::fmt::Display| {
            DbError::Data(Diagnostic::new(format!("cannot decode {kind:?} from {text:?}: {e}")))
        };
        match kind {
            LiteralKind::Binary => hex::decode(text).map(TypedLiteral::Binary).map_err(|e| bad(&e)),
            LiteralKind::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .map(TypedLiteral::Date)
                .map_err(|e| bad(&e)),
            LiteralKind::Time => NaiveTime::parse_from_str(text, TIME_FORMAT)
                .map(TypedLiteral::Time)
                .map_err(|e| bad(&e)),
            LiteralKind::Timestamp => {
                // chrono accepts any fraction width for %.6f when parsing
                if text.len() != 26 {
                    return Err(bad(&"expected 26 characters"));
                }
                NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
                    .map(TypedLiteral::Timestamp)
                    .map_err(|e| bad(&e))
            }
            LiteralKind::LobRef => Err(DbError::NotSupported(
                "LOB references have no wire text".to_string(),
            )),
        }
    }
}

/// Encode a caller value for the driver. Plain scalars pass through.
#[must_use]
pub fn encode(value: &Value) -> WireValue {
    match value {
        Value::Null => WireValue::Null,
        Value::Int(i) => WireValue::Int(*i),
        Value::Float(f) => WireValue::Float(*f),
        Value::Text(s) => WireValue::Text(s.clone()),
        Value::Literal(literal) => literal.to_wire_value(),
    }
}

/// Turn materialized LOB content into a caller value: `Binary` for BLOBs and
/// plain text for CLOBs.
#[must_use]
pub fn decode_lob(kind: LobKind, data: LobData) -> Value {
    match (kind, data) {
        (LobKind::Blob, LobData::Bytes(bytes)) => Value::Literal(TypedLiteral::Binary(bytes)),
        (LobKind::Blob, LobData::Text(text)) => Value::Literal(TypedLiteral::Binary(text.into_bytes())),
        (LobKind::Clob, LobData::Text(text)) => Value::Text(text),
        (LobKind::Clob, LobData::Bytes(bytes)) => Value::Text(String::from_utf8_lossy(&bytes).into_owned()),
    }
}

/// Decode a driver-reported `(kind, payload)` pair. Tags other than `blob` and
/// `clob` leave the payload untouched.
#[must_use]
pub fn decode(tag: &str, payload: LobData) -> Value {
    match LobKind::from_tag(tag) {
        Some(kind) => decode_lob(kind, payload),
        None => match payload {
            LobData::Bytes(bytes) => Value::Literal(TypedLiteral::Binary(bytes)),
            LobData::Text(text) => Value::Text(text),
        },
    }
}
