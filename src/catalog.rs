//! Native type codes and column descriptors.
//!
//! The catalog is built once on first use and never mutated afterwards.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde::Serialize;

// DB2 CLI type codes.
pub const SQL_BIGINT: i16 = -5;
pub const SQL_BINARY: i16 = -2;
pub const SQL_BLOB: i16 = -98;
pub const SQL_BLOB_LOCATOR: i16 = 31;
pub const SQL_CHAR: i16 = 1;
pub const SQL_CLOB: i16 = -99;
pub const SQL_CLOB_LOCATOR: i16 = 41;
pub const SQL_TYPE_DATE: i16 = 91;
pub const SQL_DBCLOB: i16 = -350;
pub const SQL_DBCLOB_LOCATOR: i16 = -351;
pub const SQL_DECIMAL: i16 = 3;
pub const SQL_DOUBLE: i16 = 8;
pub const SQL_FLOAT: i16 = 6;
pub const SQL_GRAPHIC: i16 = -95;
pub const SQL_INTEGER: i16 = 4;
pub const SQL_LONGVARCHAR: i16 = -1;
pub const SQL_LONGVARBINARY: i16 = -4;
pub const SQL_LONGVARGRAPHIC: i16 = -97;
pub const SQL_NUMERIC: i16 = 2;
pub const SQL_REAL: i16 = 7;
pub const SQL_SMALLINT: i16 = 5;
pub const SQL_TYPE_TIME: i16 = 92;
pub const SQL_TYPE_TIMESTAMP: i16 = 93;
pub const SQL_VARCHAR: i16 = 12;
pub const SQL_VARBINARY: i16 = -3;
pub const SQL_VARGRAPHIC: i16 = -96;
pub const SQL_DATALINK: i16 = -400;

const TYPE_NAMES: &[(i16, &str)] = &[
    (SQL_BIGINT, "BIGINT"),
    (SQL_BINARY, "BINARY"),
    (SQL_BLOB, "BLOB"),
    (SQL_BLOB_LOCATOR, "BLOB_LOCATOR"),
    (SQL_CHAR, "CHAR"),
    (SQL_CLOB, "CLOB"),
    (SQL_CLOB_LOCATOR, "CLOB_LOCATOR"),
    (SQL_TYPE_DATE, "DATE"),
    (SQL_DBCLOB, "DBCLOB"),
    (SQL_DBCLOB_LOCATOR, "DBCLOB_LOCATOR"),
    (SQL_DECIMAL, "DECIMAL"),
    (SQL_DOUBLE, "DOUBLE"),
    (SQL_FLOAT, "FLOAT"),
    (SQL_GRAPHIC, "GRAPHIC"),
    (SQL_INTEGER, "INTEGER"),
    (SQL_LONGVARCHAR, "LONGVARCHAR"),
    (SQL_LONGVARBINARY, "LONGVARBINARY"),
    (SQL_LONGVARGRAPHIC, "LONGVARGRAPHIC"),
    (SQL_NUMERIC, "NUMERIC"),
    (SQL_REAL, "REAL"),
    (SQL_SMALLINT, "SMALLINT"),
    (SQL_TYPE_TIME, "TIME"),
    (SQL_TYPE_TIMESTAMP, "TIMESTAMP"),
    (SQL_VARCHAR, "VARCHAR"),
    (SQL_VARBINARY, "VARBINARY"),
    (SQL_VARGRAPHIC, "VARGRAPHIC"),
    (SQL_DATALINK, "DATALINK"),
];

static TYPE_CATALOG: LazyLock<BTreeMap<i16, &'static str>> =
    LazyLock::new(|| TYPE_NAMES.iter().copied().collect());

/// The fixed type code to name mapping.
#[must_use]
pub fn type_catalog() -> &'static BTreeMap<i16, &'static str> {
    &TYPE_CATALOG
}

/// Human readable name for a type code, `?(<code>)` when the code is unknown.
#[must_use]
pub fn type_name(code: i16) -> Cow<'static, str> {
    match TYPE_CATALOG.get(&code) {
        Some(name) => Cow::Borrowed(*name),
        None => Cow::Owned(format!("?({code})")),
    }
}

/// Reverse lookup, used by drivers that only know declared type names.
#[must_use]
pub fn type_code(name: &str) -> Option<i16> {
    TYPE_NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(code, _)| *code)
}

/// One column of a result description.
///
/// `T` is the numeric type code in the raw form reported by the driver and the
/// resolved type name in the form returned by `Cursor::description2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor<T = i16> {
    pub name: String,
    pub type_code: T,
    pub display_size: Option<i32>,
    pub internal_size: Option<i32>,
    pub precision: Option<i32>,
    pub scale: Option<i32>,
    pub nullable: Option<bool>,
}

/// Descriptor with the type code replaced by its catalog name.
pub type NamedColumnDescriptor = ColumnDescriptor<Cow<'static, str>>;

impl ColumnDescriptor<i16> {
    #[must_use]
    pub fn new(name: impl Into<String>, type_code: i16) -> Self {
        Self {
            name: name.into(),
            type_code,
            display_size: None,
            internal_size: None,
            precision: None,
            scale: None,
            nullable: None,
        }
    }

    #[must_use]
    pub fn with_sizes(mut self, display_size: i32, internal_size: i32) -> Self {
        self.display_size = Some(display_size);
        self.internal_size = Some(internal_size);
        self
    }

    #[must_use]
    pub fn with_precision(mut self, precision: i32, scale: i32) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    #[must_use]
    pub fn named(&self) -> NamedColumnDescriptor {
        ColumnDescriptor {
            name: self.name.clone(),
            type_code: type_name(self.type_code),
            display_size: self.display_size,
            internal_size: self.internal_size,
            precision: self.precision,
            scale: self.scale,
            nullable: self.nullable,
        }
    }
}

/// Resolve every type code of a raw description, keeping order and length.
#[must_use]
pub fn augment(description: &[ColumnDescriptor]) -> Vec<NamedColumnDescriptor> {
    description.iter().map(ColumnDescriptor::named).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_codes() {
        assert_eq!(type_name(SQL_INTEGER), "INTEGER");
        assert_eq!(type_name(SQL_TYPE_TIMESTAMP), "TIMESTAMP");
        assert_eq!(type_name(1234), "?(1234)");
        assert_eq!(type_catalog().len(), TYPE_NAMES.len());
        assert_eq!(type_code("varchar"), Some(SQL_VARCHAR));
        assert_eq!(type_code("JSON"), None);
    }

    #[test]
    fn augment_keeps_shape() {
        let raw = vec![
            ColumnDescriptor::new("C1", SQL_INTEGER).with_sizes(11, 4).with_precision(10, 0),
            ColumnDescriptor::new("C2", 777).with_nullable(true),
        ];
        let named = augment(&raw);
        assert_eq!(named.len(), raw.len());
        assert_eq!(named[0].name, "C1");
        assert_eq!(named[0].type_code, "INTEGER");
        assert_eq!(named[0].precision, Some(10));
        assert_eq!(named[1].type_code, "?(777)");
        assert_eq!(named[1].nullable, Some(true));
    }
}
