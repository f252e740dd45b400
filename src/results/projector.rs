use crate::codec;
use crate::driver::NativeCursor;
use crate::error::Result;
use crate::results::row::Row;
use crate::types::{LobData, LobLocator, NativeRow, NativeValue, TypedLiteral, Value};

/// Anything that can resolve a LOB locator.
pub trait LobSource {
    /// # Errors
    ///
    /// Returns the driver's error when the locator cannot be read.
    fn read_lob(&mut self, locator: &LobLocator) -> Result<LobData>;
}

impl<C: NativeCursor + ?Sized> LobSource for C {
    fn read_lob(&mut self, locator: &LobLocator) -> Result<LobData> {
        NativeCursor::read_lob(self, locator)
    }
}

/// Convert one driver value. LOB markers are read right away when
/// `auto_lob_read` is set and otherwise become `TypedLiteral::LobRef`.
///
/// # Errors
///
/// Propagates LOB read failures from the driver.
pub fn project_value<S: LobSource + ?Sized>(
    source: &mut S,
    value: NativeValue,
    auto_lob_read: bool,
) -> Result<Value> {
    Ok(match value {
        NativeValue::Null => Value::Null,
        NativeValue::Int(i) => Value::Int(i),
        NativeValue::Float(f) => Value::Float(f),
        NativeValue::Text(s) => Value::Text(s),
        NativeValue::Bytes(b) => Value::Literal(TypedLiteral::Binary(b)),
        NativeValue::Lob(locator) if auto_lob_read => {
            let data = source.read_lob(&locator)?;
            codec::decode_lob(locator.kind, data)
        }
        NativeValue::Lob(locator) => Value::Literal(TypedLiteral::LobRef(locator)),
    })
}

/// # Errors
///
/// Propagates LOB read failures from the driver.
pub fn project_row<S: LobSource + ?Sized>(source: &mut S, row: NativeRow, auto_lob_read: bool) -> Result<Row> {
    row.into_iter()
        .map(|value| project_value(source, value, auto_lob_read))
        .collect()
}

/// # Errors
///
/// Propagates LOB read failures from the driver.
pub fn project_rows<S: LobSource + ?Sized>(
    source: &mut S,
    rows: Vec<NativeRow>,
    auto_lob_read: bool,
) -> Result<Vec<Row>> {
    rows.into_iter()
        .map(|row| project_row(source, row, auto_lob_read))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::{DbError, Diagnostic};
    use crate::types::LobKind;

    #[derive(Default)]
    struct Lobs {
        data: HashMap<u64, LobData>,
        reads: usize,
    }

    impl LobSource for Lobs {
        fn read_lob(&mut self, locator: &LobLocator) -> Result<LobData> {
            self.reads += 1;
            self.data
                .get(&locator.token)
                .cloned()
                .ok_or_else(|| DbError::Programming(Diagnostic::new("invalid LOB locator")))
        }
    }

    fn lobs() -> Lobs {
        let mut lobs = Lobs::default();
        lobs.data.insert(1, LobData::Bytes(vec![0xae; 4]));
        lobs.data.insert(2, LobData::Text("long text".into()));
        lobs
    }

    fn lob_row() -> NativeRow {
        vec![
            NativeValue::Int(1),
            NativeValue::Lob(LobLocator::new(1, LobKind::Blob)),
            NativeValue::Lob(LobLocator::new(2, LobKind::Clob)),
            NativeValue::Null,
        ]
    }

    #[test]
    fn auto_read_materializes() {
        let mut source = lobs();
        let row = project_row(&mut source, lob_row(), true).unwrap();
        assert_eq!(
            row,
            vec![
                Value::Int(1),
                Value::Literal(TypedLiteral::Binary(vec![0xae; 4])),
                Value::Text("long text".into()),
                Value::Null,
            ]
        );
        assert_eq!(source.reads, 2);
    }

    #[test]
    fn deferred_read_keeps_locators() {
        let mut source = lobs();
        let row = project_row(&mut source, lob_row(), false).unwrap();
        assert_eq!(row[1].as_lob(), Some(&LobLocator::new(1, LobKind::Blob)));
        assert_eq!(row[2].as_lob(), Some(&LobLocator::new(2, LobKind::Clob)));
        assert_eq!(source.reads, 0);
    }

    #[test]
    fn read_failure_propagates() {
        let mut source = Lobs::default();
        let err = project_rows(&mut source, vec![lob_row()], true).unwrap_err();
        assert!(matches!(err, DbError::Programming(_)));
    }
}
