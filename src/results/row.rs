use std::collections::HashMap;

use crate::catalog::ColumnDescriptor;
use crate::types::Value;

/// A positional row as returned by `Cursor::fetchone`.
pub type Row = Vec<Value>;

/// A row keyed by column name, as returned by `DictCursor`.
///
/// When the description repeats a column name, the value of the last column
/// with that name is kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DictRow {
    values: HashMap<String, Value>,
}

impl DictRow {
    /// Pair each value with the name of its column.
    #[must_use]
    pub fn from_row(description: &[ColumnDescriptor], row: Row) -> Self {
        let values = description
            .iter()
            .zip(row)
            .map(|(col, value)| (col.name.clone(), value))
            .collect();
        Self { values }
    }

    /// Get a value by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.values.get(column_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn into_inner(self) -> HashMap<String, Value> {
        self.values
    }

    /// Render the row as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .values
            .iter()
            .map(|(name, value)| {
                let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                (name.clone(), json)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SQL_INTEGER, SQL_VARCHAR};
    use crate::types;

    #[test]
    fn later_duplicate_column_wins() {
        let desc = vec![
            ColumnDescriptor::new("ID", SQL_INTEGER),
            ColumnDescriptor::new("ID", SQL_VARCHAR),
        ];
        let row = DictRow::from_row(&desc, vec![Value::Int(1), Value::from("x")]);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("ID"), Some(&Value::from("x")));
    }

    #[test]
    fn json_rendering() {
        let desc = vec![
            ColumnDescriptor::new("C1", SQL_INTEGER),
            ColumnDescriptor::new("C2", SQL_VARCHAR),
            ColumnDescriptor::new("C3", SQL_VARCHAR),
        ];
        let row = DictRow::from_row(
            &desc,
            vec![Value::Int(1), Value::Null, Value::from(types::date(2005, 3, 3).unwrap())],
        );
        assert_eq!(
            row.to_json(),
            serde_json::json!({"C1": 1, "C2": null, "C3": "2005-03-03"})
        );
    }
}
