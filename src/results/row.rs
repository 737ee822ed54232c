use std::collections::HashMap;
use std::ops::Index;
use std::sync::Arc;

use crate::types::Value;

/// A fetched row.
///
/// Values are positional, in the order the columns were requested; column names are shared
/// with every other row of the same result set.
#[derive(Debug, Clone)]
pub struct Row {
    /// The column names for this row (shared across all rows in a result set)
    pub(crate) column_names: Arc<Vec<String>>,
    pub(crate) values: Vec<Value>,
    // Shared name -> index lookup, built once per result set
    pub(crate) column_index: Arc<HashMap<String, usize>>,
}

impl Row {
    /// Create a standalone row, building its own name lookup.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        let column_index = Arc::new(index_columns(&column_names));
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Get the index of a column by name
    ///
    /// Exact matches win; otherwise the first case-insensitive match is returned, since
    /// drivers disagree on the case of unquoted identifiers.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index.get(column_name) {
            return Some(idx);
        }
        self.column_names
            .iter()
            .position(|col| col.eq_ignore_ascii_case(column_name))
    }

    /// Get a value from the row by column name
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the row by column index
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values && self.column_names == other.column_names
    }
}

impl PartialEq<[Value]> for Row {
    fn eq(&self, other: &[Value]) -> bool {
        self.values == other
    }
}

impl PartialEq<Vec<Value>> for Row {
    fn eq(&self, other: &Vec<Value>) -> bool {
        &self.values == other
    }
}

pub(crate) fn index_columns(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        // First occurrence wins for duplicated names like `select a, a from t`
        index.entry(name.clone()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            Arc::new(vec!["ACCOUNT_NO".into(), "BALANCE".into(), "ACCOUNT_NO".into()]),
            vec![Value::Int(18), Value::Float(12.4), Value::Int(99)],
        )
    }

    #[test]
    fn lookup_by_name_and_position() {
        let row = row();
        assert_eq!(row.get("ACCOUNT_NO"), Some(&Value::Int(18)));
        assert_eq!(row.get("balance"), Some(&Value::Float(12.4)));
        assert_eq!(row.get("missing"), None);
        assert_eq!(row[2], Value::Int(99));
        assert_eq!(row.get_by_index(3), None);
    }

    #[test]
    fn compares_against_plain_values() {
        let row = row();
        assert_eq!(row, vec![Value::Int(18), Value::Float(12.4), Value::Int(99)]);
        assert_eq!(row.len(), 3);
        assert!(!row.is_empty());
    }
}
