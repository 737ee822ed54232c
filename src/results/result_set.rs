use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::description::ColumnDescription;
use super::row::{Row, index_columns};
use crate::types::Value;

/// A materialized row set together with its column metadata.
///
/// Drivers fill it once per execution; the cursor then consumes rows from the front.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    description: Arc<Vec<ColumnDescription>>,
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
    rows: VecDeque<Vec<Value>>,
}

impl ResultSet {
    /// Create an empty result set for the given columns.
    #[must_use]
    pub fn new(description: Vec<ColumnDescription>) -> Self {
        Self::with_capacity(description, 0)
    }

    /// Create a new result set with a known row capacity
    #[must_use]
    pub fn with_capacity(description: Vec<ColumnDescription>, capacity: usize) -> Self {
        let column_names: Vec<String> = description.iter().map(|c| c.name.clone()).collect();
        let column_index = Arc::new(index_columns(&column_names));
        Self {
            description: Arc::new(description),
            column_names: Arc::new(column_names),
            column_index,
            rows: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a row; values must follow the description's column order.
    pub fn add_row_values(&mut self, row_values: Vec<Value>) {
        debug_assert_eq!(row_values.len(), self.description.len());
        self.rows.push_back(row_values);
    }

    #[must_use]
    pub fn description(&self) -> &Arc<Vec<ColumnDescription>> {
        &self.description
    }

    #[must_use]
    pub fn column_names(&self) -> &Arc<Vec<String>> {
        &self.column_names
    }

    /// Number of rows not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.rows.is_empty()
    }

    /// Consume the next row.
    pub fn next_row(&mut self) -> Option<Row> {
        self.rows.pop_front().map(|values| self.wrap(values))
    }

    /// Consume up to `n` rows.
    pub fn take_rows(&mut self, n: usize) -> Vec<Row> {
        let n = n.min(self.rows.len());
        let taken: Vec<Vec<Value>> = self.rows.drain(..n).collect();
        taken.into_iter().map(|values| self.wrap(values)).collect()
    }

    /// Consume every remaining row.
    pub fn take_all(&mut self) -> Vec<Row> {
        self.take_rows(self.rows.len())
    }

    fn wrap(&self, values: Vec<Value>) -> Row {
        Row {
            column_names: Arc::clone(&self.column_names),
            values,
            column_index: Arc::clone(&self.column_index),
        }
    }
}
