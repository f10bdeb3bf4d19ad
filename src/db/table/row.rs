use std::collections::HashMap;

use crate::{DatabaseError, core::types::Value};

/// A row of data mapping column names to values.
///
/// The query engine builds rows cell by cell; [`Table::insert_row`] fills in
/// any column the caller omitted. A stored row holds a value for every
/// column of its table.
///
/// [`Table::insert_row`]: super::Table::insert_row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the value for a column.
    ///
    /// No type check happens here; validating the value against the column's
    /// declared type is the caller's responsibility.
    pub fn set_value(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    /// Gets the value stored for a column.
    pub fn get_value(&self, column: &str) -> Result<&Value, DatabaseError> {
        self.values
            .get(column)
            .ok_or_else(|| DatabaseError::ColumnNotFound(column.to_string()))
    }

    /// Returns `true` if the row holds a value for the column.
    pub fn has_value(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }
}
