use std::collections::{HashMap, HashSet};

use crate::{DatabaseError, core::types::Value};

pub mod column;
pub mod row;

pub use column::Column;
pub use row::Row;

/// A named collection of columns and rows.
///
/// Columns live in an explicit `Vec` so iteration order is always
/// declaration order; INSERT positional binding and the snapshot format both
/// depend on that. Rows are kept in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Row>,

    /// Values already stored per unique column, checked before every append.
    unique_values: HashMap<String, HashSet<Value>>,
}

impl Table {
    /// Creates an empty table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            unique_values: HashMap::new(),
        }
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the stored rows in insertion order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns `true` if a column with that name is defined.
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| column.name == name)
    }

    /// Looks up a column definition by name.
    pub fn get_column(&self, name: &str) -> Result<&Column, DatabaseError> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .ok_or_else(|| DatabaseError::ColumnNotFound(name.to_string()))
    }

    /// Appends a column definition.
    ///
    /// Fails if a column with the same name already exists; the table is
    /// left unchanged in that case.
    pub fn add_column(&mut self, column: Column) -> Result<(), DatabaseError> {
        if self.has_column(&column.name) {
            return Err(DatabaseError::ConstraintViolation(format!(
                "duplicate column: {}",
                column.name
            )));
        }

        if column.unique {
            self.unique_values
                .insert(column.name.clone(), HashSet::new());
        }
        self.columns.push(column);
        Ok(())
    }

    /// Completes and stores a row.
    ///
    /// Every declared column missing from the row is filled in declaration
    /// order: autoincrement columns draw their next value, columns with a
    /// default take it, anything else fails. Unique columns are then checked
    /// against the values already stored before the row is appended.
    pub fn insert_row(&mut self, mut row: Row) -> Result<(), DatabaseError> {
        for column in &mut self.columns {
            if row.has_value(&column.name) {
                continue;
            }

            if column.autoincrement {
                let value = column.next_autoincrement_value();
                row.set_value(column.name.clone(), value);
            } else if let Some(default) = &column.default {
                row.set_value(column.name.clone(), default.clone());
            } else {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "missing value for column: {}",
                    column.name
                )));
            }
        }

        for (name, seen) in &self.unique_values {
            let value = row.get_value(name)?;
            if seen.contains(value) {
                return Err(DatabaseError::ConstraintViolation(format!(
                    "duplicate value for unique column '{name}': {value}"
                )));
            }
        }
        for (name, seen) in &mut self.unique_values {
            seen.insert(row.get_value(name)?.clone());
        }

        self.rows.push(row);
        Ok(())
    }

    /// Returns every row the predicate accepts, preserving insertion order.
    ///
    /// A predicate error aborts the scan and propagates.
    pub fn select<F>(&self, mut predicate: F) -> Result<Vec<Row>, DatabaseError>
    where
        F: FnMut(&Row) -> Result<bool, DatabaseError>,
    {
        let mut result = Vec::new();
        for row in &self.rows {
            if predicate(row)? {
                result.push(row.clone());
            }
        }
        Ok(result)
    }
}
