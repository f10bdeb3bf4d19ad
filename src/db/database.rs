use std::{collections::BTreeMap, fs, path::Path};

use crate::{
    DatabaseError,
    db::table::{Row, Table},
    query::executor::QueryExecutor,
    storage::snapshot,
};

/// Response from executing a statement.
///
/// SELECT fills in the projected column names and the matching rows; the
/// mutating statements return an empty response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResponse {
    /// The projected column names, in projection order.
    pub columns: Vec<String>,

    /// The rows returned by the query.
    pub rows: Vec<Row>,
}

impl QueryResponse {
    pub(crate) fn empty() -> Self {
        Self::default()
    }
}

/// The main database handle.
///
/// Owns the named table collection and composes the query executor and the
/// snapshot codec. Starts empty; populated by CREATE statements or by
/// loading a snapshot file, which replaces the collection wholesale.
#[derive(Debug, Default, PartialEq)]
pub struct Database {
    tables: BTreeMap<String, Table>,
}

impl Database {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and runs a single statement.
    pub fn execute(&mut self, query: &str) -> Result<QueryResponse, DatabaseError> {
        QueryExecutor::execute(query, &mut self.tables)
    }

    /// Returns `true` if a table with that name exists.
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Looks up a table by name.
    pub fn get_table(&self, name: &str) -> Result<&Table, DatabaseError> {
        self.tables
            .get(name)
            .ok_or_else(|| DatabaseError::TableNotFound(name.to_string()))
    }

    /// Iterates over every table in name order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Writes the whole table collection to a snapshot file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), DatabaseError> {
        let bytes = snapshot::encode(&self.tables)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Replaces the table collection with the contents of a snapshot file.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DatabaseError> {
        let bytes = fs::read(path)?;
        self.tables = snapshot::decode(&bytes)?;
        Ok(())
    }
}
