use miette::Diagnostic;
use thiserror::Error;

/// Errors produced by the storage model, the query engine, and persistence.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error("IO error: {0}")]
    #[diagnostic(code(minnow::io))]
    Io(#[from] std::io::Error),

    #[error("Invalid query: {0}")]
    #[diagnostic(code(minnow::invalid_query))]
    InvalidQuery(String),

    #[error("Constraint violation: {0}")]
    #[diagnostic(code(minnow::constraint_violation))]
    ConstraintViolation(String),

    #[error("Column not found: {0}")]
    #[diagnostic(code(minnow::column_not_found))]
    ColumnNotFound(String),

    #[error("Table not found: {0}")]
    #[diagnostic(code(minnow::table_not_found))]
    TableNotFound(String),

    #[error("Corrupt snapshot: {0}")]
    #[diagnostic(code(minnow::corrupt_file))]
    CorruptFile(String),
}
