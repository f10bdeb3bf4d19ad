use crate::core::types::{DataType, Value};

/// Definition of a single column in a table.
///
/// Combines the column's identity (name, type) with its constraint flags and
/// the counter backing autoincrement assignment. The counter is ordinary
/// model state: it is seeded at 0, advanced only by inserts into the owning
/// table, and persisted with the column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// The column name, unique within its table.
    pub name: String,

    /// The data type for values in this column.
    pub data_type: DataType,

    /// Optional maximum length for string/bytes columns.
    ///
    /// Informational only; not enforced on write.
    pub max_len: Option<usize>,

    /// Whether omitted values are drawn from the autoincrement counter.
    pub autoincrement: bool,

    /// Whether values in this column must be distinct across rows.
    pub unique: bool,

    /// Value used when an insert omits this column.
    pub default: Option<Value>,

    pub(crate) next_value: i32,
}

impl Column {
    /// Creates a plain column with no constraints.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            max_len: None,
            autoincrement: false,
            unique: false,
            default: None,
            next_value: 0,
        }
    }

    /// Returns the current counter value and advances the counter.
    ///
    /// The sequence starts at 0 and is never reset.
    pub fn next_autoincrement_value(&mut self) -> Value {
        let value = Value::Int32(self.next_value);
        self.next_value += 1;
        value
    }

    /// Returns `true` if a default value was supplied.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}
