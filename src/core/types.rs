use std::fmt;

use strum::{Display, EnumString};

/// Data types a column can declare.
///
/// The lowercase names (`int32`, `bool`, `string`, `bytes`) are the ones the
/// query language and diagnostics use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DataType {
    /// 32-bit signed integer, stored as 4 bytes little-endian.
    Int32,

    /// Boolean true/false value, stored as a single byte.
    Bool,

    /// UTF-8 text, stored as a 4-byte length prefix + bytes.
    String,

    /// Raw byte sequence, stored as a 4-byte length prefix + bytes.
    Bytes,
}

/// A value that can be stored in a database column.
///
/// Values are strongly typed and correspond to [`DataType`] definitions.
/// There is no null variant; an absent value is `Option<Value>` at the sites
/// that need one (column defaults, rows under construction).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A 32-bit signed integer value.
    Int32(i32),

    /// A boolean value (true/false).
    Bool(bool),

    /// A UTF-8 text string.
    Text(String),

    /// An opaque byte sequence.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns the [`DataType`] this value belongs to.
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int32(_) => DataType::Int32,
            Value::Bool(_) => DataType::Bool,
            Value::Text(_) => DataType::String,
            Value::Bytes(_) => DataType::Bytes,
        }
    }

    /// Checks whether this value can be stored in a column of the given type.
    ///
    /// There is no coercion between kinds; a bool is never valid for an
    /// int32 column.
    pub fn matches(&self, data_type: DataType) -> bool {
        self.data_type() == data_type
    }

    /// Returns the inner integer if this is a [`Value::Int32`].
    pub fn as_int32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int32(i) => write!(f, "{i}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Bytes(bytes) => {
                write!(f, "0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Decodes a run of hex digit pairs (without the `0x` prefix) into bytes.
///
/// Returns `None` on odd length or non-hex characters.
pub(crate) fn decode_hex_bytes(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::Int32.to_string(), "int32");
        assert_eq!(DataType::Bool.to_string(), "bool");
        assert_eq!(DataType::String.to_string(), "string");
        assert_eq!(DataType::Bytes.to_string(), "bytes");

        assert_eq!(DataType::from_str("int32"), Ok(DataType::Int32));
        assert_eq!(DataType::from_str("bytes"), Ok(DataType::Bytes));
        assert!(DataType::from_str("float64").is_err());
    }

    #[test]
    fn test_value_matches_declared_type() {
        assert!(Value::Int32(1).matches(DataType::Int32));
        assert!(Value::Bool(true).matches(DataType::Bool));
        assert!(Value::Text("x".to_string()).matches(DataType::String));
        assert!(Value::Bytes(vec![1, 2]).matches(DataType::Bytes));
    }

    #[test]
    fn test_no_coercion_between_kinds() {
        assert!(!Value::Bool(true).matches(DataType::Int32));
        assert!(!Value::Int32(1).matches(DataType::Bool));
        assert!(!Value::Text("true".to_string()).matches(DataType::Bool));
        assert!(!Value::Bytes(vec![0]).matches(DataType::String));
    }

    #[test]
    fn test_as_int32() {
        assert_eq!(Value::Int32(42).as_int32(), Some(42));
        assert_eq!(Value::Bool(true).as_int32(), None);
        assert_eq!(Value::Text("42".to_string()).as_int32(), None);
    }

    #[test]
    fn test_decode_hex_bytes() {
        assert_eq!(
            decode_hex_bytes("deadbeef"),
            Some(vec![0xde, 0xad, 0xbe, 0xef])
        );
        assert_eq!(decode_hex_bytes(""), Some(vec![]));
        assert_eq!(decode_hex_bytes("abc"), None);
        assert_eq!(decode_hex_bytes("zz"), None);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Int32(-5).to_string(), "-5");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Text("Alice".to_string()).to_string(), "Alice");
        assert_eq!(Value::Bytes(vec![0x12, 0x3a, 0xbc]).to_string(), "0x123abc");
    }
}
