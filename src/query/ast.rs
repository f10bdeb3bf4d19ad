use std::fmt;

use miette::{Result, miette};

use crate::{
    DatabaseError,
    core::types::{DataType, Value, decode_hex_bytes},
};

/// A parsed statement (top-level AST node).
#[derive(Debug, Clone, PartialEq)]
pub enum Statement<'src> {
    Create(CreateStatement<'src>),
    Insert(InsertStatement<'src>),
    Select(SelectStatement<'src>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateStatement<'src> {
    pub table_name: &'src str,
    pub columns: Vec<ColumnSpec<'src>>,
}

/// One column definition inside CREATE TABLE.
///
/// The default value is already parsed against the declared type; the
/// parser has the type in hand when it reads the literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec<'src> {
    pub name: &'src str,
    pub data_type: DataType,
    pub max_len: Option<usize>,
    pub autoincrement: bool,
    pub unique: bool,
    pub default: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement<'src> {
    pub table_name: &'src str,
    pub values: Vec<ValueToken<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement<'src> {
    pub projection: Projection<'src>,
    pub table_name: &'src str,
    pub predicate: Option<Predicate<'src>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection<'src> {
    /// `SELECT *`
    All,
    Columns(Vec<&'src str>),
}

/// The single comparison a WHERE clause may carry.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate<'src> {
    pub column: &'src str,
    pub op: Comparison,
    pub value: ValueToken<'src>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanEqual,
    GreaterThanEqual,
}

impl Comparison {
    /// Ordering comparisons only apply to int32 columns; equality works for
    /// every type.
    pub(crate) fn is_ordering(self) -> bool {
        !matches!(self, Self::Equal | Self::NotEqual)
    }

    pub(crate) fn compare(self, lhs: &Value, rhs: &Value) -> Result<bool, DatabaseError> {
        match self {
            Self::Equal => Ok(lhs == rhs),
            Self::NotEqual => Ok(lhs != rhs),
            Self::LessThan | Self::GreaterThan | Self::LessThanEqual | Self::GreaterThanEqual => {
                match (lhs, rhs) {
                    (Value::Int32(lhs), Value::Int32(rhs)) => Ok(match self {
                        Self::LessThan => lhs < rhs,
                        Self::GreaterThan => lhs > rhs,
                        Self::LessThanEqual => lhs <= rhs,
                        Self::GreaterThanEqual => lhs >= rhs,
                        Self::Equal | Self::NotEqual => unreachable!(),
                    }),
                    _ => Err(DatabaseError::ConstraintViolation(format!(
                        "cannot order {} against {}",
                        lhs.data_type(),
                        rhs.data_type()
                    ))),
                }
            }
        }
    }
}

/// A raw value literal waiting for a column type to give it meaning.
///
/// Defaults and INSERT tokens share the same type-directed parsing rules:
/// `true`/`false` for bool, a decimal integer for int32, the bare (or
/// quoted) token text for string, and `0x`-prefixed hex pairs for bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueToken<'src> {
    Word(&'src str),
    Integer(i32),
    Quoted(&'src str),
    Hex(&'src str),
}

impl ValueToken<'_> {
    pub(crate) fn parse_as(self, data_type: DataType) -> Result<Value> {
        match data_type {
            DataType::Int32 => match self {
                ValueToken::Integer(i) => Ok(Value::Int32(i)),
                token => Err(miette!("not a decimal integer: {token}")),
            },
            DataType::Bool => match self {
                ValueToken::Word("true") => Ok(Value::Bool(true)),
                ValueToken::Word("false") => Ok(Value::Bool(false)),
                token => Err(miette!("not a bool literal: {token}")),
            },
            DataType::String => Ok(Value::Text(match self {
                ValueToken::Word(word) => word.to_string(),
                ValueToken::Quoted(text) => text.to_string(),
                ValueToken::Integer(i) => i.to_string(),
                ValueToken::Hex(hex) => hex.to_string(),
            })),
            DataType::Bytes => match self {
                ValueToken::Hex(hex) => decode_hex_bytes(&hex[2..])
                    .map(Value::Bytes)
                    .ok_or_else(|| miette!("malformed hex byte run: {hex}")),
                token => Err(miette!("bytes values must be 0x-prefixed hex: {token}")),
            },
        }
    }
}

impl fmt::Display for ValueToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueToken::Word(word) => write!(f, "{word}"),
            ValueToken::Integer(i) => write!(f, "{i}"),
            ValueToken::Quoted(text) => write!(f, "'{text}'"),
            ValueToken::Hex(hex) => write!(f, "{hex}"),
        }
    }
}
