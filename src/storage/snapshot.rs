//! Binary snapshot format for the whole table collection.
//!
//! All integers are little-endian. Layout:
//!
//! ```text
//! magic "MNW1"
//! table_count: u32
//! per table:
//!   name: u32 len + bytes
//!   column_count: u32
//!   per column:
//!     name: u32 len + bytes
//!     type tag: u8 (0=int32 1=bool 2=string 3=bytes)
//!     max length: u32 (0 = unset)
//!     flags: u8 (bit0 autoincrement, bit1 unique, bit2 has-default)
//!     default value, present iff bit2 is set
//!     autoincrement counter: i32
//!   row_count: u32
//!   per row, per column in declaration order: the value
//! ```
//!
//! Values encode by their column's type: int32 as 4 bytes, bool as one byte,
//! string/bytes as a u32 length prefix + payload. Decoding goes by the
//! stored type tag, so every column kind survives a round trip. Every
//! length and count is bounds-checked against the remaining input.

use std::collections::BTreeMap;

use crate::{
    DatabaseError,
    core::types::{DataType, Value},
    db::table::{Column, Row, Table},
};

const MAGIC: &[u8; 4] = b"MNW1";

const FLAG_AUTOINCREMENT: u8 = 1 << 0;
const FLAG_UNIQUE: u8 = 1 << 1;
const FLAG_HAS_DEFAULT: u8 = 1 << 2;

fn type_tag(data_type: DataType) -> u8 {
    match data_type {
        DataType::Int32 => 0,
        DataType::Bool => 1,
        DataType::String => 2,
        DataType::Bytes => 3,
    }
}

fn data_type_from_tag(tag: u8) -> Result<DataType, DatabaseError> {
    match tag {
        0 => Ok(DataType::Int32),
        1 => Ok(DataType::Bool),
        2 => Ok(DataType::String),
        3 => Ok(DataType::Bytes),
        tag => Err(DatabaseError::CorruptFile(format!(
            "unknown column type tag: {tag}"
        ))),
    }
}

/// Encodes the full table collection.
pub(crate) fn encode(tables: &BTreeMap<String, Table>) -> Result<Vec<u8>, DatabaseError> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(MAGIC);
    put_u32(&mut bytes, tables.len() as u32);

    for table in tables.values() {
        put_str(&mut bytes, table.name());

        put_u32(&mut bytes, table.columns().len() as u32);
        for column in table.columns() {
            put_str(&mut bytes, &column.name);
            bytes.push(type_tag(column.data_type));
            put_u32(&mut bytes, column.max_len.unwrap_or(0) as u32);

            let mut flags = 0u8;
            if column.autoincrement {
                flags |= FLAG_AUTOINCREMENT;
            }
            if column.unique {
                flags |= FLAG_UNIQUE;
            }
            if column.default.is_some() {
                flags |= FLAG_HAS_DEFAULT;
            }
            bytes.push(flags);

            if let Some(default) = &column.default {
                put_value(&mut bytes, default);
            }
            bytes.extend_from_slice(&column.next_value.to_le_bytes());
        }

        put_u32(&mut bytes, table.rows().len() as u32);
        for row in table.rows() {
            for column in table.columns() {
                put_value(&mut bytes, row.get_value(&column.name)?);
            }
        }
    }

    Ok(bytes)
}

/// Decodes a snapshot back into the table collection.
pub(crate) fn decode(bytes: &[u8]) -> Result<BTreeMap<String, Table>, DatabaseError> {
    let mut reader = Reader::new(bytes);

    if reader.take(MAGIC.len())? != MAGIC {
        return Err(DatabaseError::CorruptFile(
            "bad magic, not a minnow snapshot".to_string(),
        ));
    }

    let table_count = reader.read_u32()?;
    let mut tables = BTreeMap::new();

    for _ in 0..table_count {
        let name = reader.read_string()?;
        let mut table = Table::new(name.clone());

        let column_count = reader.read_u32()?;
        let mut layout = Vec::with_capacity(column_count as usize);
        for _ in 0..column_count {
            let column = read_column(&mut reader)?;
            layout.push((column.name.clone(), column.data_type));
            table
                .add_column(column)
                .map_err(|e| DatabaseError::CorruptFile(e.to_string()))?;
        }

        let row_count = reader.read_u32()?;
        for _ in 0..row_count {
            let mut row = Row::new();
            for (column_name, data_type) in &layout {
                row.set_value(column_name.clone(), read_value(&mut reader, *data_type)?);
            }
            table
                .insert_row(row)
                .map_err(|e| DatabaseError::CorruptFile(e.to_string()))?;
        }

        tables.insert(name, table);
    }

    if reader.remaining() != 0 {
        return Err(DatabaseError::CorruptFile(format!(
            "{} trailing bytes after the last table",
            reader.remaining()
        )));
    }

    Ok(tables)
}

fn read_column(reader: &mut Reader) -> Result<Column, DatabaseError> {
    let name = reader.read_string()?;
    let data_type = data_type_from_tag(reader.read_u8()?)?;
    let max_len = reader.read_u32()?;
    let flags = reader.read_u8()?;

    if flags & !(FLAG_AUTOINCREMENT | FLAG_UNIQUE | FLAG_HAS_DEFAULT) != 0 {
        return Err(DatabaseError::CorruptFile(format!(
            "unknown column flags: {flags:#04x}"
        )));
    }

    let default = if flags & FLAG_HAS_DEFAULT != 0 {
        Some(read_value(reader, data_type)?)
    } else {
        None
    };

    let mut column = Column::new(name, data_type);
    column.max_len = (max_len != 0).then_some(max_len as usize);
    column.autoincrement = flags & FLAG_AUTOINCREMENT != 0;
    column.unique = flags & FLAG_UNIQUE != 0;
    column.default = default;
    column.next_value = reader.read_i32()?;
    Ok(column)
}

fn put_u32(bytes: &mut Vec<u8>, value: u32) {
    bytes.extend_from_slice(&value.to_le_bytes());
}

fn put_str(bytes: &mut Vec<u8>, value: &str) {
    put_u32(bytes, value.len() as u32);
    bytes.extend_from_slice(value.as_bytes());
}

fn put_value(bytes: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Int32(i) => bytes.extend_from_slice(&i.to_le_bytes()),
        Value::Bool(b) => bytes.push(u8::from(*b)),
        Value::Text(s) => put_str(bytes, s),
        Value::Bytes(payload) => {
            put_u32(bytes, payload.len() as u32);
            bytes.extend_from_slice(payload);
        }
    }
}

fn read_value(reader: &mut Reader, data_type: DataType) -> Result<Value, DatabaseError> {
    match data_type {
        DataType::Int32 => Ok(Value::Int32(reader.read_i32()?)),
        DataType::Bool => match reader.read_u8()? {
            0 => Ok(Value::Bool(false)),
            1 => Ok(Value::Bool(true)),
            byte => Err(DatabaseError::CorruptFile(format!(
                "invalid bool byte: {byte:#04x}"
            ))),
        },
        DataType::String => Ok(Value::Text(reader.read_string()?)),
        DataType::Bytes => {
            let len = reader.read_u32()? as usize;
            Ok(Value::Bytes(reader.take(len)?.to_vec()))
        }
    }
}

/// Offset cursor over the snapshot bytes.
///
/// Every read checks the remaining input first, so a truncated or oversized
/// length field surfaces as [`DatabaseError::CorruptFile`] instead of a
/// panic.
struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DatabaseError> {
        if len > self.remaining() {
            return Err(DatabaseError::CorruptFile(format!(
                "need {len} bytes at offset {}, only {} left",
                self.offset,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DatabaseError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, DatabaseError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_le_bytes(buf))
    }

    fn read_i32(&mut self) -> Result<i32, DatabaseError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(i32::from_le_bytes(buf))
    }

    fn read_string(&mut self) -> Result<String, DatabaseError> {
        let len = self.read_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DatabaseError::CorruptFile("invalid UTF-8 in string".to_string()))
    }
}
