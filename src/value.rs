//! Scalar values, column descriptors, rows, and the row byte codec.
//!
//! Marshal layout per column, in schema order:
//!   INT:     4 bytes, little-endian, signed.
//!   TEXT:    2-byte unsigned length `L`, then `L` UTF-8 bytes.
//!   BOOLEAN: 1 byte, 0 or 1.

use crate::error::{Error, Result};
use crate::page::BLOCK_SZ;
use std::collections::BTreeMap;
use std::fmt;

/// Table/column/index name. Matched case-insensitively for keywords
/// by callers, but stored and compared case-preservingly here.
pub type Identifier = String;

/// Largest TEXT value, in bytes (fits in the 2-byte length prefix).
pub const MAX_TEXT_LEN: usize = 65_535;

/// Column type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Text,
    Boolean,
}

impl DataType {
    /// Parse the catalog's stored type name (`_columns.data_type`).
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "INT" => Some(DataType::Int),
            "TEXT" => Some(DataType::Text),
            "BOOLEAN" => Some(DataType::Boolean),
            _ => None,
        }
    }

    /// Name stored in the catalog's `_columns.data_type` column.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "INT",
            DataType::Text => "TEXT",
            DataType::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A tagged scalar. Equality and ordering are structural; values of
/// different tags are unequal and incomparable (comparing them panics,
/// since callers are expected to only compare same-typed key columns).
#[derive(Debug, Clone)]
pub enum Value {
    Int(i32),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Int(_) => DataType::Int,
            Value::Text(_) => DataType::Text,
            Value::Boolean(_) => DataType::Boolean,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(x) => write!(f, "{x}"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// A single column in a table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: Identifier,
    pub data_type: DataType,
}

impl ColumnDef {
    pub fn new(name: impl Into<Identifier>, data_type: DataType) -> Self {
        ColumnDef {
            name: name.into(),
            data_type,
        }
    }
}

/// A row: column name to value. Row order for marshaling is governed
/// by the table's schema, not by insertion order into this map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row(BTreeMap<Identifier, Value>);

impl Row {
    pub fn new() -> Self {
        Row(BTreeMap::new())
    }

    pub fn set(&mut self, col: impl Into<Identifier>, val: Value) {
        self.0.insert(col.into(), val);
    }

    pub fn get(&self, col: &str) -> Option<&Value> {
        self.0.get(col)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A row is well-formed against `schema` iff it has exactly one
    /// entry per column, with tag matching the column type.
    pub fn validate(&self, schema: &[ColumnDef]) -> Result<()> {
        if self.0.len() != schema.len() {
            return Err(Error::row_shape(format!(
                "expected {} columns, row has {}",
                schema.len(),
                self.0.len()
            )));
        }
        for col in schema {
            match self.0.get(&col.name) {
                None => {
                    return Err(Error::row_shape(format!("missing column '{}'", col.name)));
                }
                Some(v) => {
                    if v.data_type() != col.data_type {
                        return Err(Error::row_shape(format!(
                            "column '{}' expected {}, got {}",
                            col.name,
                            col.data_type,
                            v.data_type()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Project this row onto a subset of columns, in the order given.
    pub fn project(&self, cols: &[Identifier]) -> Result<Row> {
        let mut out = Row::new();
        for c in cols {
            let v = self.0.get(c).ok_or_else(|| Error::unknown_column(c))?;
            out.set(c.clone(), v.clone());
        }
        Ok(out)
    }
}

impl FromIterator<(Identifier, Value)> for Row {
    fn from_iter<T: IntoIterator<Item = (Identifier, Value)>>(iter: T) -> Self {
        Row(iter.into_iter().collect())
    }
}

/// Marshal a well-formed row to its on-page byte record, in schema
/// column order. Fails with `RowTooLarge` if the record would not fit
/// in a page, or a TEXT value exceeds `MAX_TEXT_LEN`.
pub fn marshal(row: &Row, schema: &[ColumnDef]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for col in schema {
        let v = row
            .get(&col.name)
            .ok_or_else(|| Error::row_shape(format!("missing column '{}'", col.name)))?;
        match (col.data_type, v) {
            (DataType::Int, Value::Int(x)) => {
                buf.extend_from_slice(&x.to_le_bytes());
            }
            (DataType::Boolean, Value::Boolean(b)) => {
                buf.push(if *b { 1 } else { 0 });
            }
            (DataType::Text, Value::Text(s)) => {
                let bytes = s.as_bytes();
                if bytes.len() > MAX_TEXT_LEN {
                    return Err(Error::row_too_large(format!(
                        "TEXT value for column '{}' is {} bytes, max {}",
                        col.name,
                        bytes.len(),
                        MAX_TEXT_LEN
                    )));
                }
                buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
                buf.extend_from_slice(bytes);
            }
            _ => {
                return Err(Error::row_shape(format!(
                    "column '{}' expected {}, got {}",
                    col.name,
                    col.data_type,
                    v.data_type()
                )));
            }
        }
        if buf.len() > BLOCK_SZ {
            return Err(Error::row_too_large(format!(
                "row would be {} bytes, page capacity is {BLOCK_SZ}",
                buf.len()
            )));
        }
    }
    Ok(buf)
}

/// Unmarshal a byte record into a row, reading widths from `schema`.
/// Exactly inverts `marshal` over well-formed rows (property R1).
pub fn unmarshal(data: &[u8], schema: &[ColumnDef]) -> Result<Row> {
    let mut row = Row::new();
    let mut off = 0usize;
    for col in schema {
        match col.data_type {
            DataType::Int => {
                let bytes: [u8; 4] = data
                    .get(off..off + 4)
                    .and_then(|s| s.try_into().ok())
                    .ok_or_else(|| Error::row_shape("truncated INT field"))?;
                row.set(col.name.clone(), Value::Int(i32::from_le_bytes(bytes)));
                off += 4;
            }
            DataType::Boolean => {
                let b = *data
                    .get(off)
                    .ok_or_else(|| Error::row_shape("truncated BOOLEAN field"))?;
                row.set(col.name.clone(), Value::Boolean(b != 0));
                off += 1;
            }
            DataType::Text => {
                let len_bytes: [u8; 2] = data
                    .get(off..off + 2)
                    .and_then(|s| s.try_into().ok())
                    .ok_or_else(|| Error::row_shape("truncated TEXT length"))?;
                let len = u16::from_le_bytes(len_bytes) as usize;
                off += 2;
                let bytes = data
                    .get(off..off + len)
                    .ok_or_else(|| Error::row_shape("truncated TEXT bytes"))?;
                let s = String::from_utf8(bytes.to_vec())
                    .map_err(|_| Error::row_shape("TEXT field is not valid UTF-8"))?;
                row.set(col.name.clone(), Value::Text(s));
                off += len;
            }
        }
    }
    Ok(row)
}
