//! Column storage for [`DataChunk`](super::DataChunk)
//!
//! Fixed-width columns keep values in a typed vector; string columns keep
//! every value in one contiguous byte buffer addressed by `(offset, len)`
//! handles. Both track nulls in a roaring bitmap of positions.

use crate::{Error, Result};
use roaring::RoaringBitmap;
use serde_json::Value;

/// Supported column types
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Float64,
    /// Boolean
    Bool,
    /// UTF-8 string
    String,
}

impl DataType {
    /// Name used in dump headers
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int64 => "INTEGER",
            DataType::Float64 => "FLOAT",
            DataType::Bool => "BOOL",
            DataType::String => "STRING",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FixedData {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
}

/// Fixed-width column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnVector {
    data: FixedData,
    nulls: RoaringBitmap,
}

impl ColumnVector {
    /// Create an empty column. `DataType::String` belongs in a
    /// [`StringColumn`].
    pub fn with_capacity(data_type: DataType, capacity: usize) -> Result<Self> {
        let data = match data_type {
            DataType::Int64 => FixedData::Int64(Vec::with_capacity(capacity)),
            DataType::Float64 => FixedData::Float64(Vec::with_capacity(capacity)),
            DataType::Bool => FixedData::Bool(Vec::with_capacity(capacity)),
            DataType::String => {
                return Err(Error::internal("string data in a fixed-width column"));
            }
        };
        Ok(Self {
            data,
            nulls: RoaringBitmap::new(),
        })
    }

    /// Column type
    pub fn data_type(&self) -> DataType {
        match self.data {
            FixedData::Int64(_) => DataType::Int64,
            FixedData::Float64(_) => DataType::Float64,
            FixedData::Bool(_) => DataType::Bool,
        }
    }

    /// Number of positions, nulls included
    pub fn len(&self) -> usize {
        match &self.data {
            FixedData::Int64(v) => v.len(),
            FixedData::Float64(v) => v.len(),
            FixedData::Bool(v) => v.len(),
        }
    }

    /// True if the column has no positions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if the position holds null
    pub fn is_null(&self, index: usize) -> bool {
        index >= self.len() || self.nulls.contains(index as u32)
    }

    /// Append a JSON value. Null is stored as a masked default.
    pub fn push(&mut self, value: &Value) -> Result<()> {
        let index = self.len() as u32;
        if value.is_null() {
            match &mut self.data {
                FixedData::Int64(v) => v.push(0),
                FixedData::Float64(v) => v.push(0.0),
                FixedData::Bool(v) => v.push(false),
            }
            self.nulls.insert(index);
            return Ok(());
        }
        let expected = self.data_type();
        match (&mut self.data, value) {
            (FixedData::Int64(v), Value::Number(n)) if n.is_i64() => {
                v.push(n.as_i64().unwrap_or_default())
            }
            (FixedData::Float64(v), Value::Number(n)) => v.push(n.as_f64().unwrap_or_default()),
            (FixedData::Bool(v), Value::Bool(b)) => v.push(*b),
            _ => {
                return Err(Error::type_mismatch(
                    expected.name(),
                    json_type_name(value),
                ));
            }
        }
        Ok(())
    }

    /// Value at `index`, JSON null when masked or out of range
    pub fn get(&self, index: usize) -> Value {
        if self.is_null(index) {
            return Value::Null;
        }
        match &self.data {
            FixedData::Int64(v) => Value::from(v[index]),
            FixedData::Float64(v) => Value::from(v[index]),
            FixedData::Bool(v) => Value::from(v[index]),
        }
    }

    /// Concatenate `other` onto this column
    pub fn extend_from(&mut self, other: &ColumnVector) -> Result<()> {
        let base = self.len() as u32;
        let expected = self.data_type();
        match (&mut self.data, &other.data) {
            (FixedData::Int64(a), FixedData::Int64(b)) => a.extend_from_slice(b),
            (FixedData::Float64(a), FixedData::Float64(b)) => a.extend_from_slice(b),
            (FixedData::Bool(a), FixedData::Bool(b)) => a.extend_from_slice(b),
            _ => {
                return Err(Error::type_mismatch(
                    expected.name(),
                    other.data_type().name(),
                ));
            }
        }
        self.nulls.extend(other.nulls.iter().map(|p| p + base));
        Ok(())
    }

    /// New column holding only `positions`, in the given order
    pub fn select(&self, positions: &[usize]) -> Self {
        let data = match &self.data {
            FixedData::Int64(v) => FixedData::Int64(positions.iter().map(|&p| v[p]).collect()),
            FixedData::Float64(v) => {
                FixedData::Float64(positions.iter().map(|&p| v[p]).collect())
            }
            FixedData::Bool(v) => FixedData::Bool(positions.iter().map(|&p| v[p]).collect()),
        };
        let nulls = positions
            .iter()
            .enumerate()
            .filter(|&(_, &p)| self.nulls.contains(p as u32))
            .map(|(i, _)| i as u32)
            .collect();
        Self { data, nulls }
    }
}

/// Location of one string inside a [`StringColumn`] buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringHandle {
    /// Byte offset
    pub offset: u32,
    /// Byte length
    pub len: u32,
}

/// String column: one byte buffer plus handles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringColumn {
    buffer: Vec<u8>,
    handles: Vec<StringHandle>,
    nulls: RoaringBitmap,
}

impl StringColumn {
    /// Create an empty column
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::new(),
            handles: Vec::with_capacity(capacity),
            nulls: RoaringBitmap::new(),
        }
    }

    /// Number of positions, nulls included
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True if the column has no positions
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Bytes held by the backing buffer
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// True if the position holds null
    pub fn is_null(&self, index: usize) -> bool {
        index >= self.len() || self.nulls.contains(index as u32)
    }

    /// Append a string, or null
    pub fn push_str(&mut self, value: Option<&str>) {
        let index = self.handles.len() as u32;
        match value {
            Some(s) => {
                self.handles.push(StringHandle {
                    offset: self.buffer.len() as u32,
                    len: s.len() as u32,
                });
                self.buffer.extend_from_slice(s.as_bytes());
            }
            None => {
                self.handles.push(StringHandle {
                    offset: self.buffer.len() as u32,
                    len: 0,
                });
                self.nulls.insert(index);
            }
        }
    }

    /// Append a JSON value; only strings and null are accepted
    pub fn push(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::String(s) => self.push_str(Some(s)),
            Value::Null => self.push_str(None),
            other => {
                return Err(Error::type_mismatch(
                    DataType::String.name(),
                    json_type_name(other),
                ));
            }
        }
        Ok(())
    }

    /// String at `index`
    pub fn get_str(&self, index: usize) -> Option<&str> {
        if self.is_null(index) {
            return None;
        }
        let h = self.handles[index];
        let start = h.offset as usize;
        let bytes = self.buffer.get(start..start + h.len as usize)?;
        std::str::from_utf8(bytes).ok()
    }

    /// Value at `index`, JSON null when masked or out of range
    pub fn get(&self, index: usize) -> Value {
        self.get_str(index)
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null)
    }

    /// Handle at `index`
    pub fn handle(&self, index: usize) -> Option<StringHandle> {
        self.handles.get(index).copied()
    }

    /// Concatenate `other` onto this column. Handles copied from `other`
    /// are rebased onto this buffer.
    pub fn extend_from(&mut self, other: &StringColumn) {
        let base_offset = self.buffer.len() as u32;
        let base_index = self.handles.len() as u32;
        self.buffer.extend_from_slice(&other.buffer);
        self.handles.extend(other.handles.iter().map(|h| StringHandle {
            offset: h.offset + base_offset,
            len: h.len,
        }));
        self.nulls
            .extend(other.nulls.iter().map(|p| p + base_index));
    }

    /// New column holding only `positions`, with a compacted buffer
    pub fn select(&self, positions: &[usize]) -> Self {
        let mut out = Self::with_capacity(positions.len());
        for &p in positions {
            out.push_str(self.get_str(p));
        }
        out
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Bool(_) => "BOOL",
        Value::Number(n) if n.is_i64() || n.is_u64() => "INTEGER",
        Value::Number(_) => "FLOAT",
        Value::String(_) => "STRING",
        Value::Array(_) => "LIST",
        Value::Object(_) => "MAP",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixed_column_push_and_nulls() {
        let mut col = ColumnVector::with_capacity(DataType::Int64, 4).unwrap();
        col.push(&json!(10)).unwrap();
        col.push(&Value::Null).unwrap();
        col.push(&json!(30)).unwrap();
        assert_eq!(col.len(), 3);
        assert!(col.is_null(1));
        assert_eq!(col.get(0), json!(10));
        assert_eq!(col.get(1), Value::Null);
        assert!(col.push(&json!("x")).is_err());
    }

    #[test]
    fn test_float_column_accepts_integers() {
        let mut col = ColumnVector::with_capacity(DataType::Float64, 2).unwrap();
        col.push(&json!(1)).unwrap();
        col.push(&json!(2.5)).unwrap();
        assert_eq!(col.get(0), json!(1.0));
        assert_eq!(col.get(1), json!(2.5));
    }

    #[test]
    fn test_string_column_is_rejected_as_fixed() {
        assert!(ColumnVector::with_capacity(DataType::String, 1).is_err());
    }

    #[test]
    fn test_fixed_extend_shifts_nulls() {
        let mut a = ColumnVector::with_capacity(DataType::Bool, 2).unwrap();
        a.push(&json!(true)).unwrap();
        let mut b = ColumnVector::with_capacity(DataType::Bool, 2).unwrap();
        b.push(&Value::Null).unwrap();
        b.push(&json!(false)).unwrap();
        a.extend_from(&b).unwrap();
        assert_eq!(a.len(), 3);
        assert!(a.is_null(1));
        assert_eq!(a.get(2), json!(false));

        let c = ColumnVector::with_capacity(DataType::Int64, 1).unwrap();
        assert!(matches!(a.extend_from(&c), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_string_extend_rebases_handles() {
        let mut a = StringColumn::with_capacity(2);
        a.push_str(Some("alice"));
        let mut b = StringColumn::with_capacity(2);
        b.push_str(Some("bob"));
        b.push_str(None);
        b.push_str(Some("carol"));

        a.extend_from(&b);
        assert_eq!(a.len(), 4);
        assert_eq!(a.buffer_len(), "alicebobcarol".len());
        assert_eq!(a.handle(1), Some(StringHandle { offset: 5, len: 3 }));
        assert_eq!(a.get_str(1), Some("bob"));
        assert_eq!(a.get_str(2), None);
        assert_eq!(a.get_str(3), Some("carol"));
    }

    #[test]
    fn test_select_compacts() {
        let mut s = StringColumn::with_capacity(3);
        s.push_str(Some("aa"));
        s.push_str(Some("bb"));
        s.push_str(Some("cc"));
        let kept = s.select(&[2, 0]);
        assert_eq!(kept.buffer_len(), 4);
        assert_eq!(kept.get(0), json!("cc"));
        assert_eq!(kept.get(1), json!("aa"));

        let mut c = ColumnVector::with_capacity(DataType::Int64, 3).unwrap();
        c.push(&json!(1)).unwrap();
        c.push(&Value::Null).unwrap();
        c.push(&json!(3)).unwrap();
        let kept = c.select(&[1, 2]);
        assert!(kept.is_null(0));
        assert_eq!(kept.get(1), json!(3));
    }
}
