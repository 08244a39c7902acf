//! Columnar batch accumulator
//!
//! A [`DataChunk`] holds named columns that may be populated unevenly: each
//! column carries its own parallel vid array, and rows are reassembled at
//! dump time by joining on vid rather than by position.

use super::column::{ColumnVector, DataType, StringColumn};
use crate::config::DEFAULT_CHUNK_CAPACITY;
use crate::types::VertexId;
use crate::{Error, Result, exec_assert};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Columnar batch keyed by vid
#[derive(Debug, Clone, PartialEq)]
pub struct DataChunk {
    columns: BTreeMap<String, ColumnVector>,
    string_columns: BTreeMap<String, StringColumn>,
    column_rows: BTreeMap<String, usize>,
    vids: BTreeMap<String, Vec<VertexId>>,
    capacity: usize,
}

impl Default for DataChunk {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHUNK_CAPACITY)
    }
}

impl DataChunk {
    /// Empty chunk with the default column capacity
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty chunk reserving `capacity` positions per new column
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: BTreeMap::new(),
            string_columns: BTreeMap::new(),
            column_rows: BTreeMap::new(),
            vids: BTreeMap::new(),
            capacity,
        }
    }

    fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name) || self.string_columns.contains_key(name)
    }

    /// Declare a column of `data_type`
    pub fn add_column(&mut self, name: &str, data_type: DataType) -> Result<()> {
        exec_assert!(!self.has_column(name), "column `{}` already exists", name);
        if data_type == DataType::String {
            self.string_columns
                .insert(name.to_string(), StringColumn::with_capacity(self.capacity));
        } else {
            self.columns.insert(
                name.to_string(),
                ColumnVector::with_capacity(data_type, self.capacity)?,
            );
        }
        self.column_rows.insert(name.to_string(), 0);
        self.vids
            .insert(name.to_string(), Vec::with_capacity(self.capacity));
        Ok(())
    }

    /// Declare a string column
    pub fn add_string_column(&mut self, name: &str) -> Result<()> {
        self.add_column(name, DataType::String)
    }

    /// Append the value of vertex `vid` to column `name`
    pub fn push_value(&mut self, name: &str, vid: VertexId, value: &Value) -> Result<()> {
        if let Some(col) = self.columns.get_mut(name) {
            col.push(value)?;
        } else if let Some(col) = self.string_columns.get_mut(name) {
            col.push(value)?;
        } else {
            return Err(Error::internal(format!("column `{}` does not exist", name)));
        }
        self.vids.entry(name.to_string()).or_default().push(vid);
        *self.column_rows.entry(name.to_string()).or_default() += 1;
        Ok(())
    }

    /// Column names in sorted order
    pub fn column_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .columns
            .keys()
            .chain(self.string_columns.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len() + self.string_columns.len()
    }

    /// Type of column `name`
    pub fn data_type(&self, name: &str) -> Option<DataType> {
        if let Some(col) = self.columns.get(name) {
            return Some(col.data_type());
        }
        self.string_columns.get(name).map(|_| DataType::String)
    }

    /// Positions held by column `name`, nulls included
    pub fn column_len(&self, name: &str) -> usize {
        self.column_rows.get(name).copied().unwrap_or(0)
    }

    /// Vid array of column `name`
    pub fn vids(&self, name: &str) -> Option<&[VertexId]> {
        self.vids.get(name).map(Vec::as_slice)
    }

    /// Fixed-width column `name`
    pub fn column(&self, name: &str) -> Option<&ColumnVector> {
        self.columns.get(name)
    }

    /// String column `name`
    pub fn string_column(&self, name: &str) -> Option<&StringColumn> {
        self.string_columns.get(name)
    }

    fn is_null_at(&self, name: &str, position: usize) -> bool {
        if let Some(col) = self.columns.get(name) {
            return col.is_null(position);
        }
        self.string_columns
            .get(name)
            .is_none_or(|col| col.is_null(position))
    }

    fn value_at(&self, name: &str, position: usize) -> Value {
        if let Some(col) = self.columns.get(name) {
            return col.get(position);
        }
        self.string_columns
            .get(name)
            .map(|col| col.get(position))
            .unwrap_or(Value::Null)
    }

    /// Vids holding a non-null value in at least one column
    pub fn distinct_vids(&self) -> BTreeSet<VertexId> {
        let mut out = BTreeSet::new();
        for (name, vids) in &self.vids {
            for (position, &vid) in vids.iter().enumerate() {
                if !self.is_null_at(name, position) {
                    out.insert(vid);
                }
            }
        }
        out
    }

    /// Number of rows [`DataChunk::dump`] would produce
    pub fn row_count(&self) -> usize {
        self.distinct_vids().len()
    }

    /// Clone column `name` (with its vid array) from `other`, replacing any
    /// column of the same name
    pub fn copy_column(&mut self, other: &DataChunk, name: &str) -> Result<()> {
        self.columns.remove(name);
        self.string_columns.remove(name);
        if let Some(col) = other.columns.get(name) {
            self.columns.insert(name.to_string(), col.clone());
        } else if let Some(col) = other.string_columns.get(name) {
            self.string_columns.insert(name.to_string(), col.clone());
        } else {
            return Err(Error::internal(format!(
                "column `{}` missing from source chunk",
                name
            )));
        }
        self.vids.insert(
            name.to_string(),
            other.vids.get(name).cloned().unwrap_or_default(),
        );
        self.column_rows
            .insert(name.to_string(), other.column_len(name));
        Ok(())
    }

    /// Clone every column of `other`
    pub fn merge_column(&mut self, other: &DataChunk) -> Result<()> {
        for name in other.column_names() {
            self.copy_column(other, name)?;
        }
        Ok(())
    }

    /// Concatenate the columns of `source` onto same-named columns, adopting
    /// columns this chunk does not have yet
    pub fn append(&mut self, source: &DataChunk) -> Result<()> {
        for name in source.column_names() {
            if !self.has_column(name) {
                self.copy_column(source, name)?;
                continue;
            }
            let dst_type = self.data_type(name);
            let src_type = source.data_type(name);
            if dst_type != src_type {
                return Err(Error::type_mismatch(
                    dst_type.map_or("NONE", |t| t.name()),
                    src_type.map_or("NONE", |t| t.name()),
                ));
            }
            if let (Some(dst), Some(src)) = (self.columns.get_mut(name), source.columns.get(name)) {
                dst.extend_from(src)?;
            } else if let (Some(dst), Some(src)) = (
                self.string_columns.get_mut(name),
                source.string_columns.get(name),
            ) {
                dst.extend_from(src);
            }
            if let Some(src_vids) = source.vids.get(name) {
                self.vids
                    .entry(name.to_string())
                    .or_default()
                    .extend_from_slice(src_vids);
            }
            *self.column_rows.entry(name.to_string()).or_default() += source.column_len(name);
        }
        Ok(())
    }

    /// Keep the `limit` smallest distinct vids. Every column is rebuilt to
    /// its non-null positions for kept vids, so columns shrink
    /// independently.
    pub fn truncate_data(&mut self, limit: usize) {
        let kept: BTreeSet<VertexId> = self.distinct_vids().into_iter().take(limit).collect();
        let names: Vec<String> = self.column_names().into_iter().map(String::from).collect();
        for name in names {
            let vids = self.vids.get(&name).cloned().unwrap_or_default();
            let positions: Vec<usize> = vids
                .iter()
                .enumerate()
                .filter(|&(p, vid)| kept.contains(vid) && !self.is_null_at(&name, p))
                .map(|(p, _)| p)
                .collect();
            if let Some(col) = self.columns.get_mut(&name) {
                *col = col.select(&positions);
            } else if let Some(col) = self.string_columns.get_mut(&name) {
                *col = col.select(&positions);
            }
            let new_vids: Vec<VertexId> = positions.iter().map(|&p| vids[p]).collect();
            self.column_rows.insert(name.clone(), new_vids.len());
            self.vids.insert(name, new_vids);
        }
    }

    /// Render the chunk as JSON rows, one per distinct vid.
    ///
    /// Each column is probed through its own vid array. With `is_standard`
    /// the rows are wrapped as `{"header": [...], "is_standard": true,
    /// "data": [...]}`; otherwise a bare array is returned.
    pub fn dump(&self, is_standard: bool) -> Result<Value> {
        let names = self.column_names();
        let mut index: HashMap<&str, HashMap<VertexId, usize>> = HashMap::new();
        for &name in &names {
            let mut by_vid = HashMap::new();
            for (p, &vid) in self.vids.get(name).into_iter().flatten().enumerate() {
                if !self.is_null_at(name, p) {
                    by_vid.entry(vid).or_insert(p);
                }
            }
            index.insert(name, by_vid);
        }

        let mut rows = Vec::new();
        for vid in self.distinct_vids() {
            let mut row = Map::new();
            for &name in &names {
                if let Some(&p) = index.get(name).and_then(|m| m.get(&vid)) {
                    row.insert(name.to_string(), self.value_at(name, p));
                }
            }
            exec_assert!(
                !row.is_empty(),
                "vid {} resolved to no column; chunk built by copy instead of reference?",
                vid
            );
            rows.push(Value::Object(row));
        }

        if is_standard {
            let header: Vec<Value> = names
                .iter()
                .map(|&name| {
                    json!({
                        "name": name,
                        "type": self.data_type(name).map_or("NONE", |t| t.name()),
                    })
                })
                .collect();
            Ok(json!({
                "header": header,
                "is_standard": true,
                "data": rows,
            }))
        } else {
            Ok(Value::Array(rows))
        }
    }
}
