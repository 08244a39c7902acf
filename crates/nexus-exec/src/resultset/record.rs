//! Pipeline rows

use super::entry::Entry;
use crate::execution::Params;
use crate::graph::{SymbolTable, SymbolType};
use crate::{Result, exec_assert};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Record shared by every operator of one scan chain
pub type SharedRecord = Rc<RefCell<Record>>;

/// Ordered row of entries addressed by symbol-table slot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Cells in slot order
    pub values: Vec<Entry>,
}

impl Record {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Record with `size` unknown slots
    pub fn with_size(size: usize) -> Self {
        Self {
            values: vec![Entry::Unknown; size],
        }
    }

    /// Record sized to the symbol table with parameter slots filled from
    /// `params`. Parameters are looked up with and without the leading `$`.
    pub fn for_symbols(symbols: &SymbolTable, params: &Params) -> Self {
        let mut record = Self::with_size(symbols.len());
        for (alias, symbol) in symbols.iter() {
            if symbol.symbol_type != SymbolType::Parameter {
                continue;
            }
            let value = params
                .get(alias.as_str())
                .or_else(|| params.get(alias.trim_start_matches('$')));
            if let Some(v) = value {
                record.values[symbol.id] = Entry::Constant(v.clone());
            }
        }
        record
    }

    /// Wrap into a shared record
    pub fn into_shared(self) -> SharedRecord {
        Rc::new(RefCell::new(self))
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the record has no slots
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entry at `slot`
    pub fn get(&self, slot: usize) -> Option<&Entry> {
        self.values.get(slot)
    }

    /// Overwrite the entry at `slot`
    pub fn set(&mut self, slot: usize, entry: Entry) -> Result<()> {
        exec_assert!(
            slot < self.values.len(),
            "slot {} out of range for record of {} entries",
            slot,
            self.values.len()
        );
        self.values[slot] = entry;
        Ok(())
    }

    /// Append an entry
    pub fn push(&mut self, entry: Entry) {
        self.values.push(entry);
    }

    /// Overlay every written slot of `rhs` onto this record, growing it if
    /// needed
    pub fn merge(&mut self, rhs: &Record) {
        if self.values.len() < rhs.values.len() {
            self.values.resize(rhs.values.len(), Entry::Unknown);
        }
        for (slot, entry) in rhs.values.iter().enumerate() {
            if !matches!(entry, Entry::Unknown) {
                self.values[slot] = entry.clone();
            }
        }
    }

    /// True if every entry compares equal to null
    pub fn is_null(&self) -> bool {
        self.values.iter().all(Entry::equal_null)
    }

    /// Freeze every live node and relationship entry
    pub fn snapshot(&mut self) -> Result<()> {
        for entry in &mut self.values {
            entry.snapshot()?;
        }
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SymbolScope;
    use serde_json::{Value, json};

    #[test]
    fn test_for_symbols_fills_parameters() {
        let mut symbols = SymbolTable::new();
        symbols.insert("n", SymbolType::Node, SymbolScope::Local);
        let p = symbols.insert("$name", SymbolType::Parameter, SymbolScope::Local);
        let mut params = Params::new();
        params.insert("name".into(), json!("Alice"));

        let record = Record::for_symbols(&symbols, &params);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get(p), Some(&Entry::Constant(json!("Alice"))));
        assert!(matches!(record.get(0), Some(Entry::Unknown)));
    }

    #[test]
    fn test_merge_overlays_written_slots() {
        let mut lhs = Record::with_size(3);
        lhs.set(0, Entry::Constant(json!(1))).unwrap();
        lhs.set(1, Entry::Constant(json!(2))).unwrap();
        let mut rhs = Record::with_size(4);
        rhs.set(1, Entry::Constant(json!(20))).unwrap();
        rhs.set(3, Entry::Constant(json!(40))).unwrap();

        lhs.merge(&rhs);
        assert_eq!(lhs.len(), 4);
        assert_eq!(lhs.to_string(), "1,20,__null__,40");
    }

    #[test]
    fn test_set_out_of_range_is_internal() {
        let mut record = Record::with_size(1);
        assert!(record.set(5, Entry::Unknown).unwrap_err().is_fatal());
    }

    #[test]
    fn test_is_null() {
        let mut record = Record::with_size(0);
        record.push(Entry::Constant(Value::Null));
        assert!(record.is_null());
        record.push(Entry::Constant(json!(0)));
        assert!(!record.is_null());
    }
}
