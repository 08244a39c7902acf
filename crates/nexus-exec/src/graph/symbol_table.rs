//! Alias to record-slot mapping built at plan time

use crate::{Error, Result};
use std::collections::HashMap;

/// What an alias names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    /// Constant value
    Constant,
    /// Pattern node
    Node,
    /// Pattern relationship
    Relationship,
    /// Query parameter
    Parameter,
    /// Named path
    NamedPath,
}

/// Where an alias was introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    /// Bound by the current query part
    Local,
    /// Handed over from a previous query part
    Argument,
    /// Derived from an argument
    DerivedArgument,
}

/// One symbol table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolNode {
    /// Record slot
    pub id: usize,
    /// Symbol type
    pub symbol_type: SymbolType,
    /// Symbol scope
    pub scope: SymbolScope,
}

/// Alias → slot map. Read-only once planning is over.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, SymbolNode>,
}

impl SymbolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alias and return its slot. Registering an alias twice
    /// keeps the first slot.
    pub fn insert(
        &mut self,
        alias: impl Into<String>,
        symbol_type: SymbolType,
        scope: SymbolScope,
    ) -> usize {
        let next = self.symbols.len();
        self.symbols
            .entry(alias.into())
            .or_insert(SymbolNode {
                id: next,
                symbol_type,
                scope,
            })
            .id
    }

    /// Look up an alias
    pub fn get(&self, alias: &str) -> Option<&SymbolNode> {
        self.symbols.get(alias)
    }

    /// Slot of an alias. A missing alias is a planner bug.
    pub fn slot(&self, alias: &str) -> Result<usize> {
        self.symbols
            .get(alias)
            .map(|s| s.id)
            .ok_or_else(|| Error::internal(format!("alias `{}` missing from symbol table", alias)))
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True if no alias is registered
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over aliases and their entries
    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolNode)> {
        self.symbols.iter()
    }

    /// Aliases ordered by slot
    pub fn aliases_by_slot(&self) -> Vec<String> {
        let mut entries: Vec<_> = self.symbols.iter().collect();
        entries.sort_by_key(|(_, s)| s.id);
        entries.into_iter().map(|(a, _)| a.clone()).collect()
    }
}
