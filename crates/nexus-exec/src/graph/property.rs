//! Property equality predicates attached to pattern nodes and relationships

use super::symbol_table::SymbolTable;
use crate::execution::Params;
use crate::resultset::{Entry, Record};
use crate::{Error, Result};
use serde_json::Value;
use std::fmt;

/// Right-hand side of a `{field: value}` predicate
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Constant known at plan time
    Literal(Value),
    /// `$name` query parameter
    Parameter(String),
    /// Alias bound earlier in the record
    Variable(String),
}

/// `{field: value}` equality filter
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyPredicate {
    /// Property name
    pub field: String,
    /// Value to compare against
    pub value: PropertyValue,
}

impl PropertyPredicate {
    /// Compare `field` against a literal
    pub fn literal(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            value: PropertyValue::Literal(value),
        }
    }

    /// Compare `field` against a query parameter
    pub fn parameter(field: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: PropertyValue::Parameter(name.into()),
        }
    }

    /// Compare `field` against a value bound under `alias`
    pub fn variable(field: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: PropertyValue::Variable(alias.into()),
        }
    }

    /// True if the value does not depend on the current record
    pub fn is_constant(&self) -> bool {
        !matches!(self.value, PropertyValue::Variable(_))
    }

    /// Resolve the predicate to a concrete value.
    ///
    /// Variables must resolve to a CONSTANT entry; anything else is not
    /// supported as a scan filter.
    pub fn evaluate(
        &self,
        record: Option<&Record>,
        symbols: &SymbolTable,
        params: &Params,
    ) -> Result<Value> {
        match &self.value {
            PropertyValue::Literal(v) => Ok(v.clone()),
            PropertyValue::Parameter(name) => params
                .get(name)
                .cloned()
                .ok_or_else(|| Error::input(format!("missing parameter ${}", name))),
            PropertyValue::Variable(alias) => {
                let slot = symbols.slot(alias)?;
                let entry = record
                    .and_then(|r| r.get(slot))
                    .ok_or_else(|| Error::input(format!("variable `{}` is not bound", alias)))?;
                match entry {
                    Entry::Constant(v) => Ok(v.clone()),
                    other => Err(Error::not_supported(format!(
                        "non-constant filter on `{}`: {} is {:?}",
                        self.field,
                        alias,
                        other.entry_type()
                    ))),
                }
            }
        }
    }
}

impl fmt::Display for PropertyPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            PropertyValue::Literal(v) => write!(f, "{{{}: {}}}", self.field, v),
            PropertyValue::Parameter(p) => write!(f, "{{{}: ${}}}", self.field, p),
            PropertyValue::Variable(a) => write!(f, "{{{}: {}}}", self.field, a),
        }
    }
}
