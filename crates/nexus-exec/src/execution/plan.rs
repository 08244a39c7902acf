//! Plan driver
//!
//! Owns the root operator of a pipeline, pulls it to depletion and turns the
//! records it produces into output: JSON rows ([`ExecutionPlan::execute`])
//! or a vid-keyed [`DataChunk`] ([`ExecutionPlan::execute_batched`]).

use super::{ExecutionContext, OpResult, Operator};
use crate::graph::PatternGraph;
use crate::resultset::{DataChunk, DataType, Record};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Write as _;
use std::rc::Rc;

/// Column name of the single summary column produced by a top-level
/// mutation
pub const SUMMARY_COLUMN: &str = "<SUMMARY>";

/// Materialized query result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Column names
    pub columns: Vec<String>,
    /// Result rows
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Executable operator tree
pub struct ExecutionPlan {
    pattern: Rc<PatternGraph>,
    root: Box<dyn Operator>,
    columns: Vec<String>,
    initialized: bool,
}

impl ExecutionPlan {
    /// Plan returning `columns` (aliases) from `root`. An empty column list
    /// returns every alias in slot order.
    pub fn new(pattern: Rc<PatternGraph>, root: Box<dyn Operator>, columns: Vec<String>) -> Self {
        let columns = if columns.is_empty() {
            pattern.symbol_table().aliases_by_slot()
        } else {
            columns
        };
        Self {
            pattern,
            root,
            columns,
            initialized: false,
        }
    }

    /// Root operator
    pub fn root(&self) -> &dyn Operator {
        self.root.as_ref()
    }

    /// Pattern graph the plan was built against
    pub fn pattern(&self) -> &PatternGraph {
        &self.pattern
    }

    fn prepare(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        if self.initialized {
            self.root.reset(true)?;
            self.pattern.reset_bindings();
        }
        // a top-level summary rewrites the shared record, so every run
        // starts from a freshly built one
        self.root.initialize(ctx)?;
        self.initialized = true;
        Ok(())
    }

    fn current_record(&self) -> Result<Record> {
        let record = self
            .root
            .record()
            .ok_or_else(|| Error::internal("root operator has no record"))?;
        let row = record.borrow().clone();
        Ok(row)
    }

    /// Run the plan and return every row as a frozen record
    pub fn collect_records(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Vec<Record>> {
        self.prepare(ctx)?;
        let mut rows = Vec::new();
        while self.root.consume(ctx)? == OpResult::Ok {
            let mut row = self.current_record()?;
            row.snapshot()?;
            rows.push(row);
        }
        Ok(rows)
    }

    /// Run the plan and project the configured columns
    pub fn execute(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<ResultTable> {
        self.prepare(ctx)?;
        let summary = ctx.summary && self.root.base().op_type.is_mutation();
        let slots = if summary {
            Vec::new()
        } else {
            self.columns
                .iter()
                .map(|alias| self.pattern.symbol_table().slot(alias))
                .collect::<Result<Vec<_>>>()?
        };

        let mut table = ResultTable {
            columns: if summary {
                vec![SUMMARY_COLUMN.to_string()]
            } else {
                self.columns.clone()
            },
            rows: Vec::new(),
        };
        while self.root.consume(ctx)? == OpResult::Ok {
            let record = self.current_record()?;
            let row = if summary {
                record.values.iter().map(|e| e.to_json()).collect()
            } else {
                slots
                    .iter()
                    .map(|&slot| record.get(slot).map(|e| e.to_json()).unwrap_or(Value::Null))
                    .collect()
            };
            table.rows.push(row);
        }
        tracing::debug!(rows = table.rows.len(), "plan executed");
        Ok(table)
    }

    /// Run the plan and accumulate properties of the vertex bound to
    /// `alias` into a chunk, one column per field
    pub fn execute_batched(
        &mut self,
        ctx: &mut ExecutionContext<'_>,
        alias: &str,
        fields: &[(&str, DataType)],
    ) -> Result<DataChunk> {
        let node = self
            .pattern
            .node_by_alias(alias)
            .ok_or_else(|| Error::input(format!("unknown node alias `{}`", alias)))?
            .id();
        let mut chunk = DataChunk::with_capacity(ctx.config.chunk_capacity);
        for (name, data_type) in fields {
            chunk.add_column(name, *data_type)?;
        }

        self.prepare(ctx)?;
        while self.root.consume(ctx)? == OpResult::Ok {
            let vid = self.pattern.node(node)?.pull_vid();
            if vid < 0 {
                continue;
            }
            for (name, _) in fields {
                let value = ctx.txn.vertex_property(vid, name)?.unwrap_or(Value::Null);
                chunk.push_value(name, vid, &value)?;
            }
        }
        tracing::debug!(rows = chunk.row_count(), "batched plan executed");
        Ok(chunk)
    }

    /// Indented operator tree, root first
    pub fn explain(&self) -> String {
        fn walk(op: &dyn Operator, depth: usize, out: &mut String) {
            let _ = writeln!(out, "{}{}", "    ".repeat(depth), op.describe());
            for child in &op.base().children {
                walk(child.as_ref(), depth + 1, out);
            }
        }
        let mut out = String::new();
        walk(self.root.as_ref(), 0, &mut out);
        out
    }
}
