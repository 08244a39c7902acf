//! Vertex and relationship deletion
//!
//! Deletion runs in two phases inside a single `consume` call:
//!
//! 1. **collect**: drain the child completely and record the storage id of
//!    every bound delete target. The number of collected ids is checked as
//!    it grows against `ExecConfig::delete_buffer_limit`.
//! 2. **delete**: remove all collected edges, then all collected vertices
//!    (each vertex cascades its remaining edges), then ask the transaction
//!    to refresh outstanding iterators.
//!
//! Nothing is written before the child is exhausted, so a live upstream
//! iterator never observes a partial deletion.

use super::{ExecutionContext, OpBase, OpResult, OpType, Operator};
use crate::graph::PatternGraph;
use crate::resultset::Entry;
use crate::types::{EdgeUid, VertexId};
use crate::{Error, Result};
use serde_json::Value;
use std::rc::Rc;

/// Delete operator
pub struct Delete {
    base: OpBase,
    pattern: Rc<PatternGraph>,
    targets: Vec<String>,
    vertices: Vec<VertexId>,
    edges: Vec<EdgeUid>,
    done: bool,
}

impl Delete {
    /// Delete the vertices / relationships bound to `targets` in every row
    /// of `child`
    pub fn new(
        pattern: Rc<PatternGraph>,
        targets: Vec<String>,
        child: Box<dyn Operator>,
    ) -> Result<Self> {
        let mut base = OpBase::new(OpType::Delete);
        base.add_child(child);
        Ok(Self {
            base,
            pattern,
            targets,
            vertices: Vec::new(),
            edges: Vec::new(),
            done: false,
        })
    }

    /// Aliases whose bindings are deleted
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    fn check_buffer(&self, limit: usize) -> Result<()> {
        let held = self.vertices.len() + self.edges.len();
        if held > limit {
            return Err(Error::not_supported(format!(
                "delete buffer overflow: more than {} vertices and edges to delete",
                limit
            )));
        }
        Ok(())
    }

    fn collect_targets(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        let symbols = self.pattern.symbol_table();
        let slots = self
            .targets
            .iter()
            .map(|alias| symbols.slot(alias))
            .collect::<Result<Vec<_>>>()?;
        let record = self.base.shared_record()?;
        let limit = ctx.config.delete_buffer_limit;

        while self.base.consume_child(ctx)? == OpResult::Ok {
            for (&slot, alias) in slots.iter().zip(&self.targets) {
                let entry = record.borrow().get(slot).cloned().unwrap_or_default();
                match entry {
                    Entry::Node(_) | Entry::Relationship(_) | Entry::Constant(Value::Null)
                        if entry.equal_null() =>
                    {
                        tracing::warn!(alias = alias.as_str(), "delete target is null, skipped");
                    }
                    Entry::Node(node) => self.vertices.push(node.vid()),
                    Entry::Relationship(relp) => {
                        if let Some(uid) = relp.uid() {
                            self.edges.push(uid);
                        }
                    }
                    other => {
                        return Err(Error::input(format!(
                            "cannot delete `{}`: {} is not a node or relationship",
                            alias,
                            other.entry_type()
                        )));
                    }
                }
                self.check_buffer(limit)?;
            }
        }

        self.vertices.sort_unstable();
        self.vertices.dedup();
        self.edges.sort_unstable();
        self.edges.dedup();
        Ok(())
    }

    fn delete_collected(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        for uid in &self.edges {
            if ctx.txn.delete_edge(uid)? {
                ctx.stats.edges_deleted += 1;
            }
        }
        for &vid in &self.vertices {
            if let Some(degree) = ctx.txn.delete_vertex(vid)? {
                ctx.stats.vertices_deleted += 1;
                ctx.stats.edges_deleted += degree.total();
            }
        }
        ctx.txn.refresh_iterators()?;
        Ok(())
    }
}

impl Operator for Delete {
    fn base(&self) -> &OpBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OpBase {
        &mut self.base
    }

    fn initialize(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        self.base.adopt_child_record(ctx)?;
        tracing::debug!(targets = ?self.targets, "delete initialized");
        Ok(())
    }

    fn real_consume(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<OpResult> {
        if self.done {
            return Ok(OpResult::Depleted);
        }
        self.collect_targets(ctx)?;
        self.delete_collected(ctx)?;
        self.done = true;
        tracing::debug!(
            vertices = self.vertices.len(),
            edges = self.edges.len(),
            vertices_deleted = ctx.stats.vertices_deleted,
            edges_deleted = ctx.stats.edges_deleted,
            "delete finished"
        );

        if ctx.summary && self.base.parent.is_none() {
            let record = self.base.shared_record()?;
            let mut record = record.borrow_mut();
            record.values.clear();
            record.push(Entry::Constant(Value::String(ctx.stats.delete_summary())));
        }
        Ok(OpResult::Ok)
    }

    fn reset_impl(&mut self, complete: bool) -> Result<()> {
        self.vertices.clear();
        self.edges.clear();
        if complete {
            self.done = false;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{} [{}]", OpType::Delete, self.targets.join(","))
    }
}
