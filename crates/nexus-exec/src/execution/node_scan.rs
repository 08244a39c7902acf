//! Vertex scan
//!
//! As a leaf, yields one row per vertex matching the node's label and
//! property predicates. With a child it is the inner side of a nested
//! loop: for every row the child produces, predicates are re-evaluated
//! against that row and a fresh vertex iterator is opened. The inner
//! iterator is drained before the child is pulled again.

use super::{ExecutionContext, HandOff, OpBase, OpResult, OpType, Operator, Params, single_label};
use crate::Result;
use crate::graph::{Node, NodeId, PatternGraph, PropertyValue};
use crate::resultset::{Entry, Record};
use crate::storage::VertexIterator;
use serde_json::Value;
use std::rc::Rc;

/// Vertex scan operator
pub struct NodeScan {
    base: OpBase,
    pattern: Rc<PatternGraph>,
    node: NodeId,
    iter: Option<Box<dyn VertexIterator>>,
    // memoized on first use, cleared by reset
    label: Option<Option<String>>,
    constant_filter: Option<Vec<(String, Value)>>,
}

impl NodeScan {
    /// Scan for `node` as a pipeline leaf
    pub fn new(pattern: Rc<PatternGraph>, node: NodeId) -> Result<Self> {
        pattern.node(node)?;
        Ok(Self {
            base: OpBase::new(OpType::NodeScan),
            pattern,
            node,
            iter: None,
            label: None,
            constant_filter: None,
        })
    }

    /// Scan for `node` once per row produced by `child`
    pub fn with_child(
        pattern: Rc<PatternGraph>,
        node: NodeId,
        child: Box<dyn Operator>,
    ) -> Result<Self> {
        let mut op = Self::new(pattern, node)?;
        op.base.add_child(child);
        Ok(op)
    }

    fn pattern_node(&self) -> Result<&Node> {
        self.pattern.node(self.node)
    }

    fn resolve_label(&mut self) -> Result<Option<String>> {
        if let Some(label) = &self.label {
            return Ok(label.clone());
        }
        let label = single_label(self.pattern_node()?)?;
        self.label = Some(label.clone());
        Ok(label)
    }

    /// Literal and parameter predicates are evaluated once; variable
    /// predicates are evaluated against the current row.
    fn resolve_filter(
        &mut self,
        record: &Record,
        params: &Params,
    ) -> Result<Vec<(String, Value)>> {
        let node = self.pattern.node(self.node)?;
        let symbols = self.pattern.symbol_table();
        if self.constant_filter.is_none() {
            let mut constants = Vec::new();
            for predicate in node.predicates().iter().filter(|p| p.is_constant()) {
                constants.push((
                    predicate.field.clone(),
                    predicate.evaluate(Some(record), symbols, params)?,
                ));
            }
            self.constant_filter = Some(constants);
        }
        let mut filter = self.constant_filter.clone().unwrap_or_default();
        for predicate in node.predicates() {
            if let PropertyValue::Variable(_) = predicate.value {
                filter.push((
                    predicate.field.clone(),
                    predicate.evaluate(Some(record), symbols, params)?,
                ));
            }
        }
        Ok(filter)
    }

    fn open_iterator(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        let label = self.resolve_label()?;
        let record = self.base.shared_record()?;
        let filter = self.resolve_filter(&record.borrow(), &ctx.params)?;
        tracing::trace!(
            alias = self.pattern_node()?.alias(),
            label = ?label,
            predicates = filter.len(),
            "opening vertex iterator"
        );
        self.iter = Some(ctx.txn.vertex_iterator(label.as_deref(), &filter)?);
        Ok(())
    }

    /// Bind the node to the iterator's current vertex, or unbind and drop
    /// the iterator if it is exhausted
    fn bind_current(&mut self) -> Result<bool> {
        let current = self
            .iter
            .as_ref()
            .filter(|it| it.is_valid())
            .map(|it| it.vertex_id());
        match current {
            Some(vid) => {
                self.pattern_node()?.push_vid(vid);
                Ok(true)
            }
            None => {
                self.iter = None;
                self.pattern_node()?.binding().reset();
                Ok(false)
            }
        }
    }

    fn hand_off(&mut self) -> Result<HandOff> {
        match self.iter.as_mut() {
            Some(it) => it.advance()?,
            None => return Ok(HandOff::Refresh),
        }
        if self.bind_current()? {
            Ok(HandOff::Ready)
        } else {
            Ok(HandOff::Refresh)
        }
    }

    fn no_child_real_consume(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<OpResult> {
        if self.iter.is_none() {
            self.open_iterator(ctx)?;
            return Ok(if self.bind_current()? {
                OpResult::Ok
            } else {
                OpResult::Depleted
            });
        }
        match self.hand_off()? {
            HandOff::Ready => Ok(OpResult::Ok),
            HandOff::Refresh => Ok(OpResult::Depleted),
        }
    }

    fn with_child_real_consume(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<OpResult> {
        loop {
            if self.hand_off()? == HandOff::Ready {
                return Ok(OpResult::Ok);
            }
            if self.base.consume_child(ctx)? == OpResult::Depleted {
                self.pattern_node()?.binding().reset();
                return Ok(OpResult::Depleted);
            }
            self.open_iterator(ctx)?;
            if self.bind_current()? {
                return Ok(OpResult::Ok);
            }
        }
    }
}

impl Operator for NodeScan {
    fn base(&self) -> &OpBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OpBase {
        &mut self.base
    }

    fn initialize(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        let entry = Entry::node(self.pattern_node()?);
        let slot = self.pattern.symbol_table().slot(self.pattern_node()?.alias())?;
        let record = if self.base.children.is_empty() {
            let record =
                Record::for_symbols(self.pattern.symbol_table(), &ctx.params).into_shared();
            self.base.record = Some(record.clone());
            record
        } else {
            self.base.adopt_child_record(ctx)?
        };
        record.borrow_mut().set(slot, entry)?;
        tracing::debug!(
            alias = self.pattern_node()?.alias(),
            nested = !self.base.children.is_empty(),
            "node scan initialized"
        );
        Ok(())
    }

    fn real_consume(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<OpResult> {
        let res = if self.base.children.is_empty() {
            self.no_child_real_consume(ctx)?
        } else {
            self.with_child_real_consume(ctx)?
        };
        if res == OpResult::Ok {
            tracing::trace!(
                alias = self.pattern_node()?.alias(),
                vid = self.pattern_node()?.pull_vid(),
                "node scan row"
            );
        }
        Ok(res)
    }

    fn reset_impl(&mut self, _complete: bool) -> Result<()> {
        self.iter = None;
        self.label = None;
        self.constant_filter = None;
        self.pattern_node()?.binding().reset();
        tracing::debug!(alias = self.pattern_node()?.alias(), "node scan reset");
        Ok(())
    }

    fn describe(&self) -> String {
        match self.pattern.node(self.node) {
            Ok(node) if node.labels().is_empty() => {
                format!("{} [{}]", OpType::NodeScan, node.alias())
            }
            Ok(node) => format!(
                "{} [{}:{}]",
                OpType::NodeScan,
                node.alias(),
                node.labels().join(":")
            ),
            Err(_) => format!("{} [?]", OpType::NodeScan),
        }
    }
}
