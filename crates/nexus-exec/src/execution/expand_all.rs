//! Fixed-length expand
//!
//! For every row of the child, walks the edges of the bound start vertex
//! and binds the relationship and the neighbor once per matching edge. An
//! edge already bound earlier in the same path is skipped.

use super::{
    ExecutionContext, HandOff, OpBase, OpResult, OpType, Operator, edge_direction, far_end,
    vertex_matches,
};
use crate::graph::{Node, NodeId, PatternGraph, Relationship, RelpId};
use crate::resultset::Entry;
use crate::storage::{EdgeDirection, EdgeIterator};
use crate::types::EdgeUid;
use crate::{Error, Result, exec_assert};
use std::rc::Rc;

/// Fixed-length expand operator
pub struct ExpandAll {
    base: OpBase,
    pattern: Rc<PatternGraph>,
    start: NodeId,
    neighbor: NodeId,
    relationship: RelpId,
    direction: EdgeDirection,
    iter: Option<Box<dyn EdgeIterator>>,
    // edge bound by the last result, released on advance
    current: Option<EdgeUid>,
}

impl ExpandAll {
    /// Expand from `start` through `relationship`, once per row of `child`
    pub fn new(
        pattern: Rc<PatternGraph>,
        start: NodeId,
        relationship: RelpId,
        child: Box<dyn Operator>,
    ) -> Result<Self> {
        let relp = pattern.relationship(relationship)?;
        exec_assert!(
            relp.lhs() == start || relp.rhs() == start,
            "`{}` does not touch node {}",
            relp.alias(),
            start
        );
        exec_assert!(
            !relp.var_len(),
            "`{}` is variable-length; use VarLenExpand",
            relp.alias()
        );
        if !relp.predicates().is_empty() {
            return Err(Error::not_supported(format!(
                "property filter on relationship `{}`",
                relp.alias()
            )));
        }
        let start_node = pattern.node(start)?;
        let direction = edge_direction(relp, start_node);
        let neighbor = relp.neighbor_of(start);

        let mut base = OpBase::new(OpType::ExpandAll);
        base.add_child(child);
        Ok(Self {
            base,
            pattern,
            start,
            neighbor,
            relationship,
            direction,
            iter: None,
            current: None,
        })
    }

    fn relp(&self) -> Result<&Relationship> {
        self.pattern.relationship(self.relationship)
    }

    fn neighbor_node(&self) -> Result<&Node> {
        self.pattern.node(self.neighbor)
    }

    fn release_current(&mut self) {
        if let Some(uid) = self.current.take() {
            self.pattern.unvisit_edge(&uid);
        }
    }

    fn unbind(&mut self) -> Result<()> {
        self.release_current();
        self.relp()?.binding().reset();
        self.neighbor_node()?.binding().reset();
        Ok(())
    }

    /// Move the iterator forward to the first acceptable edge, starting at
    /// its current position, and bind it. Returns false when exhausted.
    fn seek(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<bool> {
        let start_vid = self.pattern.node(self.start)?.pull_vid();
        let record = self.base.shared_record()?;
        let track = ctx.config.track_visited_edges;
        let Some(iter) = self.iter.as_mut() else {
            return Ok(false);
        };
        while iter.is_valid() {
            let uid = iter.uid();
            let nbr_vid = far_end(&uid, start_vid, self.direction);
            let fresh = !track || !self.pattern.is_edge_visited(&uid);
            let neighbor = self.pattern.node(self.neighbor)?;
            if fresh
                && vertex_matches(
                    &*ctx.txn,
                    neighbor,
                    nbr_vid,
                    &record.borrow(),
                    self.pattern.symbol_table(),
                    &ctx.params,
                )?
            {
                self.pattern.relationship(self.relationship)?.binding().set(uid);
                neighbor.push_vid(nbr_vid);
                if track {
                    self.pattern.visit_edge(uid);
                    self.current = Some(uid);
                }
                return Ok(true);
            }
            iter.advance()?;
        }
        self.iter = None;
        Ok(false)
    }

    fn hand_off(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<HandOff> {
        self.release_current();
        match self.iter.as_mut() {
            Some(it) => it.advance()?,
            None => return Ok(HandOff::Refresh),
        }
        if self.seek(ctx)? {
            Ok(HandOff::Ready)
        } else {
            Ok(HandOff::Refresh)
        }
    }
}

impl Operator for ExpandAll {
    fn base(&self) -> &OpBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OpBase {
        &mut self.base
    }

    fn initialize(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        let record = self.base.adopt_child_record(ctx)?;
        let symbols = self.pattern.symbol_table();
        let relp = self.relp()?;
        let neighbor = self.neighbor_node()?;
        let mut record = record.borrow_mut();
        record.set(symbols.slot(neighbor.alias())?, Entry::node(neighbor))?;
        record.set(symbols.slot(relp.alias())?, Entry::relationship(relp))?;
        tracing::debug!(relationship = relp.alias(), "expand initialized");
        Ok(())
    }

    fn real_consume(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<OpResult> {
        loop {
            if self.hand_off(ctx)? == HandOff::Ready {
                return Ok(OpResult::Ok);
            }
            if self.base.consume_child(ctx)? == OpResult::Depleted {
                self.unbind()?;
                return Ok(OpResult::Depleted);
            }
            let start_vid = self.pattern.node(self.start)?.pull_vid();
            if start_vid < 0 {
                continue;
            }
            let types = self.relp()?.types().clone();
            self.iter = Some(ctx.txn.edge_iterator(start_vid, self.direction, &types)?);
            if self.seek(ctx)? {
                return Ok(OpResult::Ok);
            }
        }
    }

    fn reset_impl(&mut self, _complete: bool) -> Result<()> {
        self.iter = None;
        self.unbind()
    }

    fn describe(&self) -> String {
        let (Ok(relp), Ok(start), Ok(neighbor)) = (
            self.relp(),
            self.pattern.node(self.start),
            self.neighbor_node(),
        ) else {
            return format!("{} [?]", OpType::ExpandAll);
        };
        let arrow = match self.direction {
            EdgeDirection::Outgoing => "-->",
            EdgeDirection::Incoming => "<--",
            EdgeDirection::Both => "--",
        };
        format!(
            "{} [{} {} {}] ({})",
            OpType::ExpandAll,
            start.alias(),
            arrow,
            neighbor.alias(),
            relp.alias()
        )
    }
}
