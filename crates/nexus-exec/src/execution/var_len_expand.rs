//! Variable-length expand
//!
//! For every row of the child, walks the paths of `min_hop..=max_hop`
//! edges from the bound start vertex depth-first and yields each one as
//! soon as it is reached. The search keeps an explicit stack of edge
//! cursors, one per vertex on the current path, and resumes where it left
//! off on the next consume. A path never reuses an edge, neither its own
//! nor one bound earlier in the pattern.

use super::{
    ExecutionContext, HandOff, OpBase, OpResult, OpType, Operator, edge_direction, far_end,
    vertex_matches,
};
use crate::graph::{NodeId, Path, PatternGraph, Relationship, RelpId};
use crate::resultset::Entry;
use crate::storage::{EdgeDirection, EdgeIterator};
use crate::types::{EdgeUid, VertexId};
use crate::{Error, Result, exec_assert};
use std::collections::HashSet;
use std::rc::Rc;

/// One vertex on the path being extended
struct Frame {
    vid: VertexId,
    // `None` once the path reached `max_hop` at this vertex
    edges: Option<Box<dyn EdgeIterator>>,
}

/// Variable-length expand operator
pub struct VarLenExpand {
    base: OpBase,
    pattern: Rc<PatternGraph>,
    start: NodeId,
    neighbor: NodeId,
    relationship: RelpId,
    direction: EdgeDirection,
    min_hop: usize,
    max_hop: usize,
    stack: Vec<Frame>,
    // path from the start vertex to the top frame
    path: Path,
    on_path: HashSet<EdgeUid>,
    // vertex reached by the last pushed edge, not yet expanded
    arrived: Option<VertexId>,
    // `path` is bound and, when tracking, its edges are marked visited
    bound: bool,
}

impl VarLenExpand {
    /// Expand from `start` through the variable-length `relationship`, once
    /// per row of `child`
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
            Relationship::check_var_len(relp.min_hop(), relp.max_hop()),
            "`{}` is not a valid variable-length relationship",
            relp.alias()
        );
        if !relp.predicates().is_empty() {
            return Err(Error::not_supported(format!(
                "property filter on relationship `{}`",
                relp.alias()
            )));
        }
        let direction = edge_direction(relp, pattern.node(start)?);
        let neighbor = relp.neighbor_of(start);
        let min_hop = relp.min_hop() as usize;
        let max_hop = relp.max_hop() as usize;

        let mut base = OpBase::new(OpType::VarLenExpand);
        base.add_child(child);
        Ok(Self {
            base,
            pattern,
            start,
            neighbor,
            relationship,
            direction,
            min_hop,
            max_hop,
            stack: Vec::new(),
            path: Path::default(),
            on_path: HashSet::new(),
            arrived: None,
            bound: false,
        })
    }

    fn release_current(&mut self) {
        if std::mem::take(&mut self.bound) {
            for uid in self.path.edges() {
                self.pattern.unvisit_edge(uid);
            }
        }
    }

    fn clear_walk(&mut self) {
        self.stack.clear();
        self.path.clear();
        self.on_path.clear();
        self.arrived = None;
    }

    fn begin_walk(&mut self, start_vid: VertexId) {
        self.clear_walk();
        self.path = Path::new(start_vid);
        self.arrived = Some(start_vid);
    }

    fn unbind(&mut self) -> Result<()> {
        self.release_current();
        self.clear_walk();
        self.pattern.relationship(self.relationship)?.path().reset();
        self.pattern.node(self.neighbor)?.binding().reset();
        Ok(())
    }

    /// Resume the search. Returns the end vertex of the next path in range,
    /// or `None` once every path from the start vertex was visited.
    fn next_path(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<Option<VertexId>> {
        let pattern = Rc::clone(&self.pattern);
        let record = self.base.shared_record()?;
        let record = record.borrow();
        let neighbor = pattern.node(self.neighbor)?;
        let types = pattern.relationship(self.relationship)?.types();
        let track = ctx.config.track_visited_edges;

        loop {
            if let Some(vid) = self.arrived.take() {
                let hops = self.path.len();
                let edges = if hops < self.max_hop {
                    Some(ctx.txn.edge_iterator(vid, self.direction, types)?)
                } else {
                    None
                };
                self.stack.push(Frame { vid, edges });
                if hops >= self.min_hop
                    && vertex_matches(
                        &*ctx.txn,
                        neighbor,
                        vid,
                        &record,
                        pattern.symbol_table(),
                        &ctx.params,
                    )?
                {
                    return Ok(Some(vid));
                }
                continue;
            }

            let Some(frame) = self.stack.last_mut() else {
                return Ok(None);
            };
            let mut step = None;
            if let Some(edges) = frame.edges.as_mut() {
                while edges.is_valid() {
                    let uid = edges.uid();
                    edges.advance()?;
                    let reused =
                        self.on_path.contains(&uid) || (track && pattern.is_edge_visited(&uid));
                    if !reused {
                        step = Some((uid, far_end(&uid, frame.vid, self.direction)));
                        break;
                    }
                }
            }
            match step {
                Some((uid, vid)) => {
                    self.path.push(uid);
                    self.on_path.insert(uid);
                    self.arrived = Some(vid);
                }
                None => {
                    // backtrack; the path holds one edge less than the stack
                    // holds frames, so the root pops nothing
                    self.stack.pop();
                    if let Some(uid) = self.path.pop() {
                        self.on_path.remove(&uid);
                    }
                }
            }
        }
    }

    fn hand_off(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<HandOff> {
        self.release_current();
        let Some(end) = self.next_path(ctx)? else {
            return Ok(HandOff::Refresh);
        };
        if ctx.config.track_visited_edges {
            for uid in self.path.edges() {
                self.pattern.visit_edge(*uid);
            }
        }
        self.pattern
            .relationship(self.relationship)?
            .path()
            .set(self.path.clone());
        self.pattern.node(self.neighbor)?.push_vid(end);
        self.bound = true;
        tracing::trace!(hops = self.path.len(), end, "variable-length path bound");
        Ok(HandOff::Ready)
    }
}

impl Operator for VarLenExpand {
    fn base(&self) -> &OpBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut OpBase {
        &mut self.base
    }

    fn initialize(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()> {
        let record = self.base.adopt_child_record(ctx)?;
        let symbols = self.pattern.symbol_table();
        let relp = self.pattern.relationship(self.relationship)?;
        let neighbor = self.pattern.node(self.neighbor)?;
        let mut record = record.borrow_mut();
        record.set(symbols.slot(neighbor.alias())?, Entry::node(neighbor))?;
        record.set(symbols.slot(relp.alias())?, Entry::relationship(relp))?;
        tracing::debug!(
            relationship = relp.alias(),
            min_hop = self.min_hop,
            max_hop = self.max_hop,
            "variable-length expand initialized"
        );
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
            if start_vid >= 0 {
                self.begin_walk(start_vid);
            }
        }
    }

    fn reset_impl(&mut self, _complete: bool) -> Result<()> {
        self.unbind()
    }

    fn describe(&self) -> String {
        match (
            self.pattern.relationship(self.relationship),
            self.pattern.node(self.start),
            self.pattern.node(self.neighbor),
        ) {
            (Ok(relp), Ok(start), Ok(neighbor)) => format!(
                "{} [{} -[{}*{}..{}]- {}]",
                OpType::VarLenExpand,
                start.alias(),
                relp.alias(),
                self.min_hop,
                self.max_hop,
                neighbor.alias()
            ),
            _ => format!("{} [?]", OpType::VarLenExpand),
        }
    }
}
