//! Pull-based operator pipeline
//!
//! Operators form a tree. The root is pulled with [`Operator::consume`];
//! each call leaves one more result in the shared [`SharedRecord`] and
//! returns [`OpResult::Ok`], or returns [`OpResult::Depleted`] once the
//! stream is exhausted. Depletion is terminal until [`Operator::reset`].
//!
//! Leaf operators allocate the record in [`Operator::initialize`]; every
//! other operator adopts its child's record by reference, so one record is
//! shared by a whole scan chain and each slot has a single writer.

pub mod context;
pub mod delete;
pub mod expand_all;
pub mod node_scan;
pub mod plan;
pub mod var_len_expand;

pub use context::{ExecutionContext, Params};
pub use delete::Delete;
pub use expand_all::ExpandAll;
pub use node_scan::NodeScan;
pub use plan::{ExecutionPlan, ResultTable, SUMMARY_COLUMN};
pub use var_len_expand::VarLenExpand;

use crate::Result;
use crate::graph::{Node, Relationship, SymbolTable};
use crate::resultset::{Record, SharedRecord};
use crate::storage::{EdgeDirection, Transaction};
use crate::types::{EdgeUid, VertexId};
use crate::{Error, exec_assert};
use std::fmt;

/// Outcome of one [`Operator::consume`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpResult {
    /// One more result is in the record
    Ok,
    /// The stream is exhausted
    Depleted,
}

/// Result of a scan operator trying to resume its current iterator.
/// Never leaves the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HandOff {
    /// The iterator produced another match
    Ready,
    /// The iterator is exhausted; pull the child and rebuild
    Refresh,
}

/// Operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpType {
    /// Vertex scan
    NodeScan,
    /// Fixed-length expand
    ExpandAll,
    /// Variable-length expand
    VarLenExpand,
    /// Vertex / edge deletion
    Delete,
}

impl OpType {
    /// True for operators that write to storage
    pub fn is_mutation(&self) -> bool {
        matches!(self, OpType::Delete)
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpType::NodeScan => "Node Scan",
            OpType::ExpandAll => "Expand(All)",
            OpType::VarLenExpand => "Variable Length Expand",
            OpType::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// Stream state of an operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Not consumed yet
    Uninitialized,
    /// Produced at least one result
    Consuming,
    /// Reset since the last result
    Resetted,
    /// Exhausted
    Depleted,
}

/// State shared by every operator
pub struct OpBase {
    /// Operator kind
    pub op_type: OpType,
    /// Kind of the parent operator, `None` for the root
    pub parent: Option<OpType>,
    /// Child operators
    pub children: Vec<Box<dyn Operator>>,
    /// Record of the scan chain, set by `initialize`
    pub record: Option<SharedRecord>,
    /// Stream state
    pub state: StreamState,
    /// Results produced since the last complete reset
    pub rows_produced: u64,
}

impl OpBase {
    /// Base without children
    pub fn new(op_type: OpType) -> Self {
        Self {
            op_type,
            parent: None,
            children: Vec::new(),
            record: None,
            state: StreamState::Uninitialized,
            rows_produced: 0,
        }
    }

    /// Attach a child and record this operator as its parent
    pub fn add_child(&mut self, mut child: Box<dyn Operator>) {
        child.base_mut().parent = Some(self.op_type);
        self.children.push(child);
    }

    /// Shared record, which must have been set by `initialize`
    pub fn shared_record(&self) -> Result<SharedRecord> {
        self.record
            .clone()
            .ok_or_else(|| Error::internal(format!("{} consumed before initialize", self.op_type)))
    }

    /// Initialize the single child and adopt its record
    pub fn adopt_child_record(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<SharedRecord> {
        exec_assert!(
            self.children.len() == 1,
            "{} expects one child, got {}",
            self.op_type,
            self.children.len()
        );
        let child = &mut self.children[0];
        child.initialize(ctx)?;
        let record = child
            .record()
            .ok_or_else(|| Error::internal("child operator produced no record"))?;
        self.record = Some(record.clone());
        Ok(record)
    }

    /// Pull the single child
    pub fn consume_child(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<OpResult> {
        match self.children.first_mut() {
            Some(child) => child.consume(ctx),
            None => Err(Error::internal(format!("{} has no child", self.op_type))),
        }
    }
}

/// A pull-based pipeline stage
pub trait Operator {
    /// Shared state
    fn base(&self) -> &OpBase;

    /// Shared state, mutable
    fn base_mut(&mut self) -> &mut OpBase;

    /// Prepare the operator and its subtree. Leaves allocate the record,
    /// other operators adopt their child's.
    fn initialize(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<()>;

    /// Produce the next result
    fn real_consume(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<OpResult>;

    /// Operator-specific part of [`Operator::reset`]
    fn reset_impl(&mut self, complete: bool) -> Result<()>;

    /// One-line description used by plan explanations
    fn describe(&self) -> String;

    /// Produce the next result. Once depleted, every further call returns
    /// [`OpResult::Depleted`] without touching the operator.
    fn consume(&mut self, ctx: &mut ExecutionContext<'_>) -> Result<OpResult> {
        if self.base().state == StreamState::Depleted {
            return Ok(OpResult::Depleted);
        }
        let res = self.real_consume(ctx)?;
        let base = self.base_mut();
        match res {
            OpResult::Ok => {
                base.state = StreamState::Consuming;
                base.rows_produced += 1;
            }
            OpResult::Depleted => {
                base.state = StreamState::Depleted;
                tracing::debug!(
                    op = %base.op_type,
                    rows = base.rows_produced,
                    "operator depleted"
                );
            }
        }
        Ok(res)
    }

    /// Rewind the subtree so it can be consumed again. `complete` also
    /// clears per-execution counters.
    fn reset(&mut self, complete: bool) -> Result<()> {
        for child in self.base_mut().children.iter_mut() {
            child.reset(complete)?;
        }
        self.reset_impl(complete)?;
        let base = self.base_mut();
        base.state = StreamState::Resetted;
        if complete {
            base.rows_produced = 0;
        }
        Ok(())
    }

    /// Record of the scan chain
    fn record(&self) -> Option<SharedRecord> {
        self.base().record.clone()
    }
}

/// Storage direction to walk `relationship` starting from `start`
pub(crate) fn edge_direction(relationship: &Relationship, start: &Node) -> EdgeDirection {
    if relationship.undirected() {
        EdgeDirection::Both
    } else if relationship.src() == start.id() {
        EdgeDirection::Outgoing
    } else {
        EdgeDirection::Incoming
    }
}

/// Endpoint reached from `from` over `uid`
pub(crate) fn far_end(uid: &EdgeUid, from: VertexId, direction: EdgeDirection) -> VertexId {
    match direction {
        EdgeDirection::Outgoing => uid.dst,
        EdgeDirection::Incoming => uid.src,
        EdgeDirection::Both => uid.other_end(from),
    }
}

/// The single label a scan may filter on. Multi-label patterns are not
/// supported.
pub(crate) fn single_label(node: &Node) -> Result<Option<String>> {
    match node.labels() {
        [] => Ok(None),
        [label] => Ok(Some(label.clone())),
        labels => Err(Error::not_supported(format!(
            "multiple labels on `{}`: {}",
            node.alias(),
            labels.join(":")
        ))),
    }
}

/// True if vertex `vid` satisfies the label and property predicates of
/// `node`
pub(crate) fn vertex_matches(
    txn: &dyn Transaction,
    node: &Node,
    vid: VertexId,
    record: &Record,
    symbols: &SymbolTable,
    params: &Params,
) -> Result<bool> {
    if let Some(label) = single_label(node)? {
        if txn.vertex_label(vid)?.as_deref() != Some(label.as_str()) {
            return Ok(false);
        }
    }
    for predicate in node.predicates() {
        let expected = predicate.evaluate(Some(record), symbols, params)?;
        if txn.vertex_property(vid, &predicate.field)? != Some(expected) {
            return Ok(false);
        }
    }
    Ok(true)
}
