//! Storage transaction seam
//!
//! The executor never touches pages or KV tables directly; it drives one
//! already-open transaction through [`Transaction`]. Iterators are owned
//! handles: they do not borrow the transaction, and they never revalidate
//! on their own after a mutation. Mutating operators call
//! [`Transaction::refresh_iterators`] once their writes are done.

use crate::Result;
use crate::types::{EdgeUid, VertexId};
use serde_json::Value;
use std::collections::BTreeSet;

/// Edge direction relative to the vertex an iterator starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    /// Edges whose source is the start vertex
    Outgoing,
    /// Edges whose destination is the start vertex
    Incoming,
    /// Both, each edge reported once
    Both,
}

/// Degrees of a vertex at the moment it was deleted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexDegree {
    /// Incident edges pointing at the vertex
    pub in_degree: u64,
    /// Incident edges leaving the vertex
    pub out_degree: u64,
}

impl VertexDegree {
    /// Number of edges removed together with the vertex
    pub fn total(&self) -> u64 {
        self.in_degree + self.out_degree
    }
}

/// Cursor over vertices
pub trait VertexIterator {
    /// True while the cursor points at a vertex
    fn is_valid(&self) -> bool;
    /// Move to the next vertex
    fn advance(&mut self) -> Result<()>;
    /// Id of the current vertex. Only meaningful while valid.
    fn vertex_id(&self) -> VertexId;
}

/// Cursor over edges
pub trait EdgeIterator {
    /// True while the cursor points at an edge
    fn is_valid(&self) -> bool;
    /// Move to the next edge
    fn advance(&mut self) -> Result<()>;
    /// Uid of the current edge. Only meaningful while valid.
    fn uid(&self) -> EdgeUid;
}

/// The storage transaction consumed by the executor
pub trait Transaction {
    /// Open a vertex cursor filtered by label and property equalities
    fn vertex_iterator(
        &mut self,
        label: Option<&str>,
        predicates: &[(String, Value)],
    ) -> Result<Box<dyn VertexIterator>>;

    /// Open an edge cursor around `vid`, filtered by relationship types
    /// (empty set = any type)
    fn edge_iterator(
        &mut self,
        vid: VertexId,
        direction: EdgeDirection,
        types: &BTreeSet<String>,
    ) -> Result<Box<dyn EdgeIterator>>;

    /// Label of a vertex, `None` if the vertex does not exist
    fn vertex_label(&self, vid: VertexId) -> Result<Option<String>>;

    /// One property of a vertex, `None` if absent
    fn vertex_property(&self, vid: VertexId, field: &str) -> Result<Option<Value>>;

    /// Delete one edge. Returns false if it no longer exists.
    fn delete_edge(&mut self, uid: &EdgeUid) -> Result<bool>;

    /// Delete a vertex together with its incident edges. Returns the degrees
    /// removed, or `None` if the vertex no longer exists.
    fn delete_vertex(&mut self, vid: VertexId) -> Result<Option<VertexDegree>>;

    /// Bring every outstanding iterator up to date after a mutation
    fn refresh_iterators(&mut self) -> Result<()>;
}
