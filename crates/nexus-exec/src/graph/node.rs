//! Pattern nodes and their runtime vertex binding

use super::property::PropertyPredicate;
use super::{Derivation, NodeId, RelpId};
use crate::types::{INVALID_VID, VertexId};
use std::cell::Cell;
use std::rc::Rc;

/// Shared slot holding the vertex a pattern node is currently bound to.
///
/// Clones share the slot: every Entry built from the same node observes the
/// same binding.
#[derive(Debug, Clone)]
pub struct VertexBinding(Rc<Cell<VertexId>>);

impl Default for VertexBinding {
    fn default() -> Self {
        Self(Rc::new(Cell::new(INVALID_VID)))
    }
}

impl VertexBinding {
    /// Create an unbound slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Current vertex id, negative when unbound
    pub fn get(&self) -> VertexId {
        self.0.get()
    }

    /// Bind to `vid`
    pub fn set(&self, vid: VertexId) {
        self.0.set(vid);
    }

    /// Drop the binding
    pub fn reset(&self) {
        self.0.set(INVALID_VID);
    }

    /// True if bound to a vertex
    pub fn is_bound(&self) -> bool {
        self.0.get() >= 0
    }

    /// True if both handles point at the same slot
    pub fn same_slot(&self, other: &VertexBinding) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A node of the pattern graph
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) labels: Vec<String>,
    pub(crate) alias: String,
    pub(crate) predicates: Vec<PropertyPredicate>,
    pub(crate) derivation: Derivation,
    // positional: relationships where this node is the right / left end
    pub(crate) lhs_relps: Vec<RelpId>,
    pub(crate) rhs_relps: Vec<RelpId>,
    // directional
    pub(crate) out_relps: Vec<RelpId>,
    pub(crate) in_relps: Vec<RelpId>,
    pub(crate) undirected_relps: Vec<RelpId>,
    pub(crate) binding: VertexBinding,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        labels: Vec<String>,
        alias: String,
        predicates: Vec<PropertyPredicate>,
        derivation: Derivation,
    ) -> Self {
        Self {
            id,
            labels,
            alias,
            predicates,
            derivation,
            lhs_relps: Vec::new(),
            rhs_relps: Vec::new(),
            out_relps: Vec::new(),
            in_relps: Vec::new(),
            undirected_relps: Vec::new(),
            binding: VertexBinding::new(),
        }
    }

    /// Index of the node in its pattern graph
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Alias the node is bound to in the record
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// First label, empty if the node is unlabeled
    pub fn label(&self) -> &str {
        self.labels.first().map(String::as_str).unwrap_or("")
    }

    /// All labels
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Property predicates filtering the node
    pub fn predicates(&self) -> &[PropertyPredicate] {
        &self.predicates
    }

    /// Why the node exists
    pub fn derivation(&self) -> Derivation {
        self.derivation
    }

    /// Relationships that have this node on their right-hand side
    pub fn lhs_relps(&self) -> &[RelpId] {
        &self.lhs_relps
    }

    /// Relationships that have this node on their left-hand side
    pub fn rhs_relps(&self) -> &[RelpId] {
        &self.rhs_relps
    }

    /// Directed relationships leaving this node
    pub fn out_relps(&self) -> &[RelpId] {
        &self.out_relps
    }

    /// Directed relationships entering this node
    pub fn in_relps(&self) -> &[RelpId] {
        &self.in_relps
    }

    /// Undirected relationships touching this node
    pub fn undirected_relps(&self) -> &[RelpId] {
        &self.undirected_relps
    }

    /// True if the node has no incident relationship
    pub fn is_isolated(&self) -> bool {
        self.lhs_relps.is_empty() && self.rhs_relps.is_empty()
    }

    /// Handle to the runtime binding
    pub fn binding(&self) -> &VertexBinding {
        &self.binding
    }

    /// Vertex the node is currently bound to
    pub fn pull_vid(&self) -> VertexId {
        self.binding.get()
    }

    /// Bind the node to a vertex
    pub fn push_vid(&self, vid: VertexId) {
        self.binding.set(vid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_is_shared_between_clones() {
        let binding = VertexBinding::new();
        let alias = binding.clone();
        assert!(!alias.is_bound());
        binding.set(42);
        assert_eq!(alias.get(), 42);
        assert!(binding.same_slot(&alias));
        alias.reset();
        assert!(!binding.is_bound());
    }

    #[test]
    fn test_push_pull_vid() {
        let node = Node::new(0, vec!["Person".into()], "n".into(), vec![], Derivation::Matched);
        assert_eq!(node.pull_vid(), INVALID_VID);
        node.push_vid(7);
        assert_eq!(node.pull_vid(), 7);
        assert_eq!(node.label(), "Person");
        assert!(node.is_isolated());
    }
}
