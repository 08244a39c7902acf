//! Pattern relationships and their runtime bindings

use super::path::Path;
use super::property::PropertyPredicate;
use super::{Derivation, NodeId, RelpId};
use crate::types::EdgeUid;
use std::cell::{Cell, Ref, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

/// Direction written in the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDirection {
    /// `(lhs)-->(rhs)`
    LeftToRight,
    /// `(lhs)<--(rhs)`
    RightToLeft,
    /// `(lhs)--(rhs)`
    Undirected,
    /// Not known yet
    Unknown,
}

impl LinkDirection {
    /// Arrow used by graph dumps
    pub fn arrow(&self) -> &'static str {
        match self {
            Self::LeftToRight => "-->",
            Self::RightToLeft => "<--",
            Self::Undirected | Self::Unknown => "--",
        }
    }
}

/// Shared slot holding the edge a fixed-length relationship is bound to
#[derive(Debug, Clone, Default)]
pub struct EdgeBinding(Rc<Cell<Option<EdgeUid>>>);

impl EdgeBinding {
    /// Create an unbound slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Current edge
    pub fn get(&self) -> Option<EdgeUid> {
        self.0.get()
    }

    /// Bind to `uid`
    pub fn set(&self, uid: EdgeUid) {
        self.0.set(Some(uid));
    }

    /// Drop the binding
    pub fn reset(&self) {
        self.0.set(None);
    }

    /// True if bound
    pub fn is_bound(&self) -> bool {
        self.0.get().is_some()
    }
}

/// Shared slot holding the path a variable-length relationship is bound to
#[derive(Debug, Clone, Default)]
pub struct PathBinding(Rc<RefCell<Path>>);

impl PathBinding {
    /// Create an empty path slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow the current path
    pub fn borrow(&self) -> Ref<'_, Path> {
        self.0.borrow()
    }

    /// Replace the current path
    pub fn set(&self, path: Path) {
        *self.0.borrow_mut() = path;
    }

    /// Drop the binding
    pub fn reset(&self) {
        self.0.borrow_mut().clear();
    }

    /// Copy of the current path
    pub fn snapshot(&self) -> Path {
        self.0.borrow().clone()
    }
}

/// A relationship of the pattern graph
#[derive(Debug, Clone)]
pub struct Relationship {
    pub(crate) id: RelpId,
    pub(crate) types: BTreeSet<String>,
    pub(crate) lhs: NodeId,
    pub(crate) rhs: NodeId,
    pub(crate) direction: LinkDirection,
    pub(crate) alias: String,
    pub(crate) min_hop: i32,
    pub(crate) max_hop: i32,
    pub(crate) derivation: Derivation,
    pub(crate) predicates: Vec<PropertyPredicate>,
    pub(crate) binding: EdgeBinding,
    pub(crate) path: PathBinding,
}

impl Relationship {
    /// Valid hop range: `min_hop >= 0` and `max_hop >= min_hop`
    pub fn check_var_len(min_hop: i32, max_hop: i32) -> bool {
        min_hop >= 0 && max_hop >= min_hop
    }

    /// Index of the relationship in its pattern graph
    pub fn id(&self) -> RelpId {
        self.id
    }

    /// Relationship types, empty = any
    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    /// Left-hand node as written
    pub fn lhs(&self) -> NodeId {
        self.lhs
    }

    /// Right-hand node as written
    pub fn rhs(&self) -> NodeId {
        self.rhs
    }

    /// Direction as written
    pub fn direction(&self) -> LinkDirection {
        self.direction
    }

    /// Alias in the record
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Minimum hops, -1 for fixed-length
    pub fn min_hop(&self) -> i32 {
        self.min_hop
    }

    /// Maximum hops, -1 for fixed-length
    pub fn max_hop(&self) -> i32 {
        self.max_hop
    }

    /// Why the relationship exists
    pub fn derivation(&self) -> Derivation {
        self.derivation
    }

    /// Property predicates
    pub fn predicates(&self) -> &[PropertyPredicate] {
        &self.predicates
    }

    /// True for `[*min..max]` relationships
    pub fn var_len(&self) -> bool {
        self.min_hop >= 0 || self.max_hop >= 0
    }

    /// True if the pattern has no direction
    pub fn undirected(&self) -> bool {
        matches!(
            self.direction,
            LinkDirection::Undirected | LinkDirection::Unknown
        )
    }

    /// Node the stored edges start from. Undirected relationships report
    /// `lhs`.
    pub fn src(&self) -> NodeId {
        match self.direction {
            LinkDirection::RightToLeft => self.rhs,
            _ => self.lhs,
        }
    }

    /// Node the stored edges point at. Undirected relationships report
    /// `rhs`.
    pub fn dst(&self) -> NodeId {
        match self.direction {
            LinkDirection::RightToLeft => self.lhs,
            _ => self.rhs,
        }
    }

    /// Endpoint opposite to `node`
    pub fn neighbor_of(&self, node: NodeId) -> NodeId {
        if self.lhs == node { self.rhs } else { self.lhs }
    }

    /// Handle to the fixed-length binding
    pub fn binding(&self) -> &EdgeBinding {
        &self.binding
    }

    /// Handle to the variable-length binding
    pub fn path(&self) -> &PathBinding {
        &self.path
    }
}
