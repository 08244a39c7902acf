//! Relationship uniqueness tracking
//!
//! One matched path must not use the same stored edge twice. Expand
//! operators record every edge they bind here and release it when they
//! advance past it.

use crate::types::EdgeUid;
use std::collections::HashSet;

/// Set of edge uids bound by the path currently being matched
#[derive(Debug, Clone, Default)]
pub struct VisitedEdges {
    edges: HashSet<EdgeUid>,
}

impl VisitedEdges {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// True if the edge is bound by the current path
    pub fn contains(&self, uid: &EdgeUid) -> bool {
        self.edges.contains(uid)
    }

    /// Record an edge. Returns false if it was already recorded.
    pub fn insert(&mut self, uid: EdgeUid) -> bool {
        self.edges.insert(uid)
    }

    /// Release an edge. Returns false if it was not recorded.
    pub fn remove(&mut self, uid: &EdgeUid) -> bool {
        self.edges.remove(uid)
    }

    /// Number of recorded edges
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True if nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Forget every edge
    pub fn clear(&mut self) {
        self.edges.clear();
    }

    /// Debug listing, sorted for stable output
    pub fn dump(&self) -> String {
        let mut uids: Vec<_> = self.edges.iter().collect();
        uids.sort();
        let body: Vec<String> = uids.iter().map(|u| format!("E[{}]", u)).collect();
        format!("visited edges: [{}]", body.join(","))
    }
}
