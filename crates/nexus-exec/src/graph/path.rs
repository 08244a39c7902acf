//! Variable-length relationship bindings

use crate::types::{EdgeUid, INVALID_VID, VertexId};
use std::fmt;

/// A matched path: a start vertex followed by an ordered list of edges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    start: VertexId,
    edges: Vec<EdgeUid>,
}

impl Default for Path {
    fn default() -> Self {
        Self {
            start: INVALID_VID,
            edges: Vec::new(),
        }
    }
}

impl Path {
    /// Empty path starting at `start`
    pub fn new(start: VertexId) -> Self {
        Self {
            start,
            edges: Vec::new(),
        }
    }

    /// Start vertex
    pub fn start(&self) -> VertexId {
        self.start
    }

    /// Edges in traversal order
    pub fn edges(&self) -> &[EdgeUid] {
        &self.edges
    }

    /// Number of hops
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// True if the path has no edges
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Append one hop
    pub fn push(&mut self, uid: EdgeUid) {
        self.edges.push(uid);
    }

    /// Remove the last hop
    pub fn pop(&mut self) -> Option<EdgeUid> {
        self.edges.pop()
    }

    /// True if the edge is already part of the path
    pub fn contains(&self, uid: &EdgeUid) -> bool {
        self.edges.contains(uid)
    }

    /// Reset to an unbound empty path
    pub fn clear(&mut self) {
        self.start = INVALID_VID;
        self.edges.clear();
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, uid) in self.edges.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "E[{}]", uid)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop() {
        let mut path = Path::new(1);
        assert!(path.is_empty());
        path.push(EdgeUid::new(1, 2, 0, 0, 0));
        path.push(EdgeUid::new(2, 3, 0, 0, 0));
        assert_eq!(path.len(), 2);
        assert!(path.contains(&EdgeUid::new(1, 2, 0, 0, 0)));
        assert_eq!(path.pop(), Some(EdgeUid::new(2, 3, 0, 0, 0)));
        assert_eq!(path.to_string(), "[E[1,2,0,0]]");
    }

    #[test]
    fn test_clear() {
        let mut path = Path::new(5);
        path.push(EdgeUid::new(5, 6, 1, 0, 0));
        path.clear();
        assert!(path.is_empty());
        assert_eq!(path.start(), INVALID_VID);
        assert_eq!(path.to_string(), "[]");
    }
}
