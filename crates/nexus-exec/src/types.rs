//! Storage identifiers shared across the executor

use serde::{Deserialize, Serialize};
use std::fmt;

/// Internal vertex identifier. Negative values mean "unbound".
pub type VertexId = i64;

/// Sentinel held by a vertex binding that is not bound to any vertex
pub const INVALID_VID: VertexId = -1;

/// Composite identifier of a stored edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeUid {
    /// Source vertex id
    pub src: VertexId,
    /// Destination vertex id
    pub dst: VertexId,
    /// Edge label id
    pub label_id: u16,
    /// Temporal id
    pub tid: i64,
    /// Sub-id distinguishing edges with the same temporal id
    pub eid: i64,
}

impl EdgeUid {
    /// Create an edge uid
    pub fn new(src: VertexId, dst: VertexId, label_id: u16, tid: i64, eid: i64) -> Self {
        Self {
            src,
            dst,
            label_id,
            tid,
            eid,
        }
    }

    /// The endpoint opposite to `vid`. Self-loops return `vid`.
    pub fn other_end(&self, vid: VertexId) -> VertexId {
        if self.src == vid { self.dst } else { self.src }
    }

    /// True if `vid` is one of the endpoints
    pub fn touches(&self, vid: VertexId) -> bool {
        self.src == vid || self.dst == vid
    }
}

/// Renders the `src,dst,lid,eid` body used inside `E[...]`
impl fmt::Display for EdgeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.src, self.dst, self.label_id, self.eid)
    }
}
