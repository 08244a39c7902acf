//! Per-execution mutation counters

use serde::{Deserialize, Serialize};

/// Counters shared by every mutating operator of one execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Labels added to existing vertices
    pub labels_added: u64,
    /// Vertices created
    pub vertices_created: u64,
    /// Properties set
    pub properties_set: u64,
    /// Edges created
    pub edges_created: u64,
    /// Vertices deleted
    pub vertices_deleted: u64,
    /// Edges deleted, including edges removed by vertex cascades
    pub edges_deleted: u64,
}

impl Statistics {
    /// True if any counter is nonzero
    pub fn modified(&self) -> bool {
        self.labels_added > 0
            || self.vertices_created > 0
            || self.properties_set > 0
            || self.edges_created > 0
            || self.vertices_deleted > 0
            || self.edges_deleted > 0
    }

    /// Summary line reported by a top-level Delete
    pub fn delete_summary(&self) -> String {
        format!(
            "deleted {} vertices, deleted {} edges.",
            self.vertices_deleted, self.edges_deleted
        )
    }
}
