//! In-memory graph store
//!
//! Vertices and edges live in ordered maps behind a shared `RwLock`, so
//! every handle ([`MemGraph`] clones and the transactions they open) sees
//! the same data. Writes through a transaction apply immediately; there is
//! no rollback.
//!
//! Iterators copy the matching ids when they are opened and never observe
//! later writes, which is how a real snapshot cursor behaves until
//! `refresh_iterators` is called.

use crate::storage::{EdgeDirection, EdgeIterator, Transaction, VertexDegree, VertexIterator};
use crate::types::{EdgeUid, VertexId};
use crate::{Error, Result};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct VertexData {
    label: String,
    properties: Map<String, Value>,
}

#[derive(Debug, Default)]
struct GraphData {
    vertices: BTreeMap<VertexId, VertexData>,
    edges: BTreeMap<EdgeUid, Map<String, Value>>,
    edge_types: Vec<String>,
    next_vid: VertexId,
    next_eid: i64,
    refresh_count: u64,
}

impl GraphData {
    fn type_id(&mut self, rel_type: &str) -> Result<u16> {
        let pos = match self.edge_types.iter().position(|t| t == rel_type) {
            Some(pos) => pos,
            None => {
                self.edge_types.push(rel_type.to_string());
                self.edge_types.len() - 1
            }
        };
        u16::try_from(pos).map_err(|_| Error::storage("too many relationship types"))
    }

    fn type_name(&self, label_id: u16) -> Option<&str> {
        self.edge_types.get(label_id as usize).map(String::as_str)
    }
}

/// Shared in-memory graph
#[derive(Debug, Clone, Default)]
pub struct MemGraph {
    data: Arc<RwLock<GraphData>>,
}

impl MemGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex. `properties` is a JSON object; anything else is
    /// treated as no properties.
    pub fn add_vertex(&self, label: &str, properties: Value) -> VertexId {
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut data = self.data.write();
        let vid = data.next_vid;
        data.next_vid += 1;
        data.vertices.insert(
            vid,
            VertexData {
                label: label.to_string(),
                properties,
            },
        );
        vid
    }

    /// Add an edge of type `rel_type` between two existing vertices
    pub fn add_edge(&self, src: VertexId, dst: VertexId, rel_type: &str) -> Result<EdgeUid> {
        self.add_edge_with_properties(src, dst, rel_type, Value::Null)
    }

    /// Add an edge carrying properties
    pub fn add_edge_with_properties(
        &self,
        src: VertexId,
        dst: VertexId,
        rel_type: &str,
        properties: Value,
    ) -> Result<EdgeUid> {
        let mut data = self.data.write();
        for vid in [src, dst] {
            if !data.vertices.contains_key(&vid) {
                return Err(Error::storage(format!("vertex {} does not exist", vid)));
            }
        }
        let label_id = data.type_id(rel_type)?;
        let eid = data.next_eid;
        data.next_eid += 1;
        let uid = EdgeUid::new(src, dst, label_id, 0, eid);
        let properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        data.edges.insert(uid, properties);
        Ok(uid)
    }

    /// Open a transaction over this graph
    pub fn begin(&self) -> MemTransaction {
        MemTransaction {
            data: Arc::clone(&self.data),
        }
    }

    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.data.read().vertices.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.data.read().edges.len()
    }

    /// True if the vertex exists
    pub fn has_vertex(&self, vid: VertexId) -> bool {
        self.data.read().vertices.contains_key(&vid)
    }

    /// True if the edge exists
    pub fn has_edge(&self, uid: &EdgeUid) -> bool {
        self.data.read().edges.contains_key(uid)
    }

    /// Relationship type name of an edge uid
    pub fn edge_type(&self, uid: &EdgeUid) -> Option<String> {
        self.data.read().type_name(uid.label_id).map(str::to_string)
    }

    /// How many times `refresh_iterators` has been called on any
    /// transaction of this graph
    pub fn refresh_count(&self) -> u64 {
        self.data.read().refresh_count
    }
}

/// Transaction over a [`MemGraph`]
#[derive(Debug)]
pub struct MemTransaction {
    data: Arc<RwLock<GraphData>>,
}

/// Snapshot cursor over vertex ids
#[derive(Debug)]
pub struct MemVertexIterator {
    ids: Vec<VertexId>,
    pos: usize,
}

impl VertexIterator for MemVertexIterator {
    fn is_valid(&self) -> bool {
        self.pos < self.ids.len()
    }

    fn advance(&mut self) -> Result<()> {
        if self.is_valid() {
            self.pos += 1;
        }
        Ok(())
    }

    fn vertex_id(&self) -> VertexId {
        self.ids.get(self.pos).copied().unwrap_or(crate::types::INVALID_VID)
    }
}

/// Snapshot cursor over edge uids
#[derive(Debug)]
pub struct MemEdgeIterator {
    uids: Vec<EdgeUid>,
    pos: usize,
}

impl EdgeIterator for MemEdgeIterator {
    fn is_valid(&self) -> bool {
        self.pos < self.uids.len()
    }

    fn advance(&mut self) -> Result<()> {
        if self.is_valid() {
            self.pos += 1;
        }
        Ok(())
    }

    fn uid(&self) -> EdgeUid {
        self.uids
            .get(self.pos)
            .copied()
            .unwrap_or_else(|| EdgeUid::new(-1, -1, 0, 0, -1))
    }
}

impl Transaction for MemTransaction {
    fn vertex_iterator(
        &mut self,
        label: Option<&str>,
        predicates: &[(String, Value)],
    ) -> Result<Box<dyn VertexIterator>> {
        let data = self.data.read();
        let ids = data
            .vertices
            .iter()
            .filter(|(_, v)| label.is_none_or(|l| v.label == l))
            .filter(|(_, v)| {
                predicates
                    .iter()
                    .all(|(field, value)| v.properties.get(field) == Some(value))
            })
            .map(|(&vid, _)| vid)
            .collect();
        Ok(Box::new(MemVertexIterator { ids, pos: 0 }))
    }

    fn edge_iterator(
        &mut self,
        vid: VertexId,
        direction: EdgeDirection,
        types: &BTreeSet<String>,
    ) -> Result<Box<dyn EdgeIterator>> {
        let data = self.data.read();
        let type_matches = |uid: &EdgeUid| {
            types.is_empty()
                || data
                    .type_name(uid.label_id)
                    .is_some_and(|name| types.contains(name))
        };
        let uids = match direction {
            // uids order by source first, so outgoing edges are one range
            EdgeDirection::Outgoing => data
                .edges
                .range(EdgeUid::new(vid, VertexId::MIN, 0, i64::MIN, i64::MIN)..)
                .map(|(uid, _)| uid)
                .take_while(|uid| uid.src == vid)
                .filter(|uid| type_matches(*uid))
                .copied()
                .collect(),
            EdgeDirection::Incoming => data
                .edges
                .keys()
                .filter(|uid| uid.dst == vid && type_matches(*uid))
                .copied()
                .collect(),
            EdgeDirection::Both => data
                .edges
                .keys()
                .filter(|uid| uid.touches(vid) && type_matches(*uid))
                .copied()
                .collect(),
        };
        Ok(Box::new(MemEdgeIterator { uids, pos: 0 }))
    }

    fn vertex_label(&self, vid: VertexId) -> Result<Option<String>> {
        Ok(self.data.read().vertices.get(&vid).map(|v| v.label.clone()))
    }

    fn vertex_property(&self, vid: VertexId, field: &str) -> Result<Option<Value>> {
        Ok(self
            .data
            .read()
            .vertices
            .get(&vid)
            .and_then(|v| v.properties.get(field).cloned()))
    }

    fn delete_edge(&mut self, uid: &EdgeUid) -> Result<bool> {
        Ok(self.data.write().edges.remove(uid).is_some())
    }

    fn delete_vertex(&mut self, vid: VertexId) -> Result<Option<VertexDegree>> {
        let mut data = self.data.write();
        if data.vertices.remove(&vid).is_none() {
            return Ok(None);
        }
        let incident: Vec<EdgeUid> = data
            .edges
            .keys()
            .filter(|uid| uid.touches(vid))
            .copied()
            .collect();
        let mut degree = VertexDegree::default();
        for uid in incident {
            // self-loops count once, as outgoing
            if uid.src == vid {
                degree.out_degree += 1;
            } else {
                degree.in_degree += 1;
            }
            data.edges.remove(&uid);
        }
        Ok(Some(degree))
    }

    fn refresh_iterators(&mut self) -> Result<()> {
        self.data.write().refresh_count += 1;
        Ok(())
    }
}
