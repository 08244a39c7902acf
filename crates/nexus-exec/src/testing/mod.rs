//! Testing infrastructure for the executor
//!
//! Provides [`MemGraph`], an in-memory graph store implementing
//! [`crate::storage::Transaction`], so operator pipelines can be driven
//! end to end without a storage engine.
//!
//! # Usage
//!
//! ```rust
//! use nexus_exec::testing::MemGraph;
//! use serde_json::json;
//!
//! let graph = MemGraph::new();
//! let alice = graph.add_vertex("Person", json!({"name": "Alice"}));
//! let bob = graph.add_vertex("Person", json!({"name": "Bob"}));
//! graph.add_edge(alice, bob, "KNOWS").unwrap();
//!
//! let mut txn = graph.begin();
//! // hand `&mut txn` to an ExecutionContext...
//! # let _ = &mut txn;
//! assert_eq!(graph.edge_count(), 1);
//! ```

mod mem_graph;

pub use mem_graph::{MemEdgeIterator, MemGraph, MemTransaction, MemVertexIterator};
