//! Shared helpers for executor integration tests

#![allow(dead_code)]

use nexus_exec::Result;
use nexus_exec::execution::{ExecutionContext, OpResult, Operator};
use nexus_exec::graph::{Derivation, LinkDirection, PatternGraph, RelpId};
use nexus_exec::testing::MemGraph;
use nexus_exec::types::VertexId;
use serde_json::json;
use std::collections::BTreeSet;

/// Route executor logs to the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Vertex ids of the social fixture
pub struct Social {
    pub graph: MemGraph,
    pub alice: VertexId,
    pub bob: VertexId,
    pub carol: VertexId,
    pub dave: VertexId,
    pub paris: VertexId,
    pub rome: VertexId,
}

/// Four people and two cities:
///
/// ```text
/// alice -KNOWS-> bob, alice -KNOWS-> carol, dave -KNOWS-> alice
/// alice -LIKES-> bob, bob -LIVES_IN-> paris
/// ```
pub fn social() -> Social {
    let graph = MemGraph::new();
    let alice = graph.add_vertex("Person", json!({"name": "Alice", "age": 30}));
    let bob = graph.add_vertex("Person", json!({"name": "Bob", "age": 25}));
    let carol = graph.add_vertex("Person", json!({"name": "Carol"}));
    let dave = graph.add_vertex("Person", json!({"name": "Dave", "age": 41}));
    let paris = graph.add_vertex("City", json!({"name": "Paris"}));
    let rome = graph.add_vertex("City", json!({"name": "Rome"}));
    graph.add_edge(alice, bob, "KNOWS").unwrap();
    graph.add_edge(alice, carol, "KNOWS").unwrap();
    graph.add_edge(dave, alice, "KNOWS").unwrap();
    graph.add_edge(alice, bob, "LIKES").unwrap();
    graph.add_edge(bob, paris, "LIVES_IN").unwrap();
    Social {
        graph,
        alice,
        bob,
        carol,
        dave,
        paris,
        rome,
    }
}

pub fn types(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// Add a fixed-length relationship with no property filter
pub fn relate(
    pattern: &mut PatternGraph,
    types_: &[&str],
    lhs: usize,
    rhs: usize,
    direction: LinkDirection,
    alias: &str,
) -> RelpId {
    pattern
        .add_relationship(
            types(types_),
            lhs,
            rhs,
            direction,
            alias,
            -1,
            -1,
            Derivation::Matched,
            Vec::new(),
        )
        .unwrap()
}

/// Pull `op` until depleted and return the number of results
pub fn drain(op: &mut dyn Operator, ctx: &mut ExecutionContext<'_>) -> Result<usize> {
    let mut rows = 0;
    while op.consume(ctx)? == OpResult::Ok {
        rows += 1;
    }
    Ok(rows)
}
