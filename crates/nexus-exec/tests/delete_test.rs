//! Delete integration tests: cascades, statistics, summary rows and the
//! collection buffer limit.

mod common;

use common::{init_tracing, relate, social};
use nexus_exec::Error;
use nexus_exec::config::ExecConfig;
use nexus_exec::execution::{
    Delete, ExecutionContext, ExecutionPlan, ExpandAll, NodeScan, OpResult, Operator, Params,
    SUMMARY_COLUMN,
};
use nexus_exec::graph::{
    Derivation, LinkDirection, PatternGraph, PropertyPredicate, SymbolScope, SymbolType,
};
use nexus_exec::statistics::Statistics;
use nexus_exec::testing::MemGraph;
use serde_json::json;
use serial_test::serial;
use std::rc::Rc;

fn person_named(name: &str) -> PatternGraph {
    let mut pattern = PatternGraph::new();
    pattern.add_node_with_predicates(
        vec!["Person".to_string()],
        "n",
        vec![PropertyPredicate::literal("name", json!(name))],
        Derivation::Matched,
    );
    pattern
}

fn delete_plan(pattern: PatternGraph, targets: &[&str]) -> ExecutionPlan {
    let pattern = Rc::new(pattern);
    let scan = NodeScan::new(Rc::clone(&pattern), 0).unwrap();
    let delete = Delete::new(
        Rc::clone(&pattern),
        targets.iter().map(|t| t.to_string()).collect(),
        Box::new(scan),
    )
    .unwrap();
    ExecutionPlan::new(pattern, Box::new(delete), Vec::new())
}

#[test]
fn test_delete_isolated_vertices() {
    init_tracing();
    let graph = MemGraph::new();
    graph.add_vertex("Person", json!({"name": "A"}));
    graph.add_vertex("Person", json!({"name": "B"}));
    graph.add_vertex("City", json!({"name": "C"}));
    let mut pattern = PatternGraph::new();
    pattern.add_node("Person", "n", Derivation::Matched);

    let mut txn = graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn).with_summary(true);
    let mut plan = delete_plan(pattern, &["n"]);
    let table = plan.execute(&mut ctx).unwrap();

    assert_eq!(table.columns, vec![SUMMARY_COLUMN.to_string()]);
    assert_eq!(
        table.rows,
        vec![vec![json!("deleted 2 vertices, deleted 0 edges.")]]
    );
    assert_eq!(ctx.stats.vertices_deleted, 2);
    assert_eq!(ctx.stats.edges_deleted, 0);
    assert_eq!(graph.vertex_count(), 1);
    assert_eq!(graph.refresh_count(), 1);
}

#[test]
fn test_delete_vertex_cascades_incident_edges() {
    let s = social();
    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let mut plan = delete_plan(person_named("Alice"), &["n"]);
    plan.execute(&mut ctx).unwrap();

    // alice has 3 KNOWS and 1 LIKES edge
    assert_eq!(ctx.stats.vertices_deleted, 1);
    assert_eq!(ctx.stats.edges_deleted, 4);
    assert!(ctx.stats.modified());
    assert!(!s.graph.has_vertex(s.alice));
    assert_eq!(s.graph.edge_count(), 1);
}

#[test]
fn test_delete_depletes_once_and_stays_depleted() {
    let s = social();
    let pattern = Rc::new(person_named("Carol"));
    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);

    let scan = NodeScan::new(Rc::clone(&pattern), 0).unwrap();
    let mut op = Delete::new(Rc::clone(&pattern), vec!["n".to_string()], Box::new(scan)).unwrap();
    op.initialize(&mut ctx).unwrap();

    assert_eq!(op.consume(&mut ctx).unwrap(), OpResult::Ok);
    let after_first = ctx.stats.clone();
    assert_eq!(after_first.vertices_deleted, 1);
    assert_eq!(after_first.edges_deleted, 1);

    assert_eq!(op.consume(&mut ctx).unwrap(), OpResult::Depleted);
    assert_eq!(op.consume(&mut ctx).unwrap(), OpResult::Depleted);
    assert_eq!(ctx.stats, after_first);
    assert_eq!(s.graph.refresh_count(), 1);
}

#[test]
fn test_delete_relationships_bound_by_expand() {
    let s = social();
    let mut pattern = PatternGraph::new();
    let a = pattern.add_node("Person", "a", Derivation::Matched);
    let b = pattern.add_node("Person", "b", Derivation::Matched);
    let r = relate(&mut pattern, &["KNOWS"], a, b, LinkDirection::LeftToRight, "r");
    let pattern = Rc::new(pattern);

    let scan = NodeScan::new(Rc::clone(&pattern), a).unwrap();
    let expand = ExpandAll::new(Rc::clone(&pattern), a, r, Box::new(scan)).unwrap();
    let delete = Delete::new(Rc::clone(&pattern), vec!["r".to_string()], Box::new(expand)).unwrap();
    let mut plan = ExecutionPlan::new(Rc::clone(&pattern), Box::new(delete), Vec::new());

    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn).with_summary(true);
    let table = plan.execute(&mut ctx).unwrap();

    assert_eq!(
        table.rows[0][0],
        json!("deleted 0 vertices, deleted 3 edges.")
    );
    assert_eq!(s.graph.vertex_count(), 6);
    // LIKES and LIVES_IN survive
    assert_eq!(s.graph.edge_count(), 2);
}

#[test]
fn test_delete_vertex_and_its_relationship_counts_each_edge_once() {
    let s = social();
    let mut pattern = PatternGraph::new();
    let a = pattern.add_node_with_predicates(
        vec!["Person".to_string()],
        "a",
        vec![PropertyPredicate::literal("name", json!("Alice"))],
        Derivation::Matched,
    );
    let b = pattern.add_node("Person", "b", Derivation::Matched);
    let r = relate(&mut pattern, &["KNOWS"], a, b, LinkDirection::LeftToRight, "r");
    let pattern = Rc::new(pattern);

    let scan = NodeScan::new(Rc::clone(&pattern), a).unwrap();
    let expand = ExpandAll::new(Rc::clone(&pattern), a, r, Box::new(scan)).unwrap();
    let delete = Delete::new(
        Rc::clone(&pattern),
        vec!["a".to_string(), "r".to_string()],
        Box::new(expand),
    )
    .unwrap();
    let mut plan = ExecutionPlan::new(Rc::clone(&pattern), Box::new(delete), Vec::new());

    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    plan.execute(&mut ctx).unwrap();

    // two KNOWS edges explicitly, then the vertex cascades LIKES and the
    // incoming KNOWS from dave
    assert_eq!(ctx.stats.vertices_deleted, 1);
    assert_eq!(ctx.stats.edges_deleted, 4);
    assert_eq!(s.graph.edge_count(), 1);
}

#[test]
fn test_buffer_overflow_fails_without_side_effects() {
    let s = social();
    let mut pattern = PatternGraph::new();
    pattern.add_node("Person", "n", Derivation::Matched);

    let mut txn = s.graph.begin();
    let mut ctx =
        ExecutionContext::new(&mut txn).with_config(ExecConfig::with_delete_buffer_limit(3));
    let mut plan = delete_plan(pattern, &["n"]);
    let err = plan.execute(&mut ctx).unwrap_err();

    assert!(matches!(err, Error::NotSupported(_)));
    assert_eq!(s.graph.vertex_count(), 6);
    assert_eq!(s.graph.edge_count(), 5);
    assert_eq!(s.graph.refresh_count(), 0);
    assert_eq!(ctx.stats, Statistics::default());
}

#[test]
fn test_buffer_limit_is_inclusive() {
    let s = social();
    let mut pattern = PatternGraph::new();
    pattern.add_node("Person", "n", Derivation::Matched);

    let mut txn = s.graph.begin();
    let mut ctx =
        ExecutionContext::new(&mut txn).with_config(ExecConfig::with_delete_buffer_limit(4));
    let mut plan = delete_plan(pattern, &["n"]);
    plan.execute(&mut ctx).unwrap();
    assert_eq!(ctx.stats.vertices_deleted, 4);
    assert_eq!(s.graph.vertex_count(), 2);
}

#[test]
fn test_null_target_is_skipped() {
    let s = social();
    let mut pattern = person_named("Bob");
    pattern.add_symbol("$gone", SymbolType::Parameter, SymbolScope::Argument);

    let mut txn = s.graph.begin();
    let params: Params = [("gone".to_string(), json!(null))].into_iter().collect();
    let mut ctx = ExecutionContext::new(&mut txn).with_params(params);
    let mut plan = delete_plan(pattern, &["n", "$gone"]);
    plan.execute(&mut ctx).unwrap();

    assert_eq!(ctx.stats.vertices_deleted, 1);
    assert!(!s.graph.has_vertex(s.bob));
}

#[test]
fn test_non_graph_target_is_input_error() {
    let s = social();
    let mut pattern = person_named("Bob");
    pattern.add_symbol("$name", SymbolType::Parameter, SymbolScope::Argument);

    let mut txn = s.graph.begin();
    let params: Params = [("name".to_string(), json!("Bob"))].into_iter().collect();
    let mut ctx = ExecutionContext::new(&mut txn).with_params(params);
    let mut plan = delete_plan(pattern, &["$name"]);
    let err = plan.execute(&mut ctx).unwrap_err();

    assert!(matches!(err, Error::Input(_)));
    assert!(s.graph.has_vertex(s.bob));
}

#[test]
fn test_unknown_target_alias_is_internal_error() {
    let s = social();
    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let mut plan = delete_plan(person_named("Bob"), &["missing"]);
    let err = plan.execute(&mut ctx).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_nested_delete_keeps_record() {
    let s = social();
    let mut pattern = person_named("Dave");
    let c = pattern.add_node("City", "c", Derivation::Matched);
    let pattern = Rc::new(pattern);

    let scan = NodeScan::new(Rc::clone(&pattern), 0).unwrap();
    let delete = Delete::new(Rc::clone(&pattern), vec!["n".to_string()], Box::new(scan)).unwrap();
    let mut op = NodeScan::with_child(Rc::clone(&pattern), c, Box::new(delete)).unwrap();

    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn).with_summary(true);
    op.initialize(&mut ctx).unwrap();

    let mut cities = Vec::new();
    while op.consume(&mut ctx).unwrap() == OpResult::Ok {
        cities.push(pattern.node(c).unwrap().pull_vid());
    }
    assert_eq!(cities, vec![s.paris, s.rome]);
    assert!(!s.graph.has_vertex(s.dave));
    // no summary row below the root
    assert_eq!(op.record().unwrap().borrow().len(), 2);
}

#[test]
#[serial]
fn test_buffer_limit_from_env() {
    // SAFETY: serialized with every other test touching the environment
    unsafe {
        std::env::set_var("NEXUS_EXEC_DELETE_BUFFER_LIMIT", "1");
    }
    let config = ExecConfig::from_env();
    unsafe {
        std::env::remove_var("NEXUS_EXEC_DELETE_BUFFER_LIMIT");
    }
    assert_eq!(config.delete_buffer_limit, 1);

    let s = social();
    let mut pattern = PatternGraph::new();
    pattern.add_node("City", "n", Derivation::Matched);
    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn).with_config(config);
    let mut plan = delete_plan(pattern, &["n"]);
    assert!(matches!(
        plan.execute(&mut ctx).unwrap_err(),
        Error::NotSupported(_)
    ));
}
