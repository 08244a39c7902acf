//! Execution plan integration tests: row projection, re-execution,
//! explain output and batched chunk output.

mod common;

use common::{relate, social};
use nexus_exec::Error;
use nexus_exec::execution::{
    Delete, ExecutionContext, ExecutionPlan, ExpandAll, NodeScan, VarLenExpand,
};
use nexus_exec::graph::{Derivation, LinkDirection, PatternGraph};
use nexus_exec::resultset::{DataType, Entry};
use serde_json::json;
use std::rc::Rc;

fn knows_plan(columns: Vec<String>) -> ExecutionPlan {
    let mut pattern = PatternGraph::new();
    let a = pattern.add_node("Person", "a", Derivation::Matched);
    let b = pattern.add_node("Person", "b", Derivation::Matched);
    let r = relate(&mut pattern, &["KNOWS"], a, b, LinkDirection::LeftToRight, "r");
    let pattern = Rc::new(pattern);
    let scan = NodeScan::new(Rc::clone(&pattern), a).unwrap();
    let expand = ExpandAll::new(Rc::clone(&pattern), a, r, Box::new(scan)).unwrap();
    ExecutionPlan::new(pattern, Box::new(expand), columns)
}

#[test]
fn test_execute_projects_all_aliases_by_default() {
    let s = social();
    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let mut plan = knows_plan(Vec::new());
    let table = plan.execute(&mut ctx).unwrap();

    assert_eq!(table.columns, vec!["a", "b", "r"]);
    assert_eq!(table.len(), 3);
    assert_eq!(table.rows[0][0], json!(format!("V[{}]", s.alice)));
    assert_eq!(table.rows[0][1], json!(format!("V[{}]", s.bob)));
    let edge = table.rows[0][2].as_str().unwrap();
    assert!(edge.starts_with(&format!("E[{},{},", s.alice, s.bob)));
}

#[test]
fn test_execute_selected_columns_and_rerun() {
    let s = social();
    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let mut plan = knows_plan(vec!["b".to_string()]);

    let first = plan.execute(&mut ctx).unwrap();
    let second = plan.execute(&mut ctx).unwrap();
    assert_eq!(first.columns, vec!["b"]);
    assert_eq!(first, second);
    let mut targets: Vec<String> = first
        .rows
        .iter()
        .map(|row| row[0].as_str().unwrap().to_string())
        .collect();
    targets.sort();
    assert_eq!(
        targets,
        vec![
            format!("V[{}]", s.alice),
            format!("V[{}]", s.bob),
            format!("V[{}]", s.carol),
        ]
    );
}

#[test]
fn test_unknown_column_is_internal_error() {
    let s = social();
    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let mut plan = knows_plan(vec!["nope".to_string()]);
    assert!(plan.execute(&mut ctx).unwrap_err().is_fatal());
}

#[test]
fn test_collect_records_freezes_bindings() {
    let s = social();
    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let mut plan = knows_plan(Vec::new());
    let records = plan.collect_records(&mut ctx).unwrap();

    assert_eq!(records.len(), 3);
    // every binding is released after depletion, the frozen rows are not
    assert!(!plan.pattern().node(0).unwrap().binding().is_bound());
    let first = &records[0];
    assert!(matches!(first.get(0), Some(Entry::NodeSnapshot(_))));
    assert!(matches!(first.get(2), Some(Entry::RelpSnapshot(_))));
    assert_eq!(first.get(0).unwrap().to_string(), format!("V[{}]", s.alice));
}

#[test]
fn test_var_len_rows_render_paths() {
    let s = social();
    let mut pattern = PatternGraph::new();
    let a = pattern.add_node("Person", "a", Derivation::Matched);
    let b = pattern.add_node("", "b", Derivation::Matched);
    let r = pattern
        .add_relationship(
            common::types(&[]),
            a,
            b,
            LinkDirection::LeftToRight,
            "r",
            2,
            2,
            Derivation::Matched,
            Vec::new(),
        )
        .unwrap();
    let pattern = Rc::new(pattern);
    let scan = NodeScan::new(Rc::clone(&pattern), a).unwrap();
    let expand = VarLenExpand::new(Rc::clone(&pattern), a, r, Box::new(scan)).unwrap();
    let mut plan = ExecutionPlan::new(pattern, Box::new(expand), vec!["b".into(), "r".into()]);

    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let table = plan.execute(&mut ctx).unwrap();

    // alice -> bob -> paris over KNOWS and over LIKES,
    // dave -> alice -> {bob (KNOWS), bob (LIKES), carol}
    assert_eq!(table.len(), 5);
    for row in &table.rows {
        assert_eq!(row[1].as_array().unwrap().len(), 2);
    }
    let paris = format!("V[{}]", s.paris);
    assert!(table.rows.iter().any(|row| row[0] == json!(paris)));

    // live paths cannot be frozen
    let err = plan.collect_records(&mut ctx).unwrap_err();
    assert!(matches!(err, Error::NotSupported(_)));
}

#[test]
fn test_explain_renders_operator_tree() {
    let mut pattern = PatternGraph::new();
    let a = pattern.add_node("Person", "a", Derivation::Matched);
    let b = pattern.add_node("", "b", Derivation::Matched);
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
    let plan = ExecutionPlan::new(pattern, Box::new(delete), Vec::new());

    assert_eq!(
        plan.explain(),
        "Delete [a,r]\n    Expand(All) [a --> b] (r)\n        Node Scan [a:Person]\n"
    );
}

#[test]
fn test_execute_batched_dump() {
    let s = social();
    let mut pattern = PatternGraph::new();
    pattern.add_node("Person", "n", Derivation::Matched);
    let pattern = Rc::new(pattern);
    let scan = NodeScan::new(Rc::clone(&pattern), 0).unwrap();
    let mut plan = ExecutionPlan::new(pattern, Box::new(scan), Vec::new());

    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let chunk = plan
        .execute_batched(
            &mut ctx,
            "n",
            &[("name", DataType::String), ("age", DataType::Int64)],
        )
        .unwrap();

    assert_eq!(chunk.column_names(), vec!["age", "name"]);
    assert_eq!(chunk.column_len("age"), 4);
    assert_eq!(chunk.row_count(), 4);
    assert_eq!(
        chunk.dump(true).unwrap(),
        json!({
            "header": [
                {"name": "age", "type": "INTEGER"},
                {"name": "name", "type": "STRING"},
            ],
            "is_standard": true,
            "data": [
                {"age": 30, "name": "Alice"},
                {"age": 25, "name": "Bob"},
                {"name": "Carol"},
                {"age": 41, "name": "Dave"},
            ],
        })
    );
    assert_eq!(chunk.dump(false).unwrap().as_array().unwrap().len(), 4);
}

#[test]
fn test_execute_batched_type_mismatch() {
    let s = social();
    let mut pattern = PatternGraph::new();
    pattern.add_node("Person", "n", Derivation::Matched);
    let pattern = Rc::new(pattern);
    let scan = NodeScan::new(Rc::clone(&pattern), 0).unwrap();
    let mut plan = ExecutionPlan::new(pattern, Box::new(scan), Vec::new());

    let mut txn = s.graph.begin();
    let mut ctx = ExecutionContext::new(&mut txn);
    let err = plan
        .execute_batched(&mut ctx, "n", &[("name", DataType::Int64)])
        .unwrap_err();
    assert!(matches!(err, Error::TypeMismatch { .. }));

    let err = plan
        .execute_batched(&mut ctx, "missing", &[("name", DataType::String)])
        .unwrap_err();
    assert!(matches!(err, Error::Input(_)));
}
