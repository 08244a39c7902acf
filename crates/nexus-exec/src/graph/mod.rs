//! Pattern graph
//!
//! The compile-time logical graph a query is matched against: pattern nodes,
//! pattern relationships and the symbol table mapping their aliases to
//! record slots. Nodes and relationships live in arenas and refer to each
//! other by index ([`NodeId`], [`RelpId`]); the topology is frozen once the
//! graph is handed to the executor (operators hold `Rc<PatternGraph>`).
//!
//! The only state mutated during execution is the per-node / per-relationship
//! binding slots and the [`VisitedEdges`] set, both behind interior
//! mutability and local to one pipeline instance.

pub mod node;
pub mod path;
pub mod property;
pub mod relationship;
pub mod symbol_table;
pub mod visited;

pub use node::{Node, VertexBinding};
pub use path::Path;
pub use property::{PropertyPredicate, PropertyValue};
pub use relationship::{EdgeBinding, LinkDirection, PathBinding, Relationship};
pub use symbol_table::{SymbolNode, SymbolScope, SymbolTable, SymbolType};
pub use visited::VisitedEdges;

use crate::types::EdgeUid;
use crate::{Error, Result, exec_assert};
use std::cell::{RefCell, RefMut};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;

/// Index of a node in its pattern graph
pub type NodeId = usize;

/// Index of a relationship in its pattern graph
pub type RelpId = usize;

/// Why a pattern node or relationship exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Bound by MATCH
    Matched,
    /// Handed over from a previous query part
    Argument,
    /// Introduced by CREATE
    Created,
    /// Introduced by MERGE
    Merged,
    /// Not classified yet
    Unknown,
}

impl Derivation {
    /// Code used by graph dumps
    pub fn code(&self) -> &'static str {
        match self {
            Self::Created => "(C)",
            Self::Merged => "(U)",
            Self::Argument => "(A)",
            Self::Matched | Self::Unknown => "(M)",
        }
    }

    /// True for nodes and relationships satisfied by construction
    pub fn is_constructed(&self) -> bool {
        matches!(self, Self::Created | Self::Merged)
    }
}

/// One traversal step: expand from `from` through `relationship` to `to`.
///
/// A hanging node yields a single step with neither relationship nor
/// neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandStep {
    /// Node the step starts from
    pub from: NodeId,
    /// Relationship traversed
    pub relationship: Option<RelpId>,
    /// Node reached
    pub to: Option<NodeId>,
}

/// Ordered steps of one connected component
pub type ExpandSteps = Vec<ExpandStep>;

/// Compile-time pattern graph
#[derive(Debug, Default)]
pub struct PatternGraph {
    nodes: Vec<Node>,
    relationships: Vec<Relationship>,
    node_aliases: HashMap<String, NodeId>,
    relp_aliases: HashMap<String, RelpId>,
    symbols: SymbolTable,
    visited_edges: RefCell<VisitedEdges>,
}

impl PatternGraph {
    /// Create an empty pattern graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with at most one label (empty string = unlabeled)
    pub fn add_node(&mut self, label: &str, alias: &str, derivation: Derivation) -> NodeId {
        let labels = if label.is_empty() {
            Vec::new()
        } else {
            vec![label.to_string()]
        };
        self.add_node_with_predicates(labels, alias, Vec::new(), derivation)
    }

    /// Add a node with explicit labels and property predicates
    pub fn add_node_with_predicates(
        &mut self,
        labels: Vec<String>,
        alias: &str,
        predicates: Vec<PropertyPredicate>,
        derivation: Derivation,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node::new(
            id,
            labels,
            alias.to_string(),
            predicates,
            derivation,
        ));
        self.node_aliases.insert(alias.to_string(), id);
        let scope = if derivation == Derivation::Argument {
            SymbolScope::Argument
        } else {
            SymbolScope::Local
        };
        self.symbols.insert(alias, SymbolType::Node, scope);
        id
    }

    /// Add a relationship between two existing nodes.
    ///
    /// `(min_hop, max_hop) == (-1, -1)` declares a fixed-length relationship;
    /// any other pair must satisfy [`Relationship::check_var_len`].
    pub fn add_relationship(
        &mut self,
        types: BTreeSet<String>,
        lhs: NodeId,
        rhs: NodeId,
        direction: LinkDirection,
        alias: &str,
        min_hop: i32,
        max_hop: i32,
        derivation: Derivation,
        predicates: Vec<PropertyPredicate>,
    ) -> Result<RelpId> {
        exec_assert!(
            lhs < self.nodes.len() && rhs < self.nodes.len(),
            "relationship `{}` references unknown node ({}, {})",
            alias,
            lhs,
            rhs
        );
        exec_assert!(
            !self.relp_aliases.contains_key(alias),
            "relationship alias `{}` registered twice",
            alias
        );
        if (min_hop >= 0 || max_hop >= 0) && !Relationship::check_var_len(min_hop, max_hop) {
            return Err(Error::input(format!(
                "invalid hop range [{}..{}] on `{}`",
                min_hop, max_hop, alias
            )));
        }

        let id = self.relationships.len();
        let relationship = Relationship {
            id,
            types,
            lhs,
            rhs,
            direction,
            alias: alias.to_string(),
            min_hop,
            max_hop,
            derivation,
            predicates,
            binding: EdgeBinding::new(),
            path: PathBinding::new(),
        };
        self.relationships.push(relationship);
        self.relp_aliases.insert(alias.to_string(), id);
        let scope = if derivation == Derivation::Argument {
            SymbolScope::Argument
        } else {
            SymbolScope::Local
        };
        self.symbols.insert(alias, SymbolType::Relationship, scope);

        self.nodes[lhs].rhs_relps.push(id);
        self.nodes[rhs].lhs_relps.push(id);
        match direction {
            LinkDirection::LeftToRight => {
                self.nodes[lhs].out_relps.push(id);
                self.nodes[rhs].in_relps.push(id);
            }
            LinkDirection::RightToLeft => {
                self.nodes[rhs].out_relps.push(id);
                self.nodes[lhs].in_relps.push(id);
            }
            LinkDirection::Undirected | LinkDirection::Unknown => {
                self.nodes[lhs].undirected_relps.push(id);
                if rhs != lhs {
                    self.nodes[rhs].undirected_relps.push(id);
                }
            }
        }
        Ok(id)
    }

    /// Register a non-pattern alias (constant, parameter, named path)
    pub fn add_symbol(
        &mut self,
        alias: &str,
        symbol_type: SymbolType,
        scope: SymbolScope,
    ) -> usize {
        self.symbols.insert(alias, symbol_type, scope)
    }

    /// All nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All relationships
    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Node by index
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id)
            .ok_or_else(|| Error::internal(format!("node {} not in pattern graph", id)))
    }

    /// Relationship by index
    pub fn relationship(&self, id: RelpId) -> Result<&Relationship> {
        self.relationships
            .get(id)
            .ok_or_else(|| Error::internal(format!("relationship {} not in pattern graph", id)))
    }

    /// Node by alias
    pub fn node_by_alias(&self, alias: &str) -> Option<&Node> {
        self.node_aliases.get(alias).map(|&id| &self.nodes[id])
    }

    /// Relationship by alias
    pub fn relationship_by_alias(&self, alias: &str) -> Option<&Relationship> {
        self.relp_aliases.get(alias).map(|&id| &self.relationships[id])
    }

    /// Symbol table
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Runtime relationship-uniqueness set
    pub fn visited_edges(&self) -> RefMut<'_, VisitedEdges> {
        self.visited_edges.borrow_mut()
    }

    /// Record an edge as used by the current path
    pub fn visit_edge(&self, uid: EdgeUid) -> bool {
        self.visited_edges.borrow_mut().insert(uid)
    }

    /// Release an edge
    pub fn unvisit_edge(&self, uid: &EdgeUid) -> bool {
        self.visited_edges.borrow_mut().remove(uid)
    }

    /// True if the edge is used by the current path
    pub fn is_edge_visited(&self, uid: &EdgeUid) -> bool {
        self.visited_edges.borrow().contains(uid)
    }

    /// Drop every runtime binding and the visited set
    pub fn reset_bindings(&self) {
        for node in &self.nodes {
            node.binding.reset();
        }
        for relp in &self.relationships {
            relp.binding.reset();
            relp.path.reset();
        }
        self.visited_edges.borrow_mut().clear();
    }

    fn is_hanging(&self, id: NodeId, ignore_created: bool) -> bool {
        let node = &self.nodes[id];
        if node.is_isolated() {
            return true;
        }
        if !ignore_created {
            return false;
        }
        node.rhs_relps
            .iter()
            .chain(node.lhs_relps.iter())
            .all(|&rid| {
                let relp = &self.relationships[rid];
                relp.derivation.is_constructed()
                    || self.nodes[relp.neighbor_of(id)].derivation.is_constructed()
            })
    }

    fn expandable(&self, node: NodeId, visited: &[bool], ignore_created: bool) -> bool {
        !visited[node] && (!ignore_created || !self.nodes[node].derivation.is_constructed())
    }

    fn collect_steps_dfs(
        &self,
        start: NodeId,
        ignore_created: bool,
        visited: &mut [bool],
    ) -> Result<ExpandSteps> {
        visited[start] = true;
        let mut steps = Vec::new();
        if self.is_hanging(start, ignore_created) {
            steps.push(ExpandStep {
                from: start,
                relationship: None,
                to: None,
            });
            return Ok(steps);
        }

        let mut stack = vec![start];
        while let Some(&curr) = stack.last() {
            let node = &self.nodes[curr];
            let mut next: Option<(RelpId, NodeId)> = None;

            for &rid in &node.rhs_relps {
                let nbr = self.relationships[rid].rhs;
                if nbr == curr {
                    return Err(Error::not_supported(format!(
                        "self-loop on `{}` in pattern expansion",
                        node.alias
                    )));
                }
                if self.expandable(nbr, visited, ignore_created) {
                    next = Some((rid, nbr));
                    break;
                }
            }
            for &rid in &node.lhs_relps {
                let nbr = self.relationships[rid].lhs;
                if nbr == curr {
                    return Err(Error::not_supported(format!(
                        "self-loop on `{}` in pattern expansion",
                        node.alias
                    )));
                }
                // prefer the lower relationship id across both sides
                let lower = next.is_none_or(|(found, _)| rid < found);
                if self.expandable(nbr, visited, ignore_created) && lower {
                    next = Some((rid, nbr));
                    break;
                }
            }

            match next {
                Some((rid, nbr)) => {
                    steps.push(ExpandStep {
                        from: curr,
                        relationship: Some(rid),
                        to: Some(nbr),
                    });
                    visited[nbr] = true;
                    stack.push(nbr);
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok(steps)
    }

    /// Plan traversal order: one step list per connected component reached
    /// from `start_nodes`, each produced by a depth-first walk.
    ///
    /// Start nodes already reached by an earlier walk are skipped, as are
    /// CREATED/MERGED start nodes when `ignore_created` is set.
    pub fn collect_expand_streams(
        &self,
        start_nodes: &[NodeId],
        ignore_created: bool,
    ) -> Result<Vec<ExpandSteps>> {
        let mut visited = vec![false; self.nodes.len()];
        let mut streams = Vec::new();
        for &start in start_nodes {
            exec_assert!(
                start < self.nodes.len(),
                "start node {} not in pattern graph",
                start
            );
            if !self.expandable(start, &visited, ignore_created) {
                continue;
            }
            streams.push(self.collect_steps_dfs(start, ignore_created, &mut visited)?);
        }
        Ok(streams)
    }

    /// Human-readable listing of the graph
    pub fn dump_graph(&self) -> String {
        let mut out = String::from("Current Pattern Graph:\n");
        for n in &self.nodes {
            let _ = writeln!(
                out,
                "N[{}] {}:{} {}",
                n.id,
                n.alias,
                n.labels.join(":"),
                n.derivation.code()
            );
        }
        for r in &self.relationships {
            let types: Vec<&str> = r.types.iter().map(String::as_str).collect();
            let _ = writeln!(
                out,
                "R[{} {} {}] {}:{} {}",
                r.lhs,
                r.direction.arrow(),
                r.rhs,
                r.alias,
                types.join("|"),
                r.derivation.code()
            );
        }
        if self.nodes.is_empty() && self.relationships.is_empty() {
            out.push_str("(EMPTY GRAPH)");
        }
        out
    }
}
