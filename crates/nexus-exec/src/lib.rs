//! Nexus Exec - Pattern-Matching Executor Core
//!
//! This crate provides the query-execution core behind Nexus pattern
//! matching:
//! - Pattern graph model (query nodes, relationships, symbol table)
//! - Records of polymorphic entries shared along a scan chain
//! - Pull-based operators (node scan, expand, variable-length expand, delete)
//! - Columnar data chunks keyed by vertex id, with JSON output
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              ExecutionPlan                   │
//! │     (execute, execute_batched, explain)     │
//! └──────────────┬──────────────────────────────┘
//!                │ consume()
//! ┌──────────────┴──────────────────────────────┐
//! │             Operator Tree                    │
//! │  (NodeScan, ExpandAll, VarLenExpand, Delete)│
//! └──────┬───────────────────────┬──────────────┘
//!        │ bindings              │ iterators / writes
//! ┌──────┴──────────────┐ ┌──────┴──────────────┐
//! │    PatternGraph     │ │    Transaction      │
//! │  (Record, Entry)    │ │  (storage seam)     │
//! └─────────────────────┘ └─────────────────────┘
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod execution;
pub mod graph;
pub mod resultset;
pub mod statistics;
pub mod storage;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

pub use error::{Error, Result};
