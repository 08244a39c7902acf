//! Per-execution runtime context

use crate::config::ExecConfig;
use crate::statistics::Statistics;
use crate::storage::Transaction;
use serde_json::Value;
use std::collections::HashMap;

/// Query parameters by name
pub type Params = HashMap<String, Value>;

/// Everything an operator needs besides its own state: the open storage
/// transaction, query parameters, mutation counters and configuration.
pub struct ExecutionContext<'txn> {
    /// Storage transaction the pipeline runs against
    pub txn: &'txn mut dyn Transaction,
    /// Query parameters
    pub params: Params,
    /// Mutation counters of this execution
    pub stats: Statistics,
    /// Executor configuration
    pub config: ExecConfig,
    /// Whether a top-level mutation replaces its record with a summary
    pub summary: bool,
}

impl<'txn> ExecutionContext<'txn> {
    /// Context with default configuration and no parameters
    pub fn new(txn: &'txn mut dyn Transaction) -> Self {
        Self {
            txn,
            params: Params::new(),
            stats: Statistics::default(),
            config: ExecConfig::default(),
            summary: false,
        }
    }

    /// Set query parameters
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Set configuration
    pub fn with_config(mut self, config: ExecConfig) -> Self {
        self.config = config;
        self
    }

    /// Request a summary row from top-level mutations
    pub fn with_summary(mut self, summary: bool) -> Self {
        self.summary = summary;
        self
    }
}
