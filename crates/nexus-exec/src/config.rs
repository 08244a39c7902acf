//! Executor configuration

use serde::{Deserialize, Serialize};

/// Default number of ids a Delete may collect before giving up
pub const DEFAULT_DELETE_BUFFER_LIMIT: usize = 1 << 20;

/// Default initial capacity of DataChunk columns
pub const DEFAULT_CHUNK_CAPACITY: usize = 2048;

/// Executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecConfig {
    /// Maximum vertex + edge ids held by a Delete during collection
    pub delete_buffer_limit: usize,
    /// Initial capacity reserved for each DataChunk column
    pub chunk_capacity: usize,
    /// Whether expand operators enforce relationship uniqueness per path
    pub track_visited_edges: bool,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            delete_buffer_limit: DEFAULT_DELETE_BUFFER_LIMIT,
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
            track_visited_edges: true,
        }
    }
}

impl ExecConfig {
    /// Load configuration from environment variables on top of the defaults.
    ///
    /// Unparseable values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(limit) = std::env::var("NEXUS_EXEC_DELETE_BUFFER_LIMIT") {
            config.delete_buffer_limit = limit.parse().unwrap_or(config.delete_buffer_limit);
        }

        if let Ok(capacity) = std::env::var("NEXUS_EXEC_CHUNK_CAPACITY") {
            config.chunk_capacity = capacity.parse().unwrap_or(config.chunk_capacity);
        }

        if let Ok(track) = std::env::var("NEXUS_EXEC_TRACK_VISITED_EDGES") {
            config.track_visited_edges = track.parse().unwrap_or(config.track_visited_edges);
        }

        config
    }

    /// Configuration with a custom delete buffer limit
    pub fn with_delete_buffer_limit(limit: usize) -> Self {
        Self {
            delete_buffer_limit: limit,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        // SAFETY: env-mutating tests are serialized with `#[serial]`.
        unsafe {
            std::env::remove_var("NEXUS_EXEC_DELETE_BUFFER_LIMIT");
            std::env::remove_var("NEXUS_EXEC_CHUNK_CAPACITY");
            std::env::remove_var("NEXUS_EXEC_TRACK_VISITED_EDGES");
        }
    }

    #[test]
    fn test_defaults() {
        let config = ExecConfig::default();
        assert_eq!(config.delete_buffer_limit, DEFAULT_DELETE_BUFFER_LIMIT);
        assert_eq!(config.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
        assert!(config.track_visited_edges);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ExecConfig = serde_json::from_str(r#"{"delete_buffer_limit": 10}"#).unwrap();
        assert_eq!(config.delete_buffer_limit, 10);
        assert_eq!(config.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        // SAFETY: serialized, see `clear_env`.
        unsafe {
            std::env::set_var("NEXUS_EXEC_DELETE_BUFFER_LIMIT", "42");
            std::env::set_var("NEXUS_EXEC_TRACK_VISITED_EDGES", "false");
        }
        let config = ExecConfig::from_env();
        assert_eq!(config.delete_buffer_limit, 42);
        assert!(!config.track_visited_edges);
        assert_eq!(config.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_keeps_default() {
        clear_env();
        // SAFETY: serialized, see `clear_env`.
        unsafe {
            std::env::set_var("NEXUS_EXEC_CHUNK_CAPACITY", "lots");
        }
        let config = ExecConfig::from_env();
        assert_eq!(config.chunk_capacity, DEFAULT_CHUNK_CAPACITY);
        clear_env();
    }
}
