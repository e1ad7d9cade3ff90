//! The recognized configuration keys (spec §6.4 plus the ambient entries
//! SPEC_FULL §10.3 adds).

use serde::{Deserialize, Serialize};

/// The core's full, validated configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filesystem root for the Store (spec §6.4).
    pub data_path: String,
    /// Name of the embedding function; determines D (spec §6.4).
    pub embedding_model: String,
    /// Whether to L2-normalize embeddings before insert (spec §6.4).
    pub normalize_embeddings: bool,
    /// If false, keyword search uses substring fallback only (spec §6.4).
    pub enable_fts: bool,
    /// Bound for `ExecutorDriver` concurrency, default 3 (spec §6.4).
    pub max_parallel: usize,
    /// Default session timeout in minutes, default 60 (spec §6.4).
    pub session_timeout_minutes: u64,
    /// Default per-operation timeout in seconds, default 30 (spec §6.4).
    pub store_op_timeout_seconds: u64,
    /// Store write retry count (spec §6.4). The Store itself hardcodes its
    /// own 3-attempt budget per spec §4.1; this key governs provider
    /// construction/connection retries at the infrastructure layer.
    pub store_max_retries: usize,
    /// Store write retry base delay in milliseconds (spec §6.4).
    pub store_retry_base_ms: u64,

    /// `tracing` level filter (SPEC_FULL §10.3 ambient entry).
    pub log_level: String,
    /// `tracing-subscriber` formatter, `pretty` or `json` (SPEC_FULL §10.3).
    pub log_format: String,
    /// Bind address for the optional HTTP MCP transport (SPEC_FULL §10.3).
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: ".jivedev/data".to_owned(),
            embedding_model: "deterministic".to_owned(),
            normalize_embeddings: true,
            enable_fts: true,
            max_parallel: 3,
            session_timeout_minutes: 60,
            store_op_timeout_seconds: 30,
            store_max_retries: 3,
            store_retry_base_ms: 1_000,
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            bind_addr: "127.0.0.1:8765".to_owned(),
        }
    }
}
