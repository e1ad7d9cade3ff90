//! Domain-wide constants.
//!
//! Defaults here mirror spec §5/§6.4; configuration (infrastructure layer)
//! may override every one of these at boot, never at call time.

/// Dimension of the reference embedding model's output vector.
pub const EMBEDDING_DIM: usize = 384;

/// Default bound on concurrent `ExecutorDriver` child dispatch.
pub const DEFAULT_MAX_PARALLEL: usize = 3;

/// Default `ExecutionSession` timeout, in minutes.
pub const DEFAULT_SESSION_TIMEOUT_MINUTES: u64 = 60;

/// Default per-operation Store timeout, in seconds.
pub const DEFAULT_STORE_OP_TIMEOUT_SECONDS: u64 = 30;

/// Default number of Store write retry attempts (including the first).
pub const DEFAULT_STORE_MAX_RETRIES: u32 = 3;

/// Base backoff delay for Store write retries, in milliseconds. Doubles per
/// attempt (exponential, factor 2).
pub const DEFAULT_STORE_RETRY_BASE_MS: u64 = 1_000;

/// Maximum depth for hierarchy traversal (`children`, `hierarchy`). Deeper
/// trees are truncated, never errored.
pub const HIERARCHY_DEPTH_CAP: usize = 10;

/// Maximum number of simple cycles the `DependencyEngine` will enumerate
/// before flagging `cycle_enumeration_truncated`.
pub const CYCLE_ENUMERATION_CAP: usize = 10_000;

/// Result limit for the Resolver's keyword stage.
pub const RESOLVER_KEYWORD_LIMIT: usize = 5;

/// The hierarchy chain, root to leaf. `type` must appear directly below its
/// parent's type in this chain (spec §3.2 invariant 1).
pub const TYPE_CHAIN: [&str; 5] = ["initiative", "epic", "feature", "story", "task"];
