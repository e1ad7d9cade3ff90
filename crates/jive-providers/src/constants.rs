//! Tunables for the Store and its embedding providers (spec §4.1).

/// Dimension `D` of the reference embedding model (spec §4.1).
pub const EMBEDDING_DIMENSION: usize = 384;

/// Write retry budget: exponential backoff, base 1 s, factor 2, max 3
/// attempts (spec §4.1 failure model).
pub const STORE_WRITE_RETRY_BASE_MS: u64 = 1_000;
/// Backoff multiplier applied after each failed write attempt.
pub const STORE_WRITE_RETRY_FACTOR: u32 = 2;
/// Maximum write attempts before surfacing `StoreIo` to the caller.
pub const STORE_WRITE_MAX_ATTEMPTS: usize = 3;

/// Ollama server default base URL.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";
/// Ollama default embedding model.
pub const OLLAMA_DEFAULT_MODEL: &str = "nomic-embed-text";
/// Ollama embed API endpoint path.
pub const OLLAMA_EMBED_ENDPOINT: &str = "/api/embed";

/// `FastEmbed` default model identifier.
pub const FASTEMBED_DEFAULT_MODEL: &str = "AllMiniLML6V2";
