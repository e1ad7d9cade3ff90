//! Cross-crate utility modules shared by the domain and its callers.

/// ID generation, deterministic correlation (UUID v5), and content hashing.
pub mod id;
/// MCP `Content` text extraction utilities.
pub mod text;
/// Canonical time utilities — strict, no fallbacks.
pub mod time;

pub use id::{compute_content_hash, compute_file_hash, correlate_id, mask_id};
pub use text::{extract_text, extract_text_with_sep};
pub use time::epoch_secs;
