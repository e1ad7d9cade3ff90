//! UUID generation, deterministic correlation, and content hashing.

use std::fs;
use std::path::Path;

use uuid::Uuid;

use crate::error::{Error, Result};

/// Generates a new random UUID v4.
#[must_use]
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generates a deterministic UUID v5 from a namespace string and key.
#[must_use]
pub fn deterministic(namespace: &str, key: &str) -> Uuid {
    let ns = Uuid::new_v5(&Uuid::NAMESPACE_OID, namespace.as_bytes());
    Uuid::new_v5(&ns, key.as_bytes())
}

/// Deterministic UUID v5 correlation string for a `kind+raw_id` pair.
/// Same (kind, `raw_id`) always produces the same UUID string.
#[must_use]
pub fn correlate_id(kind: &str, raw_id: &str) -> String {
    deterministic(kind, raw_id).to_string()
}

/// SHA-256 hex digest of content (spec §3.2 invariant 7: `SyncRecord.checksum`).
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    jive_utils::sha256_hex(content.as_bytes())
}

/// Mask sensitive ID for logging — shows first 8 chars + "...".
#[must_use]
pub fn mask_id(id: &str) -> String {
    if id.len() <= 8 {
        id.to_owned()
    } else {
        format!("{}...", &id[..8])
    }
}

/// Compute the SHA-256 hash of a file's content on disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).map_err(|e| Error::io(format!("failed to read file {path:?}: {e}")))?;
    Ok(jive_utils::sha256_hex(&bytes))
}
