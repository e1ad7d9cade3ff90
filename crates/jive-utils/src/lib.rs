//! Layer-0 shared utilities: no dependency on `jive-domain` or any other
//! workspace crate, so every layer can use them without a cycle.

/// SHA-256 content hashing.
pub mod hash;
/// Filesystem-safe slug generation for the Store→File default path template.
pub mod slug;
/// Raw Unix-epoch helpers (infallible wall-clock access).
pub mod time;

pub use hash::sha256_hex;
pub use slug::slugify;
