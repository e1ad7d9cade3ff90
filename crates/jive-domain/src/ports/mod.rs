//! External provider port interfaces — the only seam other layers depend on.

/// The `EmbeddingProvider` port.
pub mod embedding;
/// The `Store` port.
pub mod store;
/// File/conflict value types shared by the `SyncEngine`.
pub mod sync;

pub use embedding::EmbeddingProvider;
pub use store::{Store, Table};
pub use sync::{ConflictField, FileFormat, MergeStrategy, ParsedWorkItem, SyncConflict};
