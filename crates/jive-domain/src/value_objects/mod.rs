//! Immutable value objects shared across entities and ports.

/// Strong-typed identifiers.
pub mod ids;
/// Search, filter, and pagination value objects.
pub mod search;
/// Dependency-graph validation value objects.
pub mod validation;

pub use ids::{ExecutionId, WorkItemId};
pub use search::{Filter, ListQuery, Metadata, SearchKind, SearchQuery, SearchResult, SortOrder, Warnings};
pub use validation::{GraphStats, SuggestedFix, ValidationReport};
