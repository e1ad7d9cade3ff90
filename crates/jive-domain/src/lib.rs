//! # Domain Layer
//!
//! Core business logic and domain types for hierarchical work-item
//! orchestration. Contains only pure domain entities, value objects, ports,
//! and business rules — no infrastructure concerns.
//!
//! ## Architecture
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`entities`] | `WorkItem`, `Dependency`, `ExecutionSession`, `SyncRecord` |
//! | [`value_objects`] | Search/validation value types |
//! | [`ports`] | `Store` and `EmbeddingProvider` port interfaces |
//! | [`constants`] | Domain constants (embedding dimension, caps, defaults) |
//! | [`error`] | Domain error types |
//!
//! ## Clean Architecture Principles
//!
//! - **Entities** are at the center with business rules
//! - **Value Objects** are immutable and compared by value
//! - **Ports** are the only seam other layers may depend on
//! - **No infrastructure** — no file I/O, no network, no process state

/// Common macros
#[macro_use]
pub mod macros;

/// Domain-level constants
pub mod constants;
/// Core business entities with identity
pub mod entities;
/// Domain error types
pub mod error;
/// External provider port interfaces
pub mod ports;
/// Provider auto-registration registry
pub mod registry;
/// Common utilities
pub mod utils;
/// Immutable value objects
pub mod value_objects;

pub use constants::*;
pub use entities::*;
pub use error::{Error, Result};
pub use value_objects::*;
