//! Core business entities with identity.

/// The directed dependency relationship between two work items.
pub mod dependency;
/// `ExecutionSession` and its supporting value types.
pub mod execution;
/// Reconciliation state between an on-disk file and a stored work item.
pub mod sync_record;
/// The primary orchestration entity.
pub mod work_item;

pub use dependency::{Dependency, DependencyKind};
pub use execution::{
    ExecutionMode, ExecutionSession, ProgressKind, ProgressUpdate, SessionStatus, TaskSlot,
    TaskSlotStatus,
};
pub use sync_record::SyncRecord;
pub use work_item::{Complexity, Priority, WorkItem, WorkItemStatus, WorkItemType};
