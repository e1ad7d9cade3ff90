//! `ExecutionSession` and its supporting value types (spec §3.1, §4.6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{ExecutionId, WorkItemId};

define_string_enum! {
    /// A `TaskSlot`'s own status within a plan, independent of the
    /// `WorkItem`'s Store-level status.
    pub enum TaskSlotStatus {
        Ready => "ready",
        InProgress => "in_progress",
        Completed => "completed",
        Failed => "failed",
    }
}

/// One entry in an `ExecutionSession`'s ordered plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, schemars::JsonSchema)]
pub struct TaskSlot {
    /// The work item this slot dispatches.
    pub id: WorkItemId,
    /// Position in the plan, zero-based.
    pub order: u32,
    /// Slot-local status.
    pub status: TaskSlotStatus,
}

define_string_enum! {
    /// `ExecutionSession` lifecycle state (spec §4.6.2).
    pub enum SessionStatus {
        Ready => "ready",
        Running => "running",
        Blocked => "blocked",
        Completed => "completed",
        Cancelled => "cancelled",
        Failed => "failed",
    }
}

define_string_enum! {
    /// How children are scheduled when an `ExecutionSession` spans a subtree.
    pub enum ExecutionMode {
        Sequential => "sequential",
        Parallel => "parallel",
        DependencyBased => "dependency_based",
    }
}

define_string_enum! {
    /// Category of a caller-reported `ProgressUpdate`.
    pub enum ProgressKind {
        Progress => "progress",
        Milestone => "milestone",
        Blocker => "blocker",
        Completion => "completion",
    }
}

/// A single caller-reported event advancing or annotating a session.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ProgressUpdate {
    /// When the update was recorded.
    pub timestamp: DateTime<Utc>,
    /// The kind of event.
    pub kind: ProgressKind,
    /// Index into the session's plan this update refers to.
    pub task_index: usize,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail payload.
    pub details: Option<serde_json::Value>,
}

/// An in-memory object tracking the cooperative execution of a work-item
/// plan (spec §3.1, §4.6). Sessions are never persisted; they live only in
/// the Orchestrator's process memory.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ExecutionSession {
    /// Unique session identifier.
    pub execution_id: ExecutionId,
    /// The work item the session was started on.
    pub root_id: WorkItemId,
    /// Ordered, immutable-after-creation dispatch plan.
    pub plan: Vec<TaskSlot>,
    /// Index of the task currently dispatched; monotonically non-decreasing
    /// except on cancel (spec §3.2 invariant 6).
    pub current_index: usize,
    /// Current lifecycle state.
    pub status: SessionStatus,
    /// When the session was created.
    pub started_at: DateTime<Utc>,
    /// Append-only log of every reported update, in arrival order.
    pub updates: Vec<ProgressUpdate>,
    /// Child scheduling strategy.
    pub mode: ExecutionMode,
    /// Minutes after `started_at` at which the session fails with
    /// `reason=timeout` if still active.
    pub timeout_minutes: u64,
    /// Set by `cancel`; `None` while the session is active.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// File paths touched by this session's delegated work, tracked so
    /// `cancel(rollback_changes=true)` knows what to ask the `SyncEngine`
    /// to revert.
    #[serde(default)]
    pub affected_paths: Vec<String>,
}

impl ExecutionSession {
    /// The task currently at the front of the plan, if any remain.
    #[must_use]
    pub fn current_task(&self) -> Option<&TaskSlot> {
        self.plan.get(self.current_index)
    }

    /// `true` once every plan slot has been dispatched and completed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.plan.len()
    }

    /// `"k of N"` position string for the currently dispatched task (spec §4.6.3).
    #[must_use]
    pub fn position_label(&self) -> String {
        format!("{} of {}", self.current_index + 1, self.plan.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session(plan_len: usize) -> ExecutionSession {
        let now = Utc::now();
        ExecutionSession {
            execution_id: ExecutionId::new(),
            root_id: WorkItemId::new(),
            plan: (0..plan_len)
                .map(|i| TaskSlot {
                    id: WorkItemId::new(),
                    order: u32::try_from(i).expect("plan_len fits u32 in tests"),
                    status: TaskSlotStatus::Ready,
                })
                .collect(),
            current_index: 0,
            status: SessionStatus::Ready,
            started_at: now,
            updates: Vec::new(),
            mode: ExecutionMode::Sequential,
            timeout_minutes: 60,
            cancelled_at: None,
            affected_paths: Vec::new(),
        }
    }

    #[test]
    fn current_task_tracks_index() {
        let mut session = sample_session(2);
        assert!(session.current_task().is_some());
        session.current_index = 2;
        assert!(session.current_task().is_none());
        assert!(session.is_exhausted());
    }

    #[test]
    fn position_label_is_one_based() {
        let session = sample_session(3);
        assert_eq!(session.position_label(), "1 of 3");
    }
}
