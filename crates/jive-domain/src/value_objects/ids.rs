//! Strong-typed identifiers.

define_id!(WorkItemId, "Unique identifier of a `WorkItem`.");
define_id!(ExecutionId, "Unique identifier of an `ExecutionSession`.");
