//! Typed argument structs for the tool-call surface (spec §6.1, SPEC_FULL
//! §9 "From JSON-dict payloads to typed request/response structs"). Each
//! struct derives [`schemars::JsonSchema`] so [`crate::server`] can publish
//! an accurate `inputSchema` per tool.

use jive_domain::entities::{Complexity, ExecutionMode, Priority, ProgressKind, WorkItemType};
use jive_domain::ports::{FileFormat, MergeStrategy};
use jive_domain::value_objects::{SearchKind, SortOrder};
use jive_application::PlanOrdering;
use schemars::JsonSchema;
use serde::Deserialize;

fn default_search_limit() -> usize {
    10
}

fn default_hierarchy_depth() -> usize {
    10
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateWorkItemRequest {
    #[serde(rename = "type")]
    pub item_type: WorkItemType,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub complexity: Option<Complexity>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetWorkItemRequest {
    pub work_item_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateWorkItemRequest {
    pub work_item_id: String,
    pub updates: serde_json::Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListWorkItemsRequest {
    pub item_type: Option<WorkItemType>,
    pub status: Option<String>,
    pub parent_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchWorkItemsRequest {
    pub query: String,
    #[serde(default = "default_search_kind")]
    pub kind: SearchKind,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

fn default_search_kind() -> SearchKind {
    SearchKind::Hybrid
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetWorkItemChildrenRequest {
    pub work_item_id: String,
    #[serde(default)]
    pub recursive: bool,
    #[serde(default = "default_hierarchy_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetWorkItemDependenciesRequest {
    pub work_item_id: String,
    #[serde(default)]
    pub transitive: bool,
    #[serde(default)]
    pub only_blocking: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ValidateDependenciesRequest {
    #[serde(default)]
    pub work_item_ids: Vec<String>,
    #[serde(default = "default_true")]
    pub check_circular: bool,
    #[serde(default = "default_true")]
    pub check_missing: bool,
    #[serde(default)]
    pub suggest_fixes: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteWorkItemRequest {
    pub work_item_id: String,
    #[serde(default = "default_execution_mode")]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub ordering: PlanOrderingArg,
    pub timeout_minutes: Option<u64>,
}

fn default_execution_mode() -> ExecutionMode {
    ExecutionMode::Sequential
}

/// Schema-friendly mirror of [`PlanOrdering`] (which has no `JsonSchema`
/// derive of its own, living in the application layer).
#[derive(Debug, Clone, Copy, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanOrderingArg {
    #[default]
    DependencyOrder,
    PriorityHighFirst,
    ComplexitySimpleFirst,
}

impl From<PlanOrderingArg> for PlanOrdering {
    fn from(value: PlanOrderingArg) -> Self {
        match value {
            PlanOrderingArg::DependencyOrder => Self::DependencyOrder,
            PlanOrderingArg::PriorityHighFirst => Self::PriorityHighFirst,
            PlanOrderingArg::ComplexitySimpleFirst => Self::ComplexitySimpleFirst,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetExecutionStatusRequest {
    pub execution_id: String,
    #[serde(default)]
    pub task_completed: bool,
    pub progress_kind: Option<ProgressKind>,
    pub progress_message: Option<String>,
    pub progress_details: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CancelExecutionRequest {
    pub execution_id: String,
    #[serde(default = "default_reason")]
    pub reason: String,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub rollback_changes: bool,
}

fn default_reason() -> String {
    "user".to_owned()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SyncFileToDatabaseRequest {
    pub file_path: String,
    pub file_content: String,
    #[serde(default = "default_merge_strategy")]
    pub merge_strategy: MergeStrategy,
    #[serde(default)]
    pub validate_only: bool,
}

fn default_merge_strategy() -> MergeStrategy {
    MergeStrategy::AutoMerge
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SyncDatabaseToFileRequest {
    pub work_item_id: String,
    pub file_path: Option<String>,
    #[serde(default = "default_format")]
    pub format: FileFormat,
}

fn default_format() -> FileFormat {
    FileFormat::Json
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetSyncStatusRequest {
    pub identifier: Option<String>,
    pub file_path: Option<String>,
    pub work_item_id: Option<String>,
    #[serde(default)]
    pub check_all: bool,
}
