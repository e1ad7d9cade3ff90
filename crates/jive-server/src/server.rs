//! The [`rmcp::handler::server::ServerHandler`] implementation: publishes
//! the 14-tool surface (spec §6.1) and dispatches each call into
//! [`crate::handlers`].
//!
//! Dispatch is a manual match on the tool name rather than `rmcp`'s
//! `#[tool_router]`/`#[tool]` attribute macros. The macro-generated surface
//! can't be checked without running the toolchain, and the hand-matched form
//! makes the request/response shape for every tool explicit at the call
//! site.

use std::sync::Arc;

use jive_domain::error::Error;
use jive_infrastructure::Core;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, InitializeRequestParam, InitializeResult, JsonObject,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ErrorData as McpError;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::dto::{
    CancelExecutionRequest, CreateWorkItemRequest, ExecuteWorkItemRequest, GetExecutionStatusRequest,
    GetSyncStatusRequest, GetWorkItemChildrenRequest, GetWorkItemDependenciesRequest, GetWorkItemRequest,
    ListWorkItemsRequest, SearchWorkItemsRequest, SyncDatabaseToFileRequest, SyncFileToDatabaseRequest,
    UpdateWorkItemRequest, ValidateDependenciesRequest,
};
use crate::{error_mapping, handlers};

/// Tool names making up the call surface (spec §6.1), in publication order.
const TOOL_NAMES: &[&str] = &[
    "create_work_item",
    "get_work_item",
    "update_work_item",
    "list_work_items",
    "search_work_items",
    "get_work_item_children",
    "get_work_item_dependencies",
    "validate_dependencies",
    "execute_work_item",
    "get_execution_status",
    "cancel_execution",
    "sync_file_to_database",
    "sync_database_to_file",
    "get_sync_status",
];

fn description_for(name: &str) -> &'static str {
    match name {
        "create_work_item" => "Create a new work item under the hierarchy (initiative/epic/feature/story/task).",
        "get_work_item" => "Fetch a single work item by id, title slug, or short id prefix.",
        "update_work_item" => "Apply a partial update to an existing work item.",
        "list_work_items" => "List work items, optionally filtered by type, status, or parent.",
        "search_work_items" => "Search work items by keyword, vector similarity, or both.",
        "get_work_item_children" => "Fetch a work item's children, flat or as a nested hierarchy tree.",
        "get_work_item_dependencies" => "Fetch a work item's scheduling dependencies, direct or transitive.",
        "validate_dependencies" => "Validate the dependency graph for cycles, missing edges, and orphans.",
        "execute_work_item" => "Start a cooperative execution session for a work item and its children.",
        "get_execution_status" => "Report progress on a session and/or fetch the next dispatched task.",
        "cancel_execution" => "Cancel a running execution session.",
        "sync_file_to_database" => "Reconcile an on-disk work-item file into the store.",
        "sync_database_to_file" => "Render a stored work item back to its on-disk file representation.",
        "get_sync_status" => "Inspect the sync state for a file, a work item, or every tracked sync record.",
        _ => "",
    }
}

fn input_schema_for<T: JsonSchema>() -> Arc<JsonObject> {
    let schema = schemars::schema_for!(T);
    let object = serde_json::to_value(&schema)
        .ok()
        .and_then(|value| serde_json::from_value::<JsonObject>(value).ok())
        .unwrap_or_default();
    Arc::new(object)
}

fn tool_for(name: &str) -> Tool {
    let schema = match name {
        "create_work_item" => input_schema_for::<CreateWorkItemRequest>(),
        "get_work_item" => input_schema_for::<GetWorkItemRequest>(),
        "update_work_item" => input_schema_for::<UpdateWorkItemRequest>(),
        "list_work_items" => input_schema_for::<ListWorkItemsRequest>(),
        "search_work_items" => input_schema_for::<SearchWorkItemsRequest>(),
        "get_work_item_children" => input_schema_for::<GetWorkItemChildrenRequest>(),
        "get_work_item_dependencies" => input_schema_for::<GetWorkItemDependenciesRequest>(),
        "validate_dependencies" => input_schema_for::<ValidateDependenciesRequest>(),
        "execute_work_item" => input_schema_for::<ExecuteWorkItemRequest>(),
        "get_execution_status" => input_schema_for::<GetExecutionStatusRequest>(),
        "cancel_execution" => input_schema_for::<CancelExecutionRequest>(),
        "sync_file_to_database" => input_schema_for::<SyncFileToDatabaseRequest>(),
        "sync_database_to_file" => input_schema_for::<SyncDatabaseToFileRequest>(),
        "get_sync_status" => input_schema_for::<GetSyncStatusRequest>(),
        _ => Arc::new(JsonObject::default()),
    };
    Tool::new(name.to_owned(), description_for(name), schema)
}

fn parse_args<T: DeserializeOwned>(request: &CallToolRequestParam) -> Result<T, Error> {
    let arguments = request.arguments.clone().unwrap_or_default();
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| Error::validation(format!("invalid arguments for {}: {e}", request.name)))
}

/// The MCP server: a thin `ServerHandler` shell around a shared [`Core`].
#[derive(Clone)]
pub struct JiveMcpServer {
    core: Arc<Core>,
}

impl JiveMcpServer {
    #[must_use]
    pub fn new(core: Arc<Core>) -> Self {
        Self { core }
    }

    async fn dispatch(&self, request: CallToolRequestParam) -> CallToolResult {
        let result = self.dispatch_inner(&request).await;
        match result {
            Ok(result) => result,
            Err(error) => error_mapping::from_error(&error),
        }
    }

    async fn dispatch_inner(&self, request: &CallToolRequestParam) -> Result<CallToolResult, Error> {
        let core = self.core.as_ref();
        let payload = match request.name.as_ref() {
            "create_work_item" => handlers::create_work_item(core, parse_args(request)?).await?,
            "get_work_item" => handlers::get_work_item(core, parse_args(request)?).await?,
            "update_work_item" => handlers::update_work_item(core, parse_args(request)?).await?,
            "list_work_items" => handlers::list_work_items(core, parse_args(request)?).await?,
            "search_work_items" => handlers::search_work_items(core, parse_args(request)?).await?,
            "get_work_item_children" => handlers::get_work_item_children(core, parse_args(request)?).await?,
            "get_work_item_dependencies" => handlers::get_work_item_dependencies(core, parse_args(request)?).await?,
            "validate_dependencies" => handlers::validate_dependencies(core, parse_args(request)?).await?,
            "execute_work_item" => handlers::execute_work_item(core, parse_args(request)?).await?,
            "get_execution_status" => handlers::get_execution_status(core, parse_args(request)?).await?,
            "cancel_execution" => handlers::cancel_execution(core, parse_args(request)?).await?,
            "sync_file_to_database" => {
                let (payload, is_conflict) = handlers::sync_file_to_database(core, parse_args(request)?).await?;
                return Ok(if is_conflict { error_mapping::conflict(payload) } else { error_mapping::ok(payload) });
            }
            "sync_database_to_file" => handlers::sync_database_to_file(core, parse_args(request)?).await?,
            "get_sync_status" => handlers::get_sync_status(core, parse_args(request)?).await?,
            other => return Err(Error::validation(format!("unknown tool: {other}"))),
        };
        Ok(error_mapping::ok(payload))
    }
}

impl rmcp::handler::server::ServerHandler for JiveMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "jive".to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                title: Some("Jive work-item orchestration engine".to_owned()),
                website_url: None,
                icons: None,
            },
            instructions: Some(
                "Hierarchical work-item orchestration for autonomous agents: create and query work \
                 items, resolve dependencies, drive cooperative execution sessions, and sync work \
                 items with on-disk files."
                    .to_owned(),
            ),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = TOOL_NAMES.iter().map(|name| tool_for(name)).collect();
        Ok(ListToolsResult { tools, next_cursor: None })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.dispatch(request).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_every_tool_exactly_once() {
        let mut seen = std::collections::HashSet::new();
        for name in TOOL_NAMES {
            assert!(seen.insert(*name), "duplicate tool name: {name}");
            assert!(!description_for(name).is_empty(), "missing description for {name}");
        }
        assert_eq!(TOOL_NAMES.len(), 14);
    }

    #[test]
    fn builds_a_schema_for_every_tool() {
        for name in TOOL_NAMES {
            let tool = tool_for(name);
            assert_eq!(tool.name.as_ref(), *name);
            assert!(tool.input_schema.contains_key("type") || tool.input_schema.contains_key("properties"));
        }
    }
}
