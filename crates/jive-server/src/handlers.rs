//! One function per tool in the call surface (spec §6.1), each a thin
//! translation between [`crate::dto`] request structs and the application
//! layer's use cases. No transport or schema concerns live here.

use chrono::Utc;
use jive_application::{PlanOrdering, ProgressReport, StatusOutcome, SyncOutcome};
use jive_domain::entities::{
    Dependency, DependencyKind, ExecutionSession, Priority, WorkItem, WorkItemStatus, WorkItemType,
};
use jive_domain::error::{Error, Result};
use jive_domain::ports::Table;
use jive_domain::value_objects::{ExecutionId, Filter, ListQuery, SearchQuery, WorkItemId};
use jive_infrastructure::Core;
use serde_json::{json, Value};

use crate::dto::{
    CancelExecutionRequest, CreateWorkItemRequest, ExecuteWorkItemRequest, GetExecutionStatusRequest,
    GetSyncStatusRequest, GetWorkItemChildrenRequest, GetWorkItemDependenciesRequest, GetWorkItemRequest,
    ListWorkItemsRequest, SearchWorkItemsRequest, SyncDatabaseToFileRequest, SyncFileToDatabaseRequest,
    UpdateWorkItemRequest, ValidateDependenciesRequest,
};

async fn resolve_required(core: &Core, identifier: &str) -> Result<WorkItemId> {
    core.resolver
        .resolve(identifier)
        .await?
        .ok_or_else(|| Error::not_found(format!("work_item/{identifier}")))
}

async fn fetch_work_item(core: &Core, id: WorkItemId) -> Result<WorkItem> {
    let record = core
        .store
        .get(Table::WorkItem, &id.to_string())
        .await?
        .ok_or_else(|| Error::not_found(format!("work_item/{id}")))?;
    Ok(serde_json::from_value(record)?)
}

fn parse_execution_id(raw: &str) -> Result<ExecutionId> {
    raw.parse().map_err(|_| Error::validation(format!("\"{raw}\" is not a valid execution_id")))
}

/// Creates a `Dependency` row for every id in `dependencies`, interpreted as
/// `source depends_on target` (spec §4.3). There is no separate
/// `add_dependency` tool in the surface, so `create_work_item`/
/// `update_work_item` are the only write path for these edges.
async fn write_dependency_edges(core: &Core, source: WorkItemId, targets: &[WorkItemId]) -> Result<()> {
    for &target in targets {
        let edge = Dependency::new(source, target, DependencyKind::DependsOn);
        let record = serde_json::to_value(&edge)?;
        let mut tagged = record;
        tagged["id"] = json!(format!("{source}:{target}"));
        core.store.create(Table::Dependency, tagged).await?;
    }
    Ok(())
}

pub async fn create_work_item(core: &Core, req: CreateWorkItemRequest) -> Result<Value> {
    let parent_id = req.parent_id.as_deref().map(str::parse::<WorkItemId>).transpose().map_err(|_| {
        Error::validation(format!("\"{}\" is not a valid parent_id", req.parent_id.as_deref().unwrap_or_default()))
    })?;
    let dependencies = req
        .dependencies
        .iter()
        .map(|raw| raw.parse::<WorkItemId>().map_err(|_| Error::validation(format!("\"{raw}\" is not a valid dependency id"))))
        .collect::<Result<Vec<_>>>()?;

    let now = Utc::now();
    let item = WorkItem {
        id: WorkItemId::new(),
        item_type: req.item_type,
        title: req.title,
        description: req.description,
        status: WorkItemStatus::Backlog,
        priority: req.priority.unwrap_or(Priority::Medium),
        complexity: req.complexity,
        parent_id,
        dependencies: dependencies.clone(),
        acceptance_criteria: req.acceptance_criteria,
        progress_percentage: 0,
        tags: req.tags.into_iter().collect(),
        metadata: Default::default(),
        created_at: now,
        updated_at: now,
        embedding: Vec::new(),
    };
    item.validate()?;
    core.hierarchy.enforce_position(&item).await?;

    let record = serde_json::to_value(&item)?;
    let created = core.store.create(Table::WorkItem, record).await?;
    write_dependency_edges(core, item.id, &dependencies).await?;

    Ok(json!({ "work_item": created }))
}

pub async fn get_work_item(core: &Core, req: GetWorkItemRequest) -> Result<Value> {
    let id = resolve_required(core, &req.work_item_id).await?;
    let item = fetch_work_item(core, id).await?;
    Ok(json!({ "work_item": item }))
}

pub async fn update_work_item(core: &Core, req: UpdateWorkItemRequest) -> Result<Value> {
    let id = resolve_required(core, &req.work_item_id).await?;
    let patch = req.updates.as_object().cloned().ok_or_else(|| Error::validation("updates must be a JSON object"))?;

    if patch.contains_key("parent_id") || patch.contains_key("type") {
        let current = fetch_work_item(core, id).await?;
        let mut candidate = current;
        if let Some(parent) = patch.get("parent_id") {
            candidate.parent_id = serde_json::from_value(parent.clone())?;
        }
        if let Some(item_type) = patch.get("type") {
            candidate.item_type = serde_json::from_value::<WorkItemType>(item_type.clone())?;
        }
        core.hierarchy.enforce_position(&candidate).await?;
    }

    let updated = core.store.update(Table::WorkItem, &id.to_string(), Value::Object(patch)).await?;

    if let Some(raw_deps) = updated.get("dependencies").and_then(Value::as_array) {
        let dependencies: Vec<WorkItemId> =
            raw_deps.iter().filter_map(|v| v.as_str()).filter_map(|s| s.parse().ok()).collect();
        write_dependency_edges(core, id, &dependencies).await?;
    }

    Ok(json!({ "work_item": updated }))
}

pub async fn list_work_items(core: &Core, req: ListWorkItemsRequest) -> Result<Value> {
    let mut filters = Vec::new();
    if let Some(item_type) = req.item_type {
        filters.push(Filter::Equals { field: "type".to_owned(), value: json!(item_type) });
    }
    if let Some(status) = &req.status {
        let (canonical, aliased) = WorkItemStatus::parse_with_alias(status)
            .ok_or_else(|| Error::validation(format!("unknown status \"{status}\"")))?;
        if aliased {
            tracing::warn!(requested = %status, canonical = %canonical, "status alias used in list_work_items filter");
        }
        filters.push(Filter::Equals { field: "status".to_owned(), value: json!(canonical) });
    }
    if let Some(parent_id) = &req.parent_id {
        filters.push(Filter::Equals { field: "parent_id".to_owned(), value: json!(parent_id) });
    }

    let query = ListQuery { filters, sort_by: req.sort_by, sort_order: req.sort_order, limit: req.limit, offset: req.offset };
    let items = core.store.list(Table::WorkItem, query).await?;
    Ok(json!({ "work_items": items, "count": items.len() }))
}

pub async fn search_work_items(core: &Core, req: SearchWorkItemsRequest) -> Result<Value> {
    let results = core
        .store
        .search(Table::WorkItem, SearchQuery { query: req.query, kind: req.kind, limit: req.limit, filters: Vec::new() })
        .await?;
    Ok(json!({ "results": results }))
}

pub async fn get_work_item_children(core: &Core, req: GetWorkItemChildrenRequest) -> Result<Value> {
    let id = resolve_required(core, &req.work_item_id).await?;
    let depth = if req.recursive { req.max_depth } else { 1 };
    let Some(node) = core.hierarchy.hierarchy(id, depth).await? else {
        return Err(Error::not_found(format!("work_item/{id}")));
    };
    Ok(json!({ "hierarchy": hierarchy_node_to_json(&node) }))
}

fn hierarchy_node_to_json(node: &jive_application::HierarchyNode) -> Value {
    json!({
        "item": node.item,
        "depth": node.depth,
        "path": node.path,
        "children": node.children.iter().map(hierarchy_node_to_json).collect::<Vec<_>>(),
    })
}

pub async fn get_work_item_dependencies(core: &Core, req: GetWorkItemDependenciesRequest) -> Result<Value> {
    let id = resolve_required(core, &req.work_item_id).await?;
    let dependencies = core.dependency_engine.dependencies_of(id, req.transitive, req.only_blocking).await?;
    Ok(json!({ "work_item_id": id, "dependencies": dependencies }))
}

pub async fn validate_dependencies(core: &Core, req: ValidateDependenciesRequest) -> Result<Value> {
    let ids = if req.work_item_ids.is_empty() {
        core.store
            .list(Table::WorkItem, ListQuery::default())
            .await?
            .into_iter()
            .filter_map(|record| record.get("id").and_then(Value::as_str).and_then(|s| s.parse().ok()))
            .collect::<Vec<WorkItemId>>()
    } else {
        req.work_item_ids
            .iter()
            .map(|raw| raw.parse::<WorkItemId>().map_err(|_| Error::validation(format!("\"{raw}\" is not a valid work_item_id"))))
            .collect::<Result<Vec<_>>>()?
    };

    let report = core.dependency_engine.validate(&ids, req.check_circular, req.check_missing, req.suggest_fixes).await?;
    Ok(serde_json::to_value(report)?)
}

pub async fn execute_work_item(core: &Core, req: ExecuteWorkItemRequest) -> Result<Value> {
    let ordering: PlanOrdering = req.ordering.into();
    let outcome = core.orchestrator.execute(&req.work_item_id, req.mode, ordering, req.timeout_minutes).await?;
    Ok(status_outcome_to_json(outcome))
}

pub async fn get_execution_status(core: &Core, req: GetExecutionStatusRequest) -> Result<Value> {
    let execution_id = parse_execution_id(&req.execution_id)?;
    let report = req.progress_kind.map(|kind| ProgressReport {
        kind,
        message: req.progress_message.unwrap_or_default(),
        details: req.progress_details,
    });
    let outcome = core.orchestrator.status(execution_id, req.task_completed, report).await?;
    Ok(status_outcome_to_json(outcome))
}

pub async fn cancel_execution(core: &Core, req: CancelExecutionRequest) -> Result<Value> {
    let execution_id = parse_execution_id(&req.execution_id)?;
    let session = core.orchestrator.cancel(execution_id, &req.reason, req.force, req.rollback_changes)?;
    Ok(json!({ "session": session }))
}

fn status_outcome_to_json(outcome: StatusOutcome) -> Value {
    match outcome {
        StatusOutcome::Dispatched(task) => json!({
            "execution_id": task.execution_id,
            "work_item": task.work_item,
            "position": task.position_label,
            "mode": task.mode,
            "guidance": {
                "approach": task.guidance.approach,
                "considerations": task.guidance.considerations,
                "success_criteria": task.guidance.success_criteria,
                "best_practices": task.guidance.best_practices,
                "pitfalls": task.guidance.pitfalls,
                "tools": task.guidance.tools,
            },
            "reporting_contract": task.reporting_contract,
        }),
        StatusOutcome::Finished(session) => session_to_json(&session),
    }
}

fn session_to_json(session: &ExecutionSession) -> Value {
    json!({ "session": session })
}

pub async fn sync_file_to_database(core: &Core, req: SyncFileToDatabaseRequest) -> Result<(Value, bool)> {
    let outcome = core
        .sync_engine
        .sync_file_to_store(&req.file_path, req.file_content.as_bytes(), req.merge_strategy, req.validate_only)
        .await?;
    Ok(match outcome {
        SyncOutcome::Success(item) => (json!({ "work_item": item }), false),
        SyncOutcome::Conflict(conflict) => (json!({ "conflict": conflict }), true),
    })
}

pub async fn sync_database_to_file(core: &Core, req: SyncDatabaseToFileRequest) -> Result<Value> {
    let id = resolve_required(core, &req.work_item_id).await?;
    let (bytes, record) = core.sync_engine.sync_store_to_file(id, req.file_path, req.format).await?;
    Ok(json!({
        "file_content": String::from_utf8_lossy(&bytes),
        "sync_record": record,
    }))
}

pub async fn get_sync_status(core: &Core, req: GetSyncStatusRequest) -> Result<Value> {
    if req.check_all {
        return Ok(json!({ "sync_records": core.sync_engine.all_sync_records() }));
    }
    if let Some(path) = &req.file_path {
        return Ok(json!({ "sync_record": core.sync_engine.sync_record_for_path(path) }));
    }
    if let Some(raw) = req.work_item_id.as_deref().or(req.identifier.as_deref()) {
        let id = resolve_required(core, raw).await?;
        return Ok(json!({ "sync_record": core.sync_engine.sync_record_for_work_item(id) }));
    }
    Err(Error::validation("one of identifier, file_path, work_item_id, or check_all is required"))
}
