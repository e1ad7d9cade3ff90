//! Execution dispatch through the orchestrator handler (spec §5).

mod support;

use jive_domain::entities::{ExecutionMode, WorkItemType};
use jive_server::dto::{CreateWorkItemRequest, ExecuteWorkItemRequest};
use jive_server::handlers;

fn initiative(title: &str) -> CreateWorkItemRequest {
    CreateWorkItemRequest {
        item_type: WorkItemType::Initiative,
        title: title.to_owned(),
        description: String::new(),
        priority: None,
        complexity: None,
        parent_id: None,
        dependencies: Vec::new(),
        acceptance_criteria: Vec::new(),
        tags: Vec::new(),
    }
}

#[tokio::test]
async fn execute_work_item_dispatches_first_task() {
    let core = support::build_core();
    let created = handlers::create_work_item(&core, initiative("Roll out feature flag")).await.unwrap();
    let id = created["work_item"]["id"].as_str().unwrap().to_owned();

    let dispatched = handlers::execute_work_item(
        &core,
        ExecuteWorkItemRequest {
            work_item_id: id,
            mode: ExecutionMode::Sequential,
            ordering: Default::default(),
            timeout_minutes: None,
        },
    )
    .await
    .unwrap();

    assert!(dispatched.get("execution_id").is_some());
    assert_eq!(dispatched["work_item"]["title"].as_str().unwrap(), "Roll out feature flag");
}

#[tokio::test]
async fn get_execution_status_reports_progress_against_an_active_session() {
    let core = support::build_core();
    let created = handlers::create_work_item(&core, initiative("Ship the migration")).await.unwrap();
    let id = created["work_item"]["id"].as_str().unwrap().to_owned();

    let dispatched = handlers::execute_work_item(
        &core,
        ExecuteWorkItemRequest {
            work_item_id: id,
            mode: ExecutionMode::Sequential,
            ordering: Default::default(),
            timeout_minutes: None,
        },
    )
    .await
    .unwrap();
    let execution_id = dispatched["execution_id"].as_str().unwrap().to_owned();

    let status = handlers::get_execution_status(
        &core,
        jive_server::dto::GetExecutionStatusRequest {
            execution_id,
            task_completed: false,
            progress_kind: None,
            progress_message: None,
            progress_details: None,
        },
    )
    .await
    .unwrap();

    assert!(status.get("execution_id").is_some() || status.get("session").is_some());
}
