//! Create/read/update/list round-trips through the handler layer (spec §6.1).

mod support;

use jive_domain::entities::WorkItemType;
use jive_server::dto::{CreateWorkItemRequest, GetWorkItemRequest, ListWorkItemsRequest, UpdateWorkItemRequest};
use jive_server::handlers;
use serde_json::json;

fn create_initiative_request(title: &str) -> CreateWorkItemRequest {
    CreateWorkItemRequest {
        item_type: WorkItemType::Initiative,
        title: title.to_owned(),
        description: "top-level initiative".to_owned(),
        priority: None,
        complexity: None,
        parent_id: None,
        dependencies: Vec::new(),
        acceptance_criteria: Vec::new(),
        tags: Vec::new(),
    }
}

#[tokio::test]
async fn create_then_get_round_trips() {
    let core = support::build_core();
    let created = handlers::create_work_item(&core, create_initiative_request("Launch v2")).await.unwrap();
    let id = created["work_item"]["id"].as_str().unwrap().to_owned();

    let fetched = handlers::get_work_item(&core, GetWorkItemRequest { work_item_id: id.clone() }).await.unwrap();
    assert_eq!(fetched["work_item"]["id"].as_str().unwrap(), id);
    assert_eq!(fetched["work_item"]["title"].as_str().unwrap(), "Launch v2");
    assert_eq!(fetched["work_item"]["status"].as_str().unwrap(), "backlog");
}

#[tokio::test]
async fn rejects_non_root_item_without_parent() {
    let core = support::build_core();
    let mut request = create_initiative_request("orphan task");
    request.item_type = WorkItemType::Task;

    let error = handlers::create_work_item(&core, request).await.unwrap_err();
    assert!(matches!(error, jive_domain::error::Error::HierarchyViolation { .. }));
}

#[tokio::test]
async fn update_patches_title_and_status() {
    let core = support::build_core();
    let created = handlers::create_work_item(&core, create_initiative_request("Launch v2")).await.unwrap();
    let id = created["work_item"]["id"].as_str().unwrap().to_owned();

    let updated = handlers::update_work_item(
        &core,
        UpdateWorkItemRequest { work_item_id: id.clone(), updates: json!({ "status": "ready" }) },
    )
    .await
    .unwrap();

    assert_eq!(updated["work_item"]["status"].as_str().unwrap(), "ready");
}

#[tokio::test]
async fn list_filters_by_type() {
    let core = support::build_core();
    handlers::create_work_item(&core, create_initiative_request("Initiative A")).await.unwrap();
    handlers::create_work_item(&core, create_initiative_request("Initiative B")).await.unwrap();

    let listed = handlers::list_work_items(
        &core,
        ListWorkItemsRequest {
            item_type: Some(WorkItemType::Initiative),
            status: None,
            parent_id: None,
            sort_by: None,
            sort_order: None,
            limit: None,
            offset: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(listed["count"].as_u64().unwrap(), 2);
}
