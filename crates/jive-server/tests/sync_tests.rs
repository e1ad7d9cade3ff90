//! File <-> store reconciliation handlers (spec §4.5).

mod support;

use jive_domain::entities::WorkItemType;
use jive_domain::ports::{FileFormat, MergeStrategy};
use jive_domain::value_objects::WorkItemId;
use jive_server::dto::{CreateWorkItemRequest, SyncDatabaseToFileRequest, SyncFileToDatabaseRequest};
use jive_server::handlers;
use serde_json::json;

#[tokio::test]
async fn sync_file_to_database_creates_a_new_work_item() {
    let core = support::build_core();
    let id = WorkItemId::new();
    let content = json!({
        "id": id.to_string(),
        "title": "Imported from disk",
        "type": "initiative",
    })
    .to_string();

    let (body, is_conflict) = handlers::sync_file_to_database(
        &core,
        SyncFileToDatabaseRequest {
            file_path: "docs/work_items/imported.json".to_owned(),
            file_content: content,
            merge_strategy: MergeStrategy::AutoMerge,
            validate_only: false,
        },
    )
    .await
    .unwrap();

    assert!(!is_conflict);
    assert_eq!(body["work_item"]["title"].as_str().unwrap(), "Imported from disk");
}

#[tokio::test]
async fn sync_database_to_file_renders_the_stored_item() {
    let core = support::build_core();
    let created = handlers::create_work_item(
        &core,
        CreateWorkItemRequest {
            item_type: WorkItemType::Initiative,
            title: "Export me".to_owned(),
            description: String::new(),
            priority: None,
            complexity: None,
            parent_id: None,
            dependencies: Vec::new(),
            acceptance_criteria: Vec::new(),
            tags: Vec::new(),
        },
    )
    .await
    .unwrap();
    let id = created["work_item"]["id"].as_str().unwrap().to_owned();

    let exported = handlers::sync_database_to_file(
        &core,
        SyncDatabaseToFileRequest {
            work_item_id: id,
            file_path: Some("docs/work_items/export.json".to_owned()),
            format: FileFormat::Json,
        },
    )
    .await
    .unwrap();

    assert!(exported["file_content"].as_str().unwrap().contains("Export me"));
    assert!(exported["sync_record"].is_object());
}
