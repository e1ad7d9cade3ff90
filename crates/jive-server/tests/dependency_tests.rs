//! Resolver + dependency-graph handlers (spec §4.2, §4.3).

mod support;

use jive_domain::entities::{Priority, WorkItemType};
use jive_server::dto::{
    CreateWorkItemRequest, GetWorkItemDependenciesRequest, ValidateDependenciesRequest,
};
use jive_server::handlers;

fn initiative(title: &str, dependencies: Vec<String>) -> CreateWorkItemRequest {
    CreateWorkItemRequest {
        item_type: WorkItemType::Initiative,
        title: title.to_owned(),
        description: String::new(),
        priority: Some(Priority::Medium),
        complexity: None,
        parent_id: None,
        dependencies,
        acceptance_criteria: Vec::new(),
        tags: Vec::new(),
    }
}

#[tokio::test]
async fn get_work_item_dependencies_reflects_declared_edges() {
    let core = support::build_core();
    let prerequisite = handlers::create_work_item(&core, initiative("prerequisite", Vec::new())).await.unwrap();
    let prerequisite_id = prerequisite["work_item"]["id"].as_str().unwrap().to_owned();

    let dependent =
        handlers::create_work_item(&core, initiative("dependent", vec![prerequisite_id.clone()])).await.unwrap();
    let dependent_id = dependent["work_item"]["id"].as_str().unwrap().to_owned();

    let deps = handlers::get_work_item_dependencies(
        &core,
        GetWorkItemDependenciesRequest { work_item_id: dependent_id, transitive: false, only_blocking: false },
    )
    .await
    .unwrap();

    let listed = deps["dependencies"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].as_str().unwrap(), prerequisite_id);
}

#[tokio::test]
async fn validate_dependencies_detects_a_cycle() {
    let core = support::build_core();
    let a = handlers::create_work_item(&core, initiative("a", Vec::new())).await.unwrap();
    let a_id = a["work_item"]["id"].as_str().unwrap().to_owned();
    let b = handlers::create_work_item(&core, initiative("b", vec![a_id.clone()])).await.unwrap();
    let b_id = b["work_item"]["id"].as_str().unwrap().to_owned();

    // Close the cycle: a now also depends on b.
    handlers::update_work_item(
        &core,
        jive_server::dto::UpdateWorkItemRequest {
            work_item_id: a_id.clone(),
            updates: serde_json::json!({ "dependencies": [b_id.clone()] }),
        },
    )
    .await
    .unwrap();

    let report = handlers::validate_dependencies(
        &core,
        ValidateDependenciesRequest {
            work_item_ids: vec![a_id, b_id],
            check_circular: true,
            check_missing: true,
            suggest_fixes: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(report["is_valid"].as_bool(), Some(false));
    assert!(!report["cycles"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn validate_dependencies_defaults_to_every_stored_item() {
    let core = support::build_core();
    handlers::create_work_item(&core, initiative("solo", Vec::new())).await.unwrap();

    let report = handlers::validate_dependencies(
        &core,
        ValidateDependenciesRequest {
            work_item_ids: Vec::new(),
            check_circular: true,
            check_missing: true,
            suggest_fixes: false,
        },
    )
    .await
    .unwrap();

    assert_eq!(report["is_valid"].as_bool(), Some(true));
    assert_eq!(report["stats"]["node_count"].as_u64(), Some(1));
}
