//! End-to-end bootstrap smoke test: wires a real [`Core`] through
//! [`Core::bootstrap`] against a temp-dir sqlite file, the same path the
//! `jive` binary takes at startup, and exercises one full create round-trip.

use jive::infrastructure::config::Config;
use jive::infrastructure::Core;

fn temp_config() -> (tempfile::TempDir, Config) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let data_path = dir.path().join("jive.sqlite3").to_string_lossy().into_owned();
    let config = Config { data_path, ..Config::default() };
    (dir, config)
}

#[tokio::test]
async fn bootstrap_wires_a_usable_core() {
    let (_dir, config) = temp_config();
    let core = Core::bootstrap(&config).await.expect("bootstrap succeeds");

    let created = jive::server::handlers::create_work_item(
        &core,
        jive::server::dto::CreateWorkItemRequest {
            item_type: jive::domain::entities::WorkItemType::Initiative,
            title: "Smoke test initiative".to_owned(),
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
    .expect("create succeeds against a freshly bootstrapped core");

    assert_eq!(created["work_item"]["title"].as_str().unwrap(), "Smoke test initiative");
}

#[tokio::test]
async fn bootstrap_rejects_an_unwritable_data_path() {
    let config = Config { data_path: "/nonexistent-dir-for-smoke-test/jive.sqlite3".to_owned(), ..Config::default() };

    let result = Core::bootstrap(&config).await;
    assert!(result.is_err());
}
