//! Drives background completion of a delegated work item's children
//! (spec §4.7) according to the session's child-scheduling mode.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use jive_domain::entities::{ExecutionMode, ProgressKind, ProgressUpdate, WorkItem};
use jive_domain::error::Result;
use jive_domain::ports::{Store, Table};
use jive_domain::value_objects::{Filter, ListQuery, WorkItemId};
use serde_json::json;

use super::dependency_engine::DependencyEngine;

/// Result of driving one batch of children to completion.
#[derive(Debug, Clone, Default)]
pub struct DriveOutcome {
    /// Progress log entries produced by this drive, in arrival order.
    pub updates: Vec<ProgressUpdate>,
    /// `true` iff any child failed (a Store write error) and, under
    /// `fail_fast`, the remaining children were not attempted.
    pub failed: bool,
}

/// For atomic delegated tasks with children, drives their completion in the
/// background, writing only `status`/`progress_percentage`/`completed_at`
/// (spec §4.7).
#[derive(Debug, Clone)]
pub struct ExecutorDriver {
    store: Arc<dyn Store>,
    dependency_engine: DependencyEngine,
}

impl ExecutorDriver {
    /// Build a driver over the given Store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        let dependency_engine = DependencyEngine::new(store.clone());
        Self { store, dependency_engine }
    }

    /// Drive `parent_id`'s direct children to completion under `mode`
    /// (spec §4.7). `task_index` stamps every emitted `ProgressUpdate` so
    /// the caller can fold them into the owning session's log.
    ///
    /// # Errors
    ///
    /// Propagates Store read failures when listing children.
    pub async fn drive_children(
        &self,
        parent_id: WorkItemId,
        mode: ExecutionMode,
        max_parallel: usize,
        fail_fast: bool,
        task_index: usize,
    ) -> Result<DriveOutcome> {
        let children = self.direct_children(parent_id).await?;
        if children.is_empty() {
            return Ok(DriveOutcome::default());
        }
        match mode {
            ExecutionMode::Sequential => Ok(self.drive_sequential(children, fail_fast, task_index).await),
            ExecutionMode::Parallel => Ok(self.drive_parallel(children, max_parallel.max(1), fail_fast, task_index).await),
            ExecutionMode::DependencyBased => self.drive_dependency_based(children, max_parallel.max(1), task_index).await,
        }
    }

    async fn drive_sequential(&self, children: Vec<WorkItem>, fail_fast: bool, task_index: usize) -> DriveOutcome {
        let mut outcome = DriveOutcome::default();
        for child in children {
            match self.complete_child(&child, task_index).await {
                Ok(update) => outcome.updates.push(update),
                Err(error) => {
                    outcome.failed = true;
                    outcome.updates.push(failure_update(child.id, task_index, &error));
                    if fail_fast {
                        break;
                    }
                }
            }
        }
        outcome
    }

    async fn drive_parallel(
        &self,
        children: Vec<WorkItem>,
        max_parallel: usize,
        fail_fast: bool,
        task_index: usize,
    ) -> DriveOutcome {
        let mut outcome = DriveOutcome::default();
        for batch in children.chunks(max_parallel) {
            let results = futures::future::join_all(
                batch.iter().map(|child| self.complete_child(child, task_index)),
            )
            .await;

            let mut batch_failed = false;
            for (child, result) in batch.iter().zip(results) {
                match result {
                    Ok(update) => outcome.updates.push(update),
                    Err(error) => {
                        outcome.failed = true;
                        batch_failed = true;
                        outcome.updates.push(failure_update(child.id, task_index, &error));
                    }
                }
            }
            if fail_fast && batch_failed {
                break;
            }
        }
        outcome
    }

    async fn drive_dependency_based(
        &self,
        children: Vec<WorkItem>,
        max_parallel: usize,
        task_index: usize,
    ) -> Result<DriveOutcome> {
        let ids: Vec<WorkItemId> = children.iter().map(|c| c.id).collect();
        let by_id: HashMap<WorkItemId, WorkItem> = children.into_iter().map(|c| (c.id, c)).collect();

        let mut remaining: HashSet<WorkItemId> = ids.iter().copied().collect();
        let mut completed: HashSet<WorkItemId> = HashSet::new();
        let mut outcome = DriveOutcome::default();

        while !remaining.is_empty() {
            let mut ready: Vec<WorkItemId> = Vec::new();
            for &id in &remaining {
                let deps = self.dependency_engine.dependencies_of(id, false, true).await?;
                if deps.iter().all(|d| completed.contains(d) || !remaining.contains(d)) {
                    ready.push(id);
                }
            }
            if ready.is_empty() {
                // Remaining nodes wait on each other (a cycle slipped through
                // validation) or on something outside this child set; nothing
                // more can be driven.
                break;
            }
            ready.truncate(max_parallel);

            let results = futures::future::join_all(ready.iter().map(|id| {
                let child = &by_id[id];
                self.complete_child(child, task_index)
            }))
            .await;

            for (id, result) in ready.iter().zip(results) {
                remaining.remove(id);
                match result {
                    Ok(update) => {
                        completed.insert(*id);
                        outcome.updates.push(update);
                    }
                    Err(error) => {
                        outcome.failed = true;
                        outcome.updates.push(failure_update(*id, task_index, &error));
                    }
                }
            }
        }

        Ok(outcome)
    }

    /// Mark one child complete: canonical `status = done` (the "completed"
    /// spec §4.7 language, per the status alias table), `progress_percentage
    /// = 100`, and `completed_at = now` recorded under `metadata` (the
    /// entity has no dedicated field for it) — no other field is touched.
    async fn complete_child(&self, child: &WorkItem, task_index: usize) -> Result<ProgressUpdate> {
        let now = Utc::now();
        let mut metadata = child.metadata.clone();
        metadata.insert("completed_at".to_owned(), json!(now.to_rfc3339()));
        let patch = json!({
            "status": "done",
            "progress_percentage": 100,
            "metadata": metadata,
        });
        self.store.update(Table::WorkItem, &child.id.to_string(), patch).await?;
        Ok(ProgressUpdate {
            timestamp: now,
            kind: ProgressKind::Completion,
            task_index,
            message: format!("completed child {} (\"{}\")", child.id, child.title),
            details: Some(json!({ "work_item_id": child.id })),
        })
    }

    async fn direct_children(&self, id: WorkItemId) -> Result<Vec<WorkItem>> {
        let records = self
            .store
            .list(
                Table::WorkItem,
                ListQuery {
                    filters: vec![Filter::Equals {
                        field: "parent_id".to_owned(),
                        value: serde_json::to_value(id)?,
                    }],
                    ..ListQuery::default()
                },
            )
            .await?;
        records.into_iter().map(|record| Ok(serde_json::from_value(record)?)).collect()
    }
}

fn failure_update(child_id: WorkItemId, task_index: usize, error: &jive_domain::error::Error) -> ProgressUpdate {
    ProgressUpdate {
        timestamp: Utc::now(),
        kind: ProgressKind::Blocker,
        task_index,
        message: format!("failed to complete child {child_id}: {error}"),
        details: Some(json!({ "work_item_id": child_id })),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jive_domain::entities::{DependencyKind, Dependency, Priority, WorkItemStatus, WorkItemType};
    use jive_domain::value_objects::Metadata;
    use uuid::Uuid;

    use super::*;
    use crate::test_support::InMemoryStore;

    fn item(id: WorkItemId, parent_id: Option<WorkItemId>) -> WorkItem {
        let now = Utc::now();
        WorkItem {
            id,
            item_type: WorkItemType::Task,
            title: format!("item-{id}"),
            description: String::new(),
            status: WorkItemStatus::Ready,
            priority: Priority::Medium,
            complexity: None,
            parent_id,
            dependencies: Vec::new(),
            acceptance_criteria: Vec::new(),
            progress_percentage: 0,
            tags: Default::default(),
            metadata: Metadata::default(),
            created_at: now,
            updated_at: now,
            embedding: Vec::new(),
        }
    }

    fn seed(store: &InMemoryStore, work_item: &WorkItem) {
        store.seed(Table::WorkItem, work_item.id.to_string(), serde_json::to_value(work_item).unwrap());
    }

    #[tokio::test]
    async fn sequential_completes_every_child() {
        let store = Arc::new(InMemoryStore::new());
        let parent = WorkItemId::new();
        let a = WorkItemId::new();
        let b = WorkItemId::new();
        seed(&store, &item(parent, None));
        seed(&store, &item(a, Some(parent)));
        seed(&store, &item(b, Some(parent)));

        let driver = ExecutorDriver::new(store.clone());
        let outcome = driver.drive_children(parent, ExecutionMode::Sequential, 3, true, 0).await.unwrap();
        assert!(!outcome.failed);
        assert_eq!(outcome.updates.len(), 2);

        for id in [a, b] {
            let record = store.get(Table::WorkItem, &id.to_string()).await.unwrap().unwrap();
            let child: WorkItem = serde_json::from_value(record).unwrap();
            assert_eq!(child.status, WorkItemStatus::Done);
            assert_eq!(child.progress_percentage, 100);
        }
    }

    #[tokio::test]
    async fn dependency_based_respects_ordering() {
        let store = Arc::new(InMemoryStore::new());
        let parent = WorkItemId::new();
        let a = WorkItemId::new();
        let b = WorkItemId::new();
        seed(&store, &item(parent, None));
        seed(&store, &item(a, Some(parent)));
        seed(&store, &item(b, Some(parent)));
        let dep_id = Uuid::new_v4().to_string();
        store.seed(
            Table::Dependency,
            dep_id,
            serde_json::to_value(Dependency::new(a, b, DependencyKind::DependsOn)).unwrap(),
        );

        let driver = ExecutorDriver::new(store.clone());
        let outcome = driver.drive_children(parent, ExecutionMode::DependencyBased, 1, false, 0).await.unwrap();
        assert!(!outcome.failed);
        assert_eq!(outcome.updates.len(), 2);
        // b (the dependency) must be reported completed before a.
        let b_index = outcome.updates.iter().position(|u| u.message.contains(&b.to_string())).unwrap();
        let a_index = outcome.updates.iter().position(|u| u.message.contains(&a.to_string())).unwrap();
        assert!(b_index < a_index);
    }
}
