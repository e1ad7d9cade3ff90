//! Tree operations over parent/child relationships plus derived progress
//! (spec §4.4).

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use jive_domain::constants::HIERARCHY_DEPTH_CAP;
use jive_domain::entities::{WorkItem, WorkItemType};
use jive_domain::error::{Error, Result};
use jive_domain::ports::{Store, Table};
use jive_domain::value_objects::{Filter, ListQuery, WorkItemId};

/// One node of a `hierarchy()` result: a work item plus its position in the
/// traversal and its (possibly truncated) subtree.
#[derive(Debug, Clone)]
pub struct HierarchyNode {
    /// The work item at this node.
    pub item: WorkItem,
    /// Distance from the traversal root, root = 0.
    pub depth: usize,
    /// Ids from the traversal root down to (and including) this node.
    pub path: Vec<WorkItemId>,
    /// Child nodes, empty once `max_depth` is reached.
    pub children: Vec<HierarchyNode>,
}

/// Enforces the single-parent / type-chain invariant (spec §3.2 invariant 1)
/// and answers parent/child/progress queries over the Store.
#[derive(Debug, Clone)]
pub struct HierarchyManager {
    store: Arc<dyn Store>,
}

impl HierarchyManager {
    /// Build a hierarchy manager over the given Store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Reject `candidate` with [`Error::HierarchyViolation`] when its
    /// position in the initiative→epic→feature→story→task chain is invalid
    /// relative to its declared parent (spec §3.2 invariant 1, §4.4 rules).
    /// Called by `create`/`update` call sites before persisting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HierarchyViolation`] when the rule fails.
    pub async fn enforce_position(&self, candidate: &WorkItem) -> Result<()> {
        match candidate.parent_id {
            None => {
                if candidate.item_type == WorkItemType::Initiative {
                    Ok(())
                } else {
                    Err(Error::hierarchy_violation(format!(
                        "{:?} must declare a parent_id; only initiative may be root",
                        candidate.item_type
                    )))
                }
            }
            Some(parent_id) => {
                let Some(parent) = self.get_item(parent_id).await? else {
                    return Err(Error::hierarchy_violation(format!(
                        "parent_id {parent_id} does not resolve to an existing work item"
                    )));
                };
                if candidate.item_type.rank() == parent.item_type.rank() + 1 {
                    Ok(())
                } else {
                    Err(Error::hierarchy_violation(format!(
                        "{:?} must appear directly below {:?} in the hierarchy chain",
                        candidate.item_type, parent.item_type
                    )))
                }
            }
        }
    }

    /// Direct children of `id`, optionally expanded depth-first to
    /// [`HIERARCHY_DEPTH_CAP`]. Cycle-safe: a node already visited in this
    /// traversal is skipped even though cycles should never occur.
    ///
    /// # Errors
    ///
    /// Propagates Store read failures.
    pub async fn children(&self, id: WorkItemId, recursive: bool) -> Result<Vec<WorkItem>> {
        let mut result = Vec::new();
        let mut visited: HashSet<WorkItemId> = HashSet::new();
        let mut frontier: Vec<(WorkItemId, usize)> = vec![(id, 0)];
        while let Some((current, depth)) = frontier.pop() {
            if depth >= HIERARCHY_DEPTH_CAP {
                continue;
            }
            for child in self.direct_children(current).await? {
                if !visited.insert(child.id) {
                    continue;
                }
                if recursive {
                    frontier.push((child.id, depth + 1));
                }
                result.push(child);
            }
        }
        Ok(result)
    }

    /// Walk up `parent_id` from `id` until `null`; returns the chain
    /// root-first (not including `id` itself).
    ///
    /// # Errors
    ///
    /// Propagates Store read failures.
    pub async fn ancestors(&self, id: WorkItemId) -> Result<Vec<WorkItem>> {
        let mut chain = Vec::new();
        let mut visited: HashSet<WorkItemId> = HashSet::new();
        let mut cursor = self.get_item(id).await?.and_then(|item| item.parent_id);
        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id) {
                break;
            }
            let Some(parent) = self.get_item(parent_id).await? else {
                break;
            };
            cursor = parent.parent_id;
            chain.push(parent);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Nested tree rooted at `root`, annotated with `depth` and `path`,
    /// respecting `max_depth` (capped at [`HIERARCHY_DEPTH_CAP`]). Returns
    /// `None` if `root` does not exist.
    ///
    /// # Errors
    ///
    /// Propagates Store read failures.
    pub async fn hierarchy(&self, root: WorkItemId, max_depth: usize) -> Result<Option<HierarchyNode>> {
        let Some(item) = self.get_item(root).await? else {
            return Ok(None);
        };
        let mut visited = HashSet::from([root]);
        let node = self
            .build_node(item, 0, max_depth.min(HIERARCHY_DEPTH_CAP), vec![root], &mut visited)
            .await?;
        Ok(Some(node))
    }

    /// If `id` has no children, its own `progress_percentage`; else the
    /// unweighted mean of children's progress (spec §4.4). A pure query —
    /// never writes back.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` does not exist; propagates Store
    /// read failures.
    pub fn progress(&self, id: WorkItemId) -> BoxFuture<'_, Result<f64>> {
        Box::pin(async move {
            let Some(item) = self.get_item(id).await? else {
                return Err(Error::not_found(format!("work_item/{id}")));
            };
            let children = self.direct_children(id).await?;
            if children.is_empty() {
                return Ok(f64::from(item.progress_percentage));
            }
            let mut total = 0.0;
            for child in &children {
                total += self.progress(child.id).await?;
            }
            #[allow(clippy::cast_precision_loss)]
            let mean = total / children.len() as f64;
            Ok(mean)
        })
    }

    fn build_node<'a>(
        &'a self,
        item: WorkItem,
        depth: usize,
        max_depth: usize,
        path: Vec<WorkItemId>,
        visited: &'a mut HashSet<WorkItemId>,
    ) -> BoxFuture<'a, Result<HierarchyNode>> {
        Box::pin(async move {
            let mut children = Vec::new();
            if depth < max_depth {
                for child in self.direct_children(item.id).await? {
                    if !visited.insert(child.id) {
                        continue;
                    }
                    let mut child_path = path.clone();
                    child_path.push(child.id);
                    let node = self
                        .build_node(child, depth + 1, max_depth, child_path, visited)
                        .await?;
                    children.push(node);
                }
            }
            Ok(HierarchyNode {
                item,
                depth,
                path,
                children,
            })
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
        records
            .into_iter()
            .map(|record| Ok(serde_json::from_value(record)?))
            .collect()
    }

    async fn get_item(&self, id: WorkItemId) -> Result<Option<WorkItem>> {
        let Some(record) = self.store.get(Table::WorkItem, &id.to_string()).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(record)?))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use jive_domain::entities::{Priority, WorkItemStatus};
    use jive_domain::value_objects::Metadata;

    use super::*;
    use crate::test_support::InMemoryStore;

    fn item(id: WorkItemId, item_type: WorkItemType, parent_id: Option<WorkItemId>, progress: u8) -> WorkItem {
        let now = Utc::now();
        WorkItem {
            id,
            item_type,
            title: format!("item-{id}"),
            description: String::new(),
            status: if progress == 100 {
                WorkItemStatus::Done
            } else {
                WorkItemStatus::InProgress
            },
            priority: Priority::Medium,
            complexity: None,
            parent_id,
            dependencies: Vec::new(),
            acceptance_criteria: Vec::new(),
            progress_percentage: progress,
            tags: Default::default(),
            metadata: Metadata::default(),
            created_at: now,
            updated_at: now,
            embedding: Vec::new(),
        }
    }

    fn seed(store: &InMemoryStore, work_item: &WorkItem) {
        store.seed(
            Table::WorkItem,
            work_item.id.to_string(),
            serde_json::to_value(work_item).unwrap(),
        );
    }

    #[tokio::test]
    async fn progress_averages_children_unweighted() {
        let store = Arc::new(InMemoryStore::new());
        let parent = WorkItemId::new();
        let child_a = WorkItemId::new();
        let child_b = WorkItemId::new();
        seed(&store, &item(parent, WorkItemType::Feature, None, 0));
        seed(&store, &item(child_a, WorkItemType::Story, Some(parent), 100));
        seed(&store, &item(child_b, WorkItemType::Story, Some(parent), 0));

        let manager = HierarchyManager::new(store);
        let progress = manager.progress(parent).await.unwrap();
        assert!((progress - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn leaf_progress_is_its_own_percentage() {
        let store = Arc::new(InMemoryStore::new());
        let leaf = WorkItemId::new();
        seed(&store, &item(leaf, WorkItemType::Task, None, 42));

        let manager = HierarchyManager::new(store);
        assert!((manager.progress(leaf).await.unwrap() - 42.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn enforce_position_rejects_skipped_rank() {
        let store = Arc::new(InMemoryStore::new());
        let initiative = WorkItemId::new();
        seed(&store, &item(initiative, WorkItemType::Initiative, None, 0));

        let manager = HierarchyManager::new(store);
        // A story directly under an initiative skips epic/feature: invalid.
        let candidate = item(WorkItemId::new(), WorkItemType::Story, Some(initiative), 0);
        assert!(manager.enforce_position(&candidate).await.is_err());
    }
}
