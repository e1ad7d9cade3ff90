//! Owns the interpretation of dependencies as a scheduling DAG (spec §4.3).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use jive_domain::constants::CYCLE_ENUMERATION_CAP;
use jive_domain::entities::{Dependency, WorkItem};
use jive_domain::error::Result;
use jive_domain::ports::{Store, Table};
use jive_domain::value_objects::{GraphStats, ListQuery, SuggestedFix, ValidationReport, WorkItemId};

/// Builds the dependency scheduling graph from Store-resident `Dependency`
/// edges and answers ordering/validation queries over it.
#[derive(Debug, Clone)]
pub struct DependencyEngine {
    store: Arc<dyn Store>,
}

impl DependencyEngine {
    /// Build a dependency engine over the given Store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Direct incoming "must-wait" edges for `id` (spec §4.3), optionally
    /// extended transitively, optionally filtered to dependencies that are
    /// still blocking (status not `done`).
    ///
    /// # Errors
    ///
    /// Propagates Store read failures.
    pub async fn dependencies_of(
        &self,
        id: WorkItemId,
        transitive: bool,
        only_blocking: bool,
    ) -> Result<Vec<WorkItemId>> {
        let edges = self.all_scheduling_edges().await?;
        let mut adjacency: HashMap<WorkItemId, Vec<WorkItemId>> = HashMap::new();
        for (from, to) in edges {
            adjacency.entry(from).or_default().push(to);
        }

        let mut seen: HashSet<WorkItemId> = HashSet::new();
        let mut result: Vec<WorkItemId> = Vec::new();
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            let Some(targets) = adjacency.get(&current) else {
                continue;
            };
            for &target in targets {
                if seen.insert(target) {
                    result.push(target);
                    if transitive {
                        frontier.push(target);
                    }
                }
            }
            if !transitive {
                break;
            }
        }

        if !only_blocking {
            return Ok(result);
        }
        let mut filtered = Vec::with_capacity(result.len());
        for candidate in result {
            if let Some(record) = self.store.get(Table::WorkItem, &candidate.to_string()).await? {
                let item: WorkItem = serde_json::from_value(record)?;
                if !item.status.is_done() {
                    filtered.push(candidate);
                }
            }
        }
        Ok(filtered)
    }

    /// A stable topological sort over `ids` (spec §4.3): at each step, pick
    /// the smallest-priority-rank node with in-degree zero among remaining,
    /// ties broken by type rank then `id` ascending. Falls back to the input
    /// order when the restricted graph has a cycle.
    ///
    /// # Errors
    ///
    /// Propagates Store read failures.
    pub async fn execution_order(&self, ids: &[WorkItemId]) -> Result<Vec<WorkItemId>> {
        let id_set: HashSet<WorkItemId> = ids.iter().copied().collect();
        let edges = self.all_scheduling_edges().await?;
        let restricted: Vec<(WorkItemId, WorkItemId)> = edges
            .into_iter()
            .filter(|(from, to)| id_set.contains(from) && id_set.contains(to))
            .collect();

        let mut successors: HashMap<WorkItemId, Vec<WorkItemId>> = HashMap::new();
        let mut indegree: HashMap<WorkItemId, usize> = ids.iter().map(|id| (*id, 0)).collect();
        // `(from, to)` means `from` depends_on `to`: `from` must wait for
        // `to`, so `to` is the prerequisite and `from` is its successor.
        for (from, to) in &restricted {
            *indegree.entry(*from).or_insert(0) += 1;
            successors.entry(*to).or_default().push(*from);
        }

        let mut items: HashMap<WorkItemId, WorkItem> = HashMap::new();
        for id in ids {
            if let Some(record) = self.store.get(Table::WorkItem, &id.to_string()).await? {
                items.insert(*id, serde_json::from_value(record)?);
            }
        }

        let mut ready: Vec<WorkItemId> = ids
            .iter()
            .copied()
            .filter(|id| indegree.get(id).copied().unwrap_or(0) == 0)
            .collect();
        let mut order = Vec::with_capacity(ids.len());
        let mut visited: HashSet<WorkItemId> = HashSet::new();

        while !ready.is_empty() {
            ready.sort_by(|a, b| tie_break(&items, *a, *b));
            let next = ready.remove(0);
            if !visited.insert(next) {
                continue;
            }
            order.push(next);
            if let Some(succ) = successors.get(&next) {
                for &s in succ {
                    if let Some(d) = indegree.get_mut(&s) {
                        *d = d.saturating_sub(1);
                        if *d == 0 && !visited.contains(&s) && !ready.contains(&s) {
                            ready.push(s);
                        }
                    }
                }
            }
        }

        if order.len() == ids.len() {
            Ok(order)
        } else {
            Ok(ids.to_vec())
        }
    }

    /// Validate the dependency graph restricted to `ids` (spec §4.3). Pure —
    /// never mutates state.
    ///
    /// # Errors
    ///
    /// Propagates Store read failures.
    pub async fn validate(
        &self,
        ids: &[WorkItemId],
        check_circular: bool,
        check_missing: bool,
        suggest_fixes: bool,
    ) -> Result<ValidationReport> {
        let id_set: HashSet<WorkItemId> = ids.iter().copied().collect();
        let all_edges = self.all_scheduling_edges().await?;
        let internal_edges: Vec<(WorkItemId, WorkItemId)> = all_edges
            .iter()
            .copied()
            .filter(|(from, to)| id_set.contains(from) && id_set.contains(to))
            .collect();

        let missing: Vec<(WorkItemId, WorkItemId)> = if check_missing {
            all_edges
                .into_iter()
                .filter(|(from, to)| id_set.contains(from) && !id_set.contains(to))
                .collect()
        } else {
            Vec::new()
        };

        let mut orphans = Vec::new();
        for id in ids {
            if let Some(record) = self.store.get(Table::WorkItem, &id.to_string()).await? {
                let item: WorkItem = serde_json::from_value(record)?;
                if let Some(parent) = item.parent_id {
                    if !id_set.contains(&parent) {
                        orphans.push(*id);
                    }
                }
            }
        }

        let (found_cycles, truncated) = if check_circular {
            enumerate_simple_cycles(&internal_edges)
        } else {
            (Vec::new(), false)
        };
        let is_dag = !check_circular || found_cycles.is_empty();

        let suggested_fixes = if suggest_fixes {
            found_cycles
                .iter()
                .filter_map(|cycle| {
                    let last = cycle.last().copied()?;
                    Some(SuggestedFix {
                        cycle: cycle.clone(),
                        remove_edge: (last, cycle[0]),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        let node_count = ids.len();
        let edge_count = internal_edges.len();
        #[allow(clippy::cast_precision_loss)]
        let density = if node_count > 1 {
            edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
        } else {
            0.0
        };

        Ok(ValidationReport {
            is_valid: is_dag && missing.is_empty() && orphans.is_empty(),
            cycles: found_cycles,
            missing,
            orphans,
            suggested_fixes,
            stats: GraphStats {
                node_count,
                edge_count,
                is_dag,
                density,
            },
            cycle_enumeration_truncated: truncated,
        })
    }

    /// Every `Dependency` edge currently in the Store, interpreted as a
    /// directed scheduling edge (spec §4.3 graph construction); `relates_to`
    /// edges are informational and excluded.
    async fn all_scheduling_edges(&self) -> Result<Vec<(WorkItemId, WorkItemId)>> {
        let records = self.store.list(Table::Dependency, ListQuery::default()).await?;
        let mut edges = Vec::with_capacity(records.len());
        for record in records {
            let dep: Dependency = serde_json::from_value(record)?;
            if let Some(edge) = dep.scheduling_edge() {
                edges.push(edge);
            }
        }
        Ok(edges)
    }
}

fn tie_break(items: &HashMap<WorkItemId, WorkItem>, a: WorkItemId, b: WorkItemId) -> std::cmp::Ordering {
    let (ia, ib) = (items.get(&a), items.get(&b));
    let priority_rank = |item: Option<&WorkItem>| item.map_or(usize::MAX, |i| i.priority.rank());
    let type_rank = |item: Option<&WorkItem>| item.map_or(usize::MAX, |i| i.item_type.rank());
    priority_rank(ia)
        .cmp(&priority_rank(ib))
        .then_with(|| type_rank(ia).cmp(&type_rank(ib)))
        .then_with(|| a.to_string().cmp(&b.to_string()))
}

/// Rotate a cycle so its lexicographically smallest node id comes first,
/// preserving traversal direction — a canonical form for deduplication.
fn canonical_cycle(path: &[WorkItemId]) -> Vec<WorkItemId> {
    let min_pos = path
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| id.to_string())
        .map_or(0, |(i, _)| i);
    path[min_pos..].iter().chain(&path[..min_pos]).copied().collect()
}

/// DFS-based enumeration of all simple cycles, capped at
/// [`CYCLE_ENUMERATION_CAP`] (spec §4.3 failure semantics).
fn enumerate_simple_cycles(edges: &[(WorkItemId, WorkItemId)]) -> (Vec<Vec<WorkItemId>>, bool) {
    let mut adjacency: HashMap<WorkItemId, Vec<WorkItemId>> = HashMap::new();
    for (from, to) in edges {
        adjacency.entry(*from).or_default().push(*to);
    }
    let mut nodes: Vec<WorkItemId> = adjacency.keys().copied().collect();
    nodes.sort_by_key(WorkItemId::to_string);

    let mut found: HashSet<Vec<WorkItemId>> = HashSet::new();
    let mut truncated = false;

    for &start in &nodes {
        let mut stack = vec![start];
        let mut on_stack: HashSet<WorkItemId> = HashSet::from([start]);
        if dfs_find_cycles(start, start, &adjacency, &mut stack, &mut on_stack, &mut found) {
            truncated = true;
            break;
        }
    }

    let mut cycles: Vec<Vec<WorkItemId>> = found.into_iter().collect();
    cycles.sort_by_key(|cycle| cycle.iter().map(WorkItemId::to_string).collect::<Vec<_>>());
    (cycles, truncated)
}

/// Returns `true` once [`CYCLE_ENUMERATION_CAP`] distinct cycles have been found.
fn dfs_find_cycles(
    start: WorkItemId,
    current: WorkItemId,
    adjacency: &HashMap<WorkItemId, Vec<WorkItemId>>,
    stack: &mut Vec<WorkItemId>,
    on_stack: &mut HashSet<WorkItemId>,
    found: &mut HashSet<Vec<WorkItemId>>,
) -> bool {
    let Some(neighbors) = adjacency.get(&current) else {
        return false;
    };
    for &next in neighbors {
        if next == start {
            found.insert(canonical_cycle(stack));
            if found.len() >= CYCLE_ENUMERATION_CAP {
                return true;
            }
        } else if !on_stack.contains(&next) {
            stack.push(next);
            on_stack.insert(next);
            let capped = dfs_find_cycles(start, next, adjacency, stack, on_stack, found);
            on_stack.remove(&next);
            stack.pop();
            if capped {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use jive_domain::entities::{DependencyKind, Priority, WorkItemStatus, WorkItemType};
    use jive_domain::value_objects::{Metadata, WorkItemId};
    use uuid::Uuid;

    use super::*;
    use crate::test_support::InMemoryStore;

    fn item(id: WorkItemId, item_type: WorkItemType, priority: Priority) -> WorkItem {
        let now = Utc::now();
        WorkItem {
            id,
            item_type,
            title: format!("item-{id}"),
            description: String::new(),
            status: WorkItemStatus::Ready,
            priority,
            complexity: None,
            parent_id: None,
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

    fn seed_item(store: &InMemoryStore, work_item: &WorkItem) {
        store.seed(
            Table::WorkItem,
            work_item.id.to_string(),
            serde_json::to_value(work_item).unwrap(),
        );
    }

    fn seed_dependency(store: &InMemoryStore, dep: Dependency) {
        let id = Uuid::new_v4().to_string();
        store.seed(Table::Dependency, id, serde_json::to_value(dep).unwrap());
    }

    #[tokio::test]
    async fn detects_three_node_cycle_and_proposes_fix() {
        let store = Arc::new(InMemoryStore::new());
        let a = WorkItemId::new();
        let b = WorkItemId::new();
        let c = WorkItemId::new();
        for id in [a, b, c] {
            seed_item(&store, &item(id, WorkItemType::Task, Priority::Medium));
        }
        seed_dependency(&store, Dependency::new(a, b, DependencyKind::DependsOn));
        seed_dependency(&store, Dependency::new(b, c, DependencyKind::DependsOn));
        seed_dependency(&store, Dependency::new(c, a, DependencyKind::DependsOn));

        let engine = DependencyEngine::new(store);
        let report = engine.validate(&[a, b, c], true, true, true).await.unwrap();

        assert!(!report.is_valid);
        assert_eq!(report.cycles.len(), 1);
        assert_eq!(report.suggested_fixes.len(), 1);
        let fix = &report.suggested_fixes[0];
        assert_eq!(fix.remove_edge, (c, a));
    }

    #[tokio::test]
    async fn execution_order_respects_edges() {
        let store = Arc::new(InMemoryStore::new());
        let a = WorkItemId::new();
        let b = WorkItemId::new();
        for id in [a, b] {
            seed_item(&store, &item(id, WorkItemType::Task, Priority::Medium));
        }
        // a depends_on b: a must wait for b, so b comes first.
        seed_dependency(&store, Dependency::new(a, b, DependencyKind::DependsOn));

        let engine = DependencyEngine::new(store);
        let order = engine.execution_order(&[a, b]).await.unwrap();
        let pos_a = order.iter().position(|id| *id == a).unwrap();
        let pos_b = order.iter().position(|id| *id == b).unwrap();
        assert!(pos_b < pos_a);
    }

    #[tokio::test]
    async fn execution_order_falls_back_to_input_on_cycle() {
        let store = Arc::new(InMemoryStore::new());
        let a = WorkItemId::new();
        let b = WorkItemId::new();
        for id in [a, b] {
            seed_item(&store, &item(id, WorkItemType::Task, Priority::Medium));
        }
        seed_dependency(&store, Dependency::new(a, b, DependencyKind::DependsOn));
        seed_dependency(&store, Dependency::new(b, a, DependencyKind::DependsOn));

        let engine = DependencyEngine::new(store);
        let order = engine.execution_order(&[a, b]).await.unwrap();
        assert_eq!(order, vec![a, b]);
    }
}
