//! Drives the cooperative execution loop external agents participate in
//! (spec §4.6). Sessions are held only in process memory — never persisted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use jive_domain::constants::DEFAULT_SESSION_TIMEOUT_MINUTES;
use jive_domain::entities::{
    ExecutionMode, ExecutionSession, ProgressKind, ProgressUpdate, SessionStatus, TaskSlot, TaskSlotStatus, WorkItem,
};
use jive_domain::error::{Error, Result};
use jive_domain::ports::{Store, Table};
use jive_domain::value_objects::{ExecutionId, WorkItemId};
use serde_json::{Value, json};

use super::dependency_engine::DependencyEngine;
use super::hierarchy_manager::HierarchyManager;
use super::resolver::Resolver;
use super::sync_engine::SyncEngine;

/// The ordering rule applied to a freshly built execution plan before any
/// `dependency_based` mode re-sorts it (spec §4.6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlanOrdering {
    /// Type rank ascending (initiatives first), then priority rank ascending.
    #[default]
    DependencyOrder,
    /// Priority rank ascending, then type rank.
    PriorityHighFirst,
    /// Complexity rank ascending (simplest first); items with no declared
    /// complexity sort last.
    ComplexitySimpleFirst,
}

/// Per-task guidance block accompanying every dispatch (spec §4.6.3).
#[derive(Debug, Clone)]
pub struct TaskGuidance {
    /// Suggested overall approach.
    pub approach: String,
    /// Things to keep in mind while working the task.
    pub considerations: Vec<String>,
    /// How the agent should know the task is actually done.
    pub success_criteria: Vec<String>,
    /// Habits that tend to produce good outcomes on this kind of task.
    pub best_practices: Vec<String>,
    /// Common mistakes to avoid.
    pub pitfalls: Vec<String>,
    /// Tool names the agent is expected to use while working this task.
    pub tools: Vec<String>,
}

/// A task handed to the calling agent, with enough context to act on it
/// without a further round trip (spec §4.6.3).
#[derive(Debug, Clone)]
pub struct DispatchedTask {
    /// The session this dispatch belongs to.
    pub execution_id: ExecutionId,
    /// The work item to act on.
    pub work_item: WorkItem,
    /// `"k of N"` position within the plan.
    pub position_label: String,
    /// The session's child-scheduling mode.
    pub mode: ExecutionMode,
    /// Approach/considerations/criteria/practices/pitfalls/tools block.
    pub guidance: TaskGuidance,
    /// Tells the agent when and how to call back in with progress.
    pub reporting_contract: String,
}

/// A caller-reported event to fold into a session (spec §4.6.2).
#[derive(Debug, Clone)]
pub struct ProgressReport {
    /// The category of event.
    pub kind: ProgressKind,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail payload.
    pub details: Option<Value>,
}

/// What a `status` or `execute` call hands back to the caller.
#[derive(Debug, Clone)]
pub enum StatusOutcome {
    /// The session has a task to work on right now.
    Dispatched(DispatchedTask),
    /// The session reached a terminal state; no further task follows.
    Finished(ExecutionSession),
}

/// Drives `ExecutionSession`s end to end: plan construction, dispatch,
/// progress folding, and cancellation (spec §4.6).
#[derive(Debug)]
pub struct Orchestrator {
    store: Arc<dyn Store>,
    resolver: Resolver,
    hierarchy: HierarchyManager,
    dependency_engine: DependencyEngine,
    sync_engine: Arc<SyncEngine>,
    sessions: Mutex<HashMap<ExecutionId, ExecutionSession>>,
}

impl Orchestrator {
    /// Build an orchestrator over the given Store and sibling use cases.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        resolver: Resolver,
        hierarchy: HierarchyManager,
        dependency_engine: DependencyEngine,
        sync_engine: Arc<SyncEngine>,
    ) -> Self {
        Self {
            store,
            resolver,
            hierarchy,
            dependency_engine,
            sync_engine,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `identifier`, build its execution plan, create a session, and
    /// dispatch `plan[0]` (spec §4.6.1, §4.6.3).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `identifier` does not resolve;
    /// propagates Store read failures.
    pub async fn execute(
        &self,
        identifier: &str,
        mode: ExecutionMode,
        ordering: PlanOrdering,
        timeout_minutes: Option<u64>,
    ) -> Result<StatusOutcome> {
        let Some(root) = self.resolver.resolve(identifier).await? else {
            return Err(Error::not_found(format!("work_item/{identifier}")));
        };

        let mut ids = vec![root];
        ids.extend(self.hierarchy.children(root, true).await?.into_iter().map(|c| c.id));

        let mut items: HashMap<WorkItemId, WorkItem> = HashMap::with_capacity(ids.len());
        for id in &ids {
            if let Some(item) = self.get_item(*id).await? {
                items.insert(*id, item);
            }
        }

        let ordered_ids = if matches!(mode, ExecutionMode::DependencyBased) {
            self.dependency_engine.execution_order(&ids).await?
        } else {
            order_by_setting(&ids, &items, ordering)
        };

        let plan: Vec<TaskSlot> = ordered_ids
            .into_iter()
            .enumerate()
            .map(|(order, id)| TaskSlot {
                id,
                order: u32::try_from(order).unwrap_or(u32::MAX),
                status: TaskSlotStatus::Ready,
            })
            .collect();

        let session = ExecutionSession {
            execution_id: ExecutionId::new(),
            root_id: root,
            plan,
            current_index: 0,
            status: SessionStatus::Ready,
            started_at: Utc::now(),
            updates: Vec::new(),
            mode,
            timeout_minutes: timeout_minutes.unwrap_or(DEFAULT_SESSION_TIMEOUT_MINUTES),
            cancelled_at: None,
            affected_paths: Vec::new(),
        };
        let execution_id = session.execution_id;
        self.lock().insert(execution_id, session);

        self.dispatch_current(execution_id).await
    }

    /// Fold an optional progress report into the session and/or advance to
    /// the next task, per the state machine in spec §4.6.2–§4.6.3.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown `execution_id`; propagates
    /// Store read failures. A blocker report never fails the call (spec
    /// §4.6.5).
    pub async fn status(
        &self,
        execution_id: ExecutionId,
        task_completed: bool,
        report: Option<ProgressReport>,
    ) -> Result<StatusOutcome> {
        {
            let mut sessions = self.lock();
            let session = sessions
                .get_mut(&execution_id)
                .ok_or_else(|| Error::not_found(format!("execution/{execution_id}")))?;

            if matches!(
                session.status,
                SessionStatus::Cancelled | SessionStatus::Failed | SessionStatus::Completed
            ) {
                return Ok(StatusOutcome::Finished(session.clone()));
            }

            if let Some(report) = &report {
                session.updates.push(ProgressUpdate {
                    timestamp: Utc::now(),
                    kind: report.kind,
                    task_index: session.current_index,
                    message: report.message.clone(),
                    details: report.details.clone(),
                });
                session.status = if matches!(report.kind, ProgressKind::Blocker) {
                    SessionStatus::Blocked
                } else {
                    SessionStatus::Running
                };
            }

            if task_completed {
                if let Some(slot) = session.plan.get_mut(session.current_index) {
                    slot.status = TaskSlotStatus::Completed;
                }
                session.current_index += 1;
                if session.is_exhausted() {
                    session.status = SessionStatus::Completed;
                    return Ok(StatusOutcome::Finished(session.clone()));
                }
                session.status = SessionStatus::Running;
            }
        }

        self.dispatch_current(execution_id).await
    }

    /// Terminate a session (spec §4.6.4). `force` and `rollback_changes` are
    /// recorded in the cancellation log entry; reverting individual file
    /// writes is the caller's responsibility (the engine only tracks which
    /// paths this session touched via `record_affected_path`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown `execution_id`.
    pub fn cancel(
        &self,
        execution_id: ExecutionId,
        reason: &str,
        force: bool,
        rollback_changes: bool,
    ) -> Result<ExecutionSession> {
        let mut sessions = self.lock();
        let session = sessions
            .get_mut(&execution_id)
            .ok_or_else(|| Error::not_found(format!("execution/{execution_id}")))?;

        let now = Utc::now();
        session.status = SessionStatus::Cancelled;
        session.cancelled_at = Some(now);
        session.updates.push(ProgressUpdate {
            timestamp: now,
            kind: ProgressKind::Milestone,
            task_index: session.current_index,
            message: format!("execution cancelled: {reason}"),
            details: Some(json!({
                "force": force,
                "rollback_changes": rollback_changes,
                "affected_paths": session.affected_paths,
            })),
        });

        if rollback_changes && !session.affected_paths.is_empty() {
            tracing::warn!(
                execution_id = %execution_id,
                paths = ?session.affected_paths,
                "rollback_changes requested but the engine does not retain prior file \
                 contents; affected paths are recorded for a caller-driven revert"
            );
        }

        Ok(session.clone())
    }

    /// Record that this session's delegated work wrote `path`, so a later
    /// `cancel(rollback_changes = true)` knows what was touched.
    pub fn record_affected_path(&self, execution_id: ExecutionId, path: String) {
        if let Some(session) = self.lock().get_mut(&execution_id) {
            session.affected_paths.push(path);
        }
    }

    /// A defensive copy of a session's current state.
    #[must_use]
    pub fn session(&self, execution_id: ExecutionId) -> Option<ExecutionSession> {
        self.lock().get(&execution_id).cloned()
    }

    /// The `SyncEngine` shared with this orchestrator's sessions, for
    /// callers that need to sync a dispatched task's file representation.
    #[must_use]
    pub fn sync_engine(&self) -> &Arc<SyncEngine> {
        &self.sync_engine
    }

    async fn dispatch_current(&self, execution_id: ExecutionId) -> Result<StatusOutcome> {
        let dispatch = {
            let sessions = self.lock();
            let session = sessions
                .get(&execution_id)
                .ok_or_else(|| Error::not_found(format!("execution/{execution_id}")))?;
            match session.current_task() {
                Some(slot) => Some((slot.id, session.position_label(), session.mode)),
                None => None,
            }
        };

        let Some((task_id, position_label, mode)) = dispatch else {
            let session = self
                .lock()
                .get(&execution_id)
                .cloned()
                .ok_or_else(|| Error::not_found(format!("execution/{execution_id}")))?;
            return Ok(StatusOutcome::Finished(session));
        };

        let Some(item) = self.get_item(task_id).await? else {
            return Err(Error::not_found(format!("work_item/{task_id}")));
        };

        Ok(StatusOutcome::Dispatched(DispatchedTask {
            execution_id,
            guidance: guidance_for(&item),
            work_item: item,
            position_label,
            mode,
            reporting_contract: reporting_contract(),
        }))
    }

    async fn get_item(&self, id: WorkItemId) -> Result<Option<WorkItem>> {
        let Some(record) = self.store.get(Table::WorkItem, &id.to_string()).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(record)?))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ExecutionId, ExecutionSession>> {
        self.sessions.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn order_by_setting(ids: &[WorkItemId], items: &HashMap<WorkItemId, WorkItem>, ordering: PlanOrdering) -> Vec<WorkItemId> {
    let mut ordered = ids.to_vec();
    ordered.sort_by(|a, b| {
        let (ia, ib) = (items.get(a), items.get(b));
        let primary = match ordering {
            PlanOrdering::DependencyOrder => type_rank(ia).cmp(&type_rank(ib)).then_with(|| priority_rank(ia).cmp(&priority_rank(ib))),
            PlanOrdering::PriorityHighFirst => priority_rank(ia).cmp(&priority_rank(ib)).then_with(|| type_rank(ia).cmp(&type_rank(ib))),
            PlanOrdering::ComplexitySimpleFirst => complexity_rank(ia).cmp(&complexity_rank(ib)),
        };
        primary.then_with(|| a.to_string().cmp(&b.to_string()))
    });
    ordered
}

fn type_rank(item: Option<&WorkItem>) -> usize {
    item.map_or(usize::MAX, |i| i.item_type.rank())
}

fn priority_rank(item: Option<&WorkItem>) -> usize {
    item.map_or(usize::MAX, |i| i.priority.rank())
}

fn complexity_rank(item: Option<&WorkItem>) -> usize {
    item.and_then(|i| i.complexity).map_or(usize::MAX, |c| c.rank())
}

fn guidance_for(item: &WorkItem) -> TaskGuidance {
    TaskGuidance {
        approach: format!(
            "Work the {} \"{}\" end to end: read its description and acceptance criteria before making changes.",
            item.item_type.as_str(),
            item.title
        ),
        considerations: vec![
            format!("Priority is {}; scope accordingly.", item.priority.as_str()),
            "Check for existing partial progress before starting from scratch.".to_owned(),
        ],
        success_criteria: if item.acceptance_criteria.is_empty() {
            vec!["Work matches the item's description and title.".to_owned()]
        } else {
            item.acceptance_criteria.clone()
        },
        best_practices: vec![
            "Report milestones as they complete, not only at the end.".to_owned(),
            "Surface blockers immediately rather than working around them silently.".to_owned(),
        ],
        pitfalls: vec!["Do not report completion before acceptance criteria are verifiable.".to_owned()],
        tools: vec!["status".to_owned(), "get_work_item_dependencies".to_owned()],
    }
}

fn reporting_contract() -> String {
    "Call `status` after meaningful progress: kind=progress for incremental work, \
     kind=milestone for a completed sub-goal, kind=blocker if stuck (pauses the session \
     without failing it), kind=completion plus task_completed=true once the task is fully done."
        .to_owned()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use jive_domain::entities::{Priority, WorkItemStatus, WorkItemType};
    use jive_domain::value_objects::Metadata;

    use super::*;
    use crate::test_support::InMemoryStore;

    fn item(id: WorkItemId, item_type: WorkItemType, parent_id: Option<WorkItemId>, priority: Priority) -> WorkItem {
        let now = Utc::now();
        WorkItem {
            id,
            item_type,
            title: format!("item-{id}"),
            description: String::new(),
            status: WorkItemStatus::Ready,
            priority,
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

    fn build_orchestrator(store: Arc<InMemoryStore>) -> Orchestrator {
        let resolver = Resolver::new(store.clone());
        let hierarchy = HierarchyManager::new(store.clone());
        let dependency_engine = DependencyEngine::new(store.clone());
        let sync_engine = Arc::new(SyncEngine::new(store.clone()));
        Orchestrator::new(store, resolver, hierarchy, dependency_engine, sync_engine)
    }

    #[tokio::test]
    async fn execute_dispatches_root_first_under_dependency_order() {
        let store = Arc::new(InMemoryStore::new());
        let root = WorkItemId::new();
        let child = WorkItemId::new();
        seed(&store, &item(root, WorkItemType::Initiative, None, Priority::Low));
        seed(&store, &item(child, WorkItemType::Epic, Some(root), Priority::High));

        let orchestrator = build_orchestrator(store);
        let outcome = orchestrator
            .execute(&root.to_string(), ExecutionMode::Sequential, PlanOrdering::DependencyOrder, None)
            .await
            .unwrap();
        let StatusOutcome::Dispatched(dispatched) = outcome else {
            panic!("expected the first task to be dispatched");
        };
        assert_eq!(dispatched.work_item.id, root);
        assert_eq!(dispatched.position_label, "1 of 2");
    }

    #[tokio::test]
    async fn status_advances_and_completes() {
        let store = Arc::new(InMemoryStore::new());
        let root = WorkItemId::new();
        seed(&store, &item(root, WorkItemType::Initiative, None, Priority::Medium));

        let orchestrator = build_orchestrator(store);
        let outcome = orchestrator
            .execute(&root.to_string(), ExecutionMode::Sequential, PlanOrdering::DependencyOrder, None)
            .await
            .unwrap();
        let StatusOutcome::Dispatched(dispatched) = outcome else {
            panic!("expected a dispatch");
        };
        let execution_id = dispatched.execution_id;

        let finished = orchestrator.status(execution_id, true, None).await.unwrap();
        let StatusOutcome::Finished(session) = finished else {
            panic!("single-task plan should finish on first completion");
        };
        assert_eq!(session.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn blocker_report_transitions_to_blocked_without_failing() {
        let store = Arc::new(InMemoryStore::new());
        let root = WorkItemId::new();
        seed(&store, &item(root, WorkItemType::Initiative, None, Priority::Medium));

        let orchestrator = build_orchestrator(store);
        let dispatched = orchestrator
            .execute(&root.to_string(), ExecutionMode::Sequential, PlanOrdering::DependencyOrder, None)
            .await
            .unwrap();
        let StatusOutcome::Dispatched(dispatched) = dispatched else {
            panic!("expected a dispatch");
        };

        let outcome = orchestrator
            .status(
                dispatched.execution_id,
                false,
                Some(ProgressReport {
                    kind: ProgressKind::Blocker,
                    message: "waiting on external API access".to_owned(),
                    details: None,
                }),
            )
            .await
            .unwrap();
        let StatusOutcome::Dispatched(_) = outcome else {
            panic!("a blocker must not fail the session, and the task is still outstanding");
        };
        let session = orchestrator.session(dispatched.execution_id).unwrap();
        assert_eq!(session.status, SessionStatus::Blocked);
    }

    #[tokio::test]
    async fn cancel_sets_terminal_state() {
        let store = Arc::new(InMemoryStore::new());
        let root = WorkItemId::new();
        seed(&store, &item(root, WorkItemType::Initiative, None, Priority::Medium));

        let orchestrator = build_orchestrator(store);
        let dispatched = orchestrator
            .execute(&root.to_string(), ExecutionMode::Sequential, PlanOrdering::DependencyOrder, None)
            .await
            .unwrap();
        let StatusOutcome::Dispatched(dispatched) = dispatched else {
            panic!("expected a dispatch");
        };

        let session = orchestrator.cancel(dispatched.execution_id, "no longer needed", false, false).unwrap();
        assert_eq!(session.status, SessionStatus::Cancelled);
        assert!(session.cancelled_at.is_some());
    }
}
