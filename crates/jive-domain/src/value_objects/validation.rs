//! Dependency-graph validation value objects (spec §4.3).

use serde::{Deserialize, Serialize};

use crate::value_objects::ids::WorkItemId;

/// Aggregate stats about a dependency graph snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GraphStats {
    /// Number of nodes (`|V|`).
    pub node_count: usize,
    /// Number of scheduling edges (`|E|`).
    pub edge_count: usize,
    /// Whether the graph is currently acyclic.
    pub is_dag: bool,
    /// `|E| / (|V| * (|V| - 1))` for `|V| > 1`, else `0.0`.
    pub density: f64,
}

/// A proposed edge removal that would break one reported cycle.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SuggestedFix {
    /// The cycle this fix addresses, in traversal order.
    pub cycle: Vec<WorkItemId>,
    /// The edge to remove: `(from, to)`.
    pub remove_edge: (WorkItemId, WorkItemId),
}

/// Result of `DependencyEngine::validate`.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ValidationReport {
    /// `true` iff no cycles and no missing/orphaned references were found.
    pub is_valid: bool,
    /// Every simple cycle found, each as an ordered node list.
    pub cycles: Vec<Vec<WorkItemId>>,
    /// Dependency edges whose endpoint is outside the checked set.
    pub missing: Vec<(WorkItemId, WorkItemId)>,
    /// Nodes whose `parent_id` refers outside the checked set.
    pub orphans: Vec<WorkItemId>,
    /// One suggested fix per reported cycle, when requested.
    pub suggested_fixes: Vec<SuggestedFix>,
    /// Aggregate graph statistics.
    pub stats: GraphStats,
    /// `true` if cycle enumeration hit `CYCLE_ENUMERATION_CAP` and stopped early.
    pub cycle_enumeration_truncated: bool,
}
