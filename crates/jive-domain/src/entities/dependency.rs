//! `Dependency` — a directed relationship between two work items (spec §3.1).

use serde::{Deserialize, Serialize};

use crate::value_objects::WorkItemId;

define_string_enum! {
    /// The kind of relationship a `Dependency` edge encodes.
    pub enum DependencyKind {
        Blocks => "blocks",
        DependsOn => "depends_on",
        RelatesTo => "relates_to",
    }
}

/// A directed edge between two work items. `blocks(A→B)` is equivalent to
/// `depends_on(B→A)` once interpreted by the `DependencyEngine` (spec §4.3);
/// this struct stores the relationship exactly as declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Dependency {
    /// The work item the edge originates from.
    pub source_id: WorkItemId,
    /// The work item the edge points to.
    pub target_id: WorkItemId,
    /// The relationship kind.
    pub kind: DependencyKind,
}

impl Dependency {
    /// Construct a new dependency edge.
    #[must_use]
    pub fn new(source_id: WorkItemId, target_id: WorkItemId, kind: DependencyKind) -> Self {
        Self {
            source_id,
            target_id,
            kind,
        }
    }

    /// The directed "must wait for" scheduling edge `(from, to)` this
    /// dependency implies, or `None` for `relates_to` (informational only).
    #[must_use]
    pub fn scheduling_edge(&self) -> Option<(WorkItemId, WorkItemId)> {
        match self.kind {
            DependencyKind::DependsOn => Some((self.source_id, self.target_id)),
            DependencyKind::Blocks => Some((self.target_id, self.source_id)),
            DependencyKind::RelatesTo => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_is_equivalent_to_reversed_depends_on() {
        let a = WorkItemId::new();
        let b = WorkItemId::new();
        let blocks = Dependency::new(a, b, DependencyKind::Blocks);
        let depends_on = Dependency::new(b, a, DependencyKind::DependsOn);
        assert_eq!(blocks.scheduling_edge(), depends_on.scheduling_edge());
    }

    #[test]
    fn relates_to_has_no_scheduling_edge() {
        let a = WorkItemId::new();
        let b = WorkItemId::new();
        let edge = Dependency::new(a, b, DependencyKind::RelatesTo);
        assert!(edge.scheduling_edge().is_none());
    }
}
