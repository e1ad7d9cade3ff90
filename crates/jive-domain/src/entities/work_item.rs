//! `WorkItem` — the primary entity (spec §3.1).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value_objects::{Metadata, WorkItemId};

define_string_enum! {
    /// Position of a `WorkItem` in the initiative → epic → feature → story →
    /// task chain (spec §3.2 invariant 1).
    pub enum WorkItemType {
        Initiative => "initiative",
        Epic => "epic",
        Feature => "feature",
        Story => "story",
        Task => "task",
    }
}

impl WorkItemType {
    /// Position in [`crate::constants::TYPE_CHAIN`], root = 0.
    #[must_use]
    pub fn rank(self) -> usize {
        match self {
            Self::Initiative => 0,
            Self::Epic => 1,
            Self::Feature => 2,
            Self::Story => 3,
            Self::Task => 4,
        }
    }
}

define_string_enum! {
    /// The canonical status vocabulary (spec §3.1).
    pub enum WorkItemStatus {
        Backlog => "backlog",
        Ready => "ready",
        InProgress => "in_progress",
        Blocked => "blocked",
        Review => "review",
        Done => "done",
        Cancelled => "cancelled",
    }
}

impl WorkItemStatus {
    /// Parse a status string, accepting both the canonical vocabulary and
    /// the older alias set (`not_started`, `todo`, `completed`, `failed`).
    /// Returns the canonical status plus whether an alias was used, so
    /// callers can surface the mixed-vocabulary warning (SPEC_FULL §11.1).
    #[must_use]
    pub fn parse_with_alias(raw: &str) -> Option<(Self, bool)> {
        if let Ok(canonical) = raw.parse::<Self>() {
            return Some((canonical, false));
        }
        let aliased = match raw {
            "not_started" => Self::Backlog,
            "todo" => Self::Ready,
            "completed" => Self::Done,
            "failed" => Self::Cancelled,
            _ => return None,
        };
        Some((aliased, true))
    }

    /// `true` for the terminal "done" status (`done` canonical, `completed` alias).
    #[must_use]
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

define_string_enum! {
    /// Scheduling priority (spec §3.1).
    pub enum Priority {
        Critical => "critical",
        High => "high",
        Medium => "medium",
        Low => "low",
    }
}

impl Priority {
    /// Ascending rank used for priority-first orderings (critical = 0).
    #[must_use]
    pub fn rank(self) -> usize {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

define_string_enum! {
    /// Optional estimate of implementation effort (spec §3.1).
    pub enum Complexity {
        Simple => "simple",
        Moderate => "moderate",
        Complex => "complex",
    }
}

impl Complexity {
    /// Ascending rank for `complexity_simple_first` ordering (simple = 0).
    #[must_use]
    pub fn rank(self) -> usize {
        match self {
            Self::Simple => 0,
            Self::Moderate => 1,
            Self::Complex => 2,
        }
    }
}

/// The primary orchestration entity: a unit of work at any level of the
/// initiative/epic/feature/story/task hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct WorkItem {
    /// Immutable primary identifier.
    pub id: WorkItemId,
    /// Position in the hierarchy chain.
    #[serde(rename = "type")]
    pub item_type: WorkItemType,
    /// Non-empty, at most 200 characters.
    pub title: String,
    /// Free-form body text.
    pub description: String,
    /// Current status (canonical vocabulary on the wire).
    pub status: WorkItemStatus,
    /// Scheduling priority.
    pub priority: Priority,
    /// Optional complexity estimate.
    pub complexity: Option<Complexity>,
    /// Parent in the hierarchy; `None` iff `item_type = Initiative`.
    pub parent_id: Option<WorkItemId>,
    /// Ordered list of depended-on work items (interpretation is owned by
    /// the `DependencyEngine`, not this struct).
    #[serde(default)]
    pub dependencies: Vec<WorkItemId>,
    /// Criteria that must hold for this item to be considered done.
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    /// Completion percentage, `0..=100`.
    #[serde(default)]
    pub progress_percentage: u8,
    /// Free-form labels.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Opaque key/value metadata (includes `last_synced`, `file_version` once synced).
    #[serde(default)]
    pub metadata: Metadata,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Instant of the most recent field change.
    pub updated_at: DateTime<Utc>,
    /// Embedding derived from `title + " " + description`; zero vector if
    /// never generated or if embedding failed.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl WorkItem {
    /// The text the Store embeds and indexes for keyword search: spec §4.1
    /// designates `title + " " + description` for the `WorkItem` table.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Validate the shape-level invariants owned by the entity itself
    /// (title length, progress/status coherence). Hierarchy-chain and
    /// dependency-graph invariants are validated by their owning
    /// components, not here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing every violated rule.
    pub fn validate(&self) -> Result<(), Error> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push("title must not be empty".to_owned());
        }
        if self.title.chars().count() > 200 {
            violations.push("title must be at most 200 characters".to_owned());
        }
        if self.progress_percentage > 100 {
            violations.push("progress_percentage must be in [0, 100]".to_owned());
        }
        if self.status.is_done() && self.progress_percentage != 100 {
            violations.push("status=done requires progress_percentage=100".to_owned());
        }
        if matches!(self.status, WorkItemStatus::Backlog) && self.progress_percentage != 0 {
            violations.push("status=backlog requires progress_percentage=0".to_owned());
        }
        if matches!(self.item_type, WorkItemType::Initiative) != self.parent_id.is_none() {
            violations.push("parent_id must be null iff type=initiative".to_owned());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(violations.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_status() {
        let (status, aliased) = WorkItemStatus::parse_with_alias("in_progress").unwrap();
        assert_eq!(status, WorkItemStatus::InProgress);
        assert!(!aliased);
    }

    #[test]
    fn parses_alias_status_and_flags_it() {
        let (status, aliased) = WorkItemStatus::parse_with_alias("completed").unwrap();
        assert_eq!(status, WorkItemStatus::Done);
        assert!(aliased);
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(WorkItemStatus::parse_with_alias("nonsense").is_none());
    }

    #[test]
    fn type_rank_orders_root_first() {
        assert!(WorkItemType::Initiative.rank() < WorkItemType::Task.rank());
    }

    #[test]
    fn done_without_full_progress_is_invalid() {
        let item = sample_item(WorkItemStatus::Done, 50);
        assert!(item.validate().is_err());
    }

    #[test]
    fn done_with_full_progress_is_valid() {
        let item = sample_item(WorkItemStatus::Done, 100);
        assert!(item.validate().is_ok());
    }

    fn sample_item(status: WorkItemStatus, progress: u8) -> WorkItem {
        let now = Utc::now();
        WorkItem {
            id: WorkItemId::new(),
            item_type: WorkItemType::Task,
            title: "Sample".to_owned(),
            description: String::new(),
            status,
            priority: Priority::Medium,
            complexity: None,
            parent_id: Some(WorkItemId::new()),
            dependencies: Vec::new(),
            acceptance_criteria: Vec::new(),
            progress_percentage: progress,
            tags: BTreeSet::new(),
            metadata: Metadata::default(),
            created_at: now,
            updated_at: now,
            embedding: Vec::new(),
        }
    }
}
