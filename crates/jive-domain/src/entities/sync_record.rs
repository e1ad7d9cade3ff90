//! `SyncRecord` — reconciliation state between a file and a stored work item
//! (spec §3.1, §4.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::WorkItemId;

/// The reconciliation state the `SyncEngine` owns for one file ↔ work-item
/// pairing. Keyed by both `path` and `work_item_id`; retained indefinitely.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SyncRecord {
    /// On-disk path the record was last synced from or to.
    pub path: String,
    /// The work item this file reconciles with.
    pub work_item_id: WorkItemId,
    /// `SHA-256(file_content_bytes)` of the last successfully synced content.
    pub checksum: String,
    /// Wall-clock time of the last successful reconciliation.
    pub last_synced: DateTime<Utc>,
}

impl SyncRecord {
    /// `true` if `candidate_checksum` matches this record's checksum exactly
    /// — the condition that makes a re-sync a no-op (spec §8 idempotence law).
    #[must_use]
    pub fn is_unchanged(&self, candidate_checksum: &str) -> bool {
        self.checksum == candidate_checksum
    }
}
