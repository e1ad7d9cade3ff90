//! Bidirectional reconciliation between on-disk work-item files and the
//! Store, with content-addressed change detection and pluggable conflict
//! resolution (spec §4.5).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use jive_domain::entities::{SyncRecord, WorkItem, WorkItemStatus};
use jive_domain::error::{Error, Result};
use jive_domain::ports::{ConflictField, FileFormat, MergeStrategy, ParsedWorkItem, Store, SyncConflict, Table};
use jive_domain::value_objects::WorkItemId;
use serde_json::{Value, json};

/// Outcome of a File→Store sync attempt.
#[derive(Debug, Clone)]
pub enum SyncOutcome {
    /// The record was inserted or updated (possibly after merging).
    Success(WorkItem),
    /// `manual_resolution` applies (explicitly or via `create_branch`
    /// downgrade): the Store was not mutated.
    Conflict(SyncConflict),
}

/// Reconciles on-disk work-item files with the Store (spec §4.5). Owns the
/// `SyncRecord` map directly — the Store has no `SyncRecord` table (spec
/// §4.1 tables), per spec §3.3 ownership rules.
#[derive(Debug)]
pub struct SyncEngine {
    store: Arc<dyn Store>,
    records: Mutex<HashMap<String, SyncRecord>>,
}

impl SyncEngine {
    /// Build a sync engine over the given Store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// File→Store (spec §4.5 File→Store operation).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on unparseable content, [`Error::Validation`]
    /// on schema/enum violations, and propagates Store failures.
    pub async fn sync_file_to_store(
        &self,
        file_path: &str,
        content: &[u8],
        merge_strategy: MergeStrategy,
        validate_only: bool,
    ) -> Result<SyncOutcome> {
        let format = format_for_path(file_path)?;
        let mut parsed = parse_content(content, format)?;
        validate_parsed(&parsed)?;
        if normalize_status(&mut parsed)? {
            tracing::warn!(
                file_path,
                "file uses the legacy status vocabulary (not_started/todo/completed/failed); \
                 treated as aliased to the canonical status"
            );
        }

        if validate_only {
            let item: WorkItem = serde_json::from_value(parsed.document)?;
            return Ok(SyncOutcome::Success(item));
        }

        let id: WorkItemId = parsed
            .document
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation("missing required field: id"))?
            .parse()
            .map_err(|_| Error::validation("id is not a valid UUID"))?;
        let now = Utc::now();
        let checksum = jive_utils::sha256_hex(content);

        let existing_record = self.store.get(Table::WorkItem, &id.to_string()).await?;
        let resolved = match existing_record {
            None => {
                let mut incoming: WorkItem = serde_json::from_value(parsed.document)?;
                incoming.created_at = now;
                incoming.updated_at = now;
                incoming.validate()?;
                let stored = self
                    .store
                    .create(Table::WorkItem, serde_json::to_value(&incoming)?)
                    .await?;
                serde_json::from_value::<WorkItem>(stored)?
            }
            Some(existing_value) => {
                let existing: WorkItem = serde_json::from_value(existing_value)?;
                let incoming: WorkItem = serde_json::from_value(parsed.document)?;
                let conflict = detect_conflict(&incoming, &existing);
                if conflict.is_empty() {
                    let stored = self
                        .store
                        .update(Table::WorkItem, &id.to_string(), serde_json::to_value(&incoming)?)
                        .await?;
                    serde_json::from_value::<WorkItem>(stored)?
                } else {
                    let (effective, downgraded) = downgrade_if_reserved(merge_strategy);
                    if matches!(effective, MergeStrategy::ManualResolution) {
                        let mut conflict = conflict;
                        if downgraded {
                            conflict.downgraded_from = Some("create_branch".to_owned());
                        }
                        return Ok(SyncOutcome::Conflict(conflict));
                    }
                    let merged = apply_merge_strategy(effective, &incoming, &existing, now);
                    let stored = self
                        .store
                        .update(Table::WorkItem, &id.to_string(), serde_json::to_value(&merged)?)
                        .await?;
                    serde_json::from_value::<WorkItem>(stored)?
                }
            }
        };

        self.record_sync(file_path.to_owned(), id, checksum, now);
        Ok(SyncOutcome::Success(resolved))
    }

    /// Store→File (spec §4.5 Store→File operation). Returns the serialized
    /// bytes for the caller to write to disk, plus the updated `SyncRecord`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `work_item_id` is absent from the
    /// Store; propagates serialization and Store failures.
    pub async fn sync_store_to_file(
        &self,
        work_item_id: WorkItemId,
        path_override: Option<String>,
        format: FileFormat,
    ) -> Result<(Vec<u8>, SyncRecord)> {
        let Some(record) = self.store.get(Table::WorkItem, &work_item_id.to_string()).await? else {
            return Err(Error::not_found(format!("work_item/{work_item_id}")));
        };
        let mut item: WorkItem = serde_json::from_value(record)?;
        let now = Utc::now();
        item.metadata.insert("last_synced".to_owned(), json!(now.to_rfc3339()));
        item.metadata.insert("file_version".to_owned(), json!("1.0"));

        let path = path_override.unwrap_or_else(|| default_path(&item, format));
        let bytes = serialize(&item, format)?;
        let checksum = jive_utils::sha256_hex(&bytes);
        self.record_sync(path.clone(), work_item_id, checksum.clone(), now);

        Ok((
            bytes,
            SyncRecord {
                path,
                work_item_id,
                checksum,
                last_synced: now,
            },
        ))
    }

    /// Look up the sync state for a given on-disk path.
    #[must_use]
    pub fn sync_record_for_path(&self, path: &str) -> Option<SyncRecord> {
        self.lock().get(path).cloned()
    }

    /// Look up the sync state for a given work item (first match by path
    /// insertion order is not guaranteed; callers with multiple files per
    /// item should use `sync_record_for_path`).
    #[must_use]
    pub fn sync_record_for_work_item(&self, id: WorkItemId) -> Option<SyncRecord> {
        self.lock().values().find(|r| r.work_item_id == id).cloned()
    }

    /// Every retained sync record.
    #[must_use]
    pub fn all_sync_records(&self) -> Vec<SyncRecord> {
        self.lock().values().cloned().collect()
    }

    fn record_sync(&self, path: String, work_item_id: WorkItemId, checksum: String, last_synced: DateTime<Utc>) {
        self.lock().insert(
            path.clone(),
            SyncRecord {
                path,
                work_item_id,
                checksum,
                last_synced,
            },
        );
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SyncRecord>> {
        self.records.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn format_for_path(file_path: &str) -> Result<FileFormat> {
    let ext = std::path::Path::new(file_path)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(|| Error::parse(format!("cannot infer file format from path: {file_path}")))?;
    FileFormat::from_extension(ext).ok_or_else(|| Error::parse(format!("unsupported file extension: {ext}")))
}

fn parse_content(content: &[u8], format: FileFormat) -> Result<ParsedWorkItem> {
    let text =
        std::str::from_utf8(content).map_err(|e| Error::parse(format!("file is not valid UTF-8: {e}")))?;
    let mut document: Value = match format {
        FileFormat::Json => {
            serde_json::from_str(text).map_err(|e| Error::parse_with_source("invalid JSON content", e))?
        }
        FileFormat::Yaml => {
            serde_yaml::from_str(text).map_err(|e| Error::parse_with_source("invalid YAML content", e))?
        }
    };
    apply_defaults(&mut document);
    Ok(ParsedWorkItem { format, document })
}

/// Applies spec §4.5 defaults (`status=not_started`, `priority=medium`) plus
/// the additional shape defaults a freshly authored file naturally lacks
/// (`description`, `created_at`, `updated_at`) so a bare `{id, title, type}`
/// file deserializes into a complete `WorkItem`.
fn apply_defaults(document: &mut Value) {
    let Value::Object(map) = document else {
        return;
    };
    map.entry("status").or_insert_with(|| json!("not_started"));
    map.entry("priority").or_insert_with(|| json!("medium"));
    map.entry("description").or_insert_with(|| json!(""));
    let now = json!(Utc::now());
    map.entry("created_at").or_insert_with(|| now.clone());
    map.entry("updated_at").or_insert_with(|| now);
}

fn validate_parsed(parsed: &ParsedWorkItem) -> Result<()> {
    let Value::Object(map) = &parsed.document else {
        return Err(Error::validation("file content must be a JSON/YAML object"));
    };
    let mut violations = Vec::new();

    for field in ["id", "title", "type"] {
        if !map.get(field).is_some_and(|v| !v.is_null()) {
            violations.push(format!("missing required field: {field}"));
        }
    }
    if let Some(Value::String(id)) = map.get("id") {
        if id.parse::<WorkItemId>().is_err() {
            violations.push(format!("id is not a valid UUID: {id}"));
        }
    }
    if let Some(Value::String(item_type)) = map.get("type") {
        if item_type.parse::<jive_domain::entities::WorkItemType>().is_err() {
            violations.push(format!("unknown type: {item_type}"));
        }
    }
    if let Some(Value::String(status)) = map.get("status") {
        if WorkItemStatus::parse_with_alias(status).is_none() {
            violations.push(format!("unknown status: {status}"));
        }
    }
    if let Some(Value::String(priority)) = map.get("priority") {
        if priority.parse::<jive_domain::entities::Priority>().is_err() {
            violations.push(format!("unknown priority: {priority}"));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::validation(violations.join("; ")))
    }
}

/// Rewrites `status` to its canonical wire string so `WorkItem`'s own
/// `Deserialize` (which only accepts canonical strings) succeeds. Returns
/// `true` iff the legacy alias vocabulary was used (SPEC_FULL §11.1).
fn normalize_status(parsed: &mut ParsedWorkItem) -> Result<bool> {
    let Value::Object(map) = &mut parsed.document else {
        return Ok(false);
    };
    let Some(Value::String(raw)) = map.get("status").cloned() else {
        return Ok(false);
    };
    let Some((canonical, aliased)) = WorkItemStatus::parse_with_alias(&raw) else {
        return Err(Error::validation(format!("unknown status: {raw}")));
    };
    map.insert("status".to_owned(), json!(canonical.as_str()));
    Ok(aliased)
}

/// Detection rule (spec §4.5.1): `title`, `description`, `status`,
/// `priority`, and (read from `metadata`, since the entity has no dedicated
/// field) `assignee`; `updated_at` divergence is an additional conflict.
fn detect_conflict(incoming: &WorkItem, existing: &WorkItem) -> SyncConflict {
    let mut fields = Vec::new();
    if incoming.title != existing.title {
        fields.push(scalar_conflict("title", &incoming.title, &existing.title));
    }
    if incoming.description != existing.description {
        fields.push(scalar_conflict("description", &incoming.description, &existing.description));
    }
    if incoming.status != existing.status {
        fields.push(scalar_conflict("status", incoming.status.as_str(), existing.status.as_str()));
    }
    if incoming.priority != existing.priority {
        fields.push(scalar_conflict("priority", incoming.priority.as_str(), existing.priority.as_str()));
    }
    let incoming_assignee = incoming.metadata.get("assignee");
    let existing_assignee = existing.metadata.get("assignee");
    if incoming_assignee != existing_assignee {
        fields.push(ConflictField {
            field: "assignee".to_owned(),
            file_value: incoming_assignee.cloned().unwrap_or(Value::Null),
            store_value: existing_assignee.cloned().unwrap_or(Value::Null),
        });
    }
    if incoming.updated_at != existing.updated_at {
        fields.push(ConflictField {
            field: "updated_at".to_owned(),
            file_value: json!(incoming.updated_at),
            store_value: json!(existing.updated_at),
        });
    }
    SyncConflict {
        fields,
        downgraded_from: None,
    }
}

fn scalar_conflict(field: &str, incoming: &str, existing: &str) -> ConflictField {
    ConflictField {
        field: field.to_owned(),
        file_value: json!(incoming),
        store_value: json!(existing),
    }
}

/// `create_branch` is reserved and always downgrades to `manual_resolution`
/// (SPEC_FULL §11.2). Returns the effective strategy plus whether a
/// downgrade occurred.
fn downgrade_if_reserved(strategy: MergeStrategy) -> (MergeStrategy, bool) {
    if matches!(strategy, MergeStrategy::CreateBranch) {
        (MergeStrategy::ManualResolution, true)
    } else {
        (strategy, false)
    }
}

fn apply_merge_strategy(
    strategy: MergeStrategy,
    incoming: &WorkItem,
    existing: &WorkItem,
    now: DateTime<Utc>,
) -> WorkItem {
    match strategy {
        MergeStrategy::FileWins => {
            let mut merged = incoming.clone();
            merged.updated_at = now;
            merged
        }
        MergeStrategy::DatabaseWins => existing.clone(),
        MergeStrategy::AutoMerge => {
            let base = if incoming.updated_at >= existing.updated_at { incoming } else { existing };
            let mut merged = base.clone();
            merged.tags = incoming.tags.union(&existing.tags).cloned().collect();
            let mut dependencies: Vec<WorkItemId> =
                incoming.dependencies.iter().chain(existing.dependencies.iter()).copied().collect();
            dependencies.sort_by_key(WorkItemId::to_string);
            dependencies.dedup();
            merged.dependencies = dependencies;
            merged.updated_at = now;
            merged
        }
        // Handled by the caller before a merge strategy is ever applied.
        MergeStrategy::ManualResolution | MergeStrategy::CreateBranch => existing.clone(),
    }
}

fn default_path(item: &WorkItem, format: FileFormat) -> String {
    format!(
        "{}/{}_{}.{}",
        item.item_type.as_str(),
        item.id,
        jive_utils::slugify(&item.title),
        format.extension()
    )
}

fn serialize(item: &WorkItem, format: FileFormat) -> Result<Vec<u8>> {
    match format {
        FileFormat::Json => {
            serde_json::to_vec_pretty(item).map_err(|e| Error::parse_with_source("failed to serialize as JSON", e))
        }
        FileFormat::Yaml => serde_yaml::to_string(item)
            .map(String::into_bytes)
            .map_err(|e| Error::parse_with_source("failed to serialize as YAML", e)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use jive_domain::entities::{Priority, WorkItemType};
    use jive_domain::value_objects::Metadata;

    use super::*;
    use crate::test_support::InMemoryStore;

    fn existing_item(id: WorkItemId, title: &str, updated_at: DateTime<Utc>) -> WorkItem {
        WorkItem {
            id,
            item_type: WorkItemType::Task,
            title: title.to_owned(),
            description: String::new(),
            status: WorkItemStatus::Ready,
            priority: Priority::Medium,
            complexity: None,
            parent_id: Some(WorkItemId::new()),
            dependencies: Vec::new(),
            acceptance_criteria: Vec::new(),
            progress_percentage: 0,
            tags: Default::default(),
            metadata: Metadata::default(),
            created_at: updated_at,
            updated_at,
            embedding: Vec::new(),
        }
    }

    #[tokio::test]
    async fn auto_merge_conflict_then_idempotent_resync() {
        let store = Arc::new(InMemoryStore::new());
        let id = WorkItemId::new();
        let base_time = Utc::now();
        let existing = existing_item(id, "Old", base_time);
        store.seed(Table::WorkItem, id.to_string(), serde_json::to_value(&existing).unwrap());

        let engine = SyncEngine::new(store);
        let file_time = base_time + Duration::seconds(1);
        let content = format!(
            r#"{{"id":"{id}","title":"New","type":"task","parent_id":"{}","updated_at":"{}"}}"#,
            existing.parent_id.unwrap(),
            file_time.to_rfc3339()
        );

        let outcome = engine
            .sync_file_to_store("work.json", content.as_bytes(), MergeStrategy::AutoMerge, false)
            .await
            .unwrap();
        let SyncOutcome::Success(resolved) = outcome else {
            panic!("expected a successful auto-merge, not a conflict");
        };
        assert_eq!(resolved.title, "New");
        assert!(resolved.updated_at >= base_time);

        let first_checksum = engine.sync_record_for_path("work.json").unwrap().checksum;

        // Re-sync the identical bytes: no field-level change on the second call.
        let outcome_again = engine
            .sync_file_to_store("work.json", content.as_bytes(), MergeStrategy::AutoMerge, false)
            .await
            .unwrap();
        let SyncOutcome::Success(resolved_again) = outcome_again else {
            panic!("expected success on re-sync");
        };
        assert_eq!(resolved_again.title, "New");
        assert_eq!(engine.sync_record_for_path("work.json").unwrap().checksum, first_checksum);
    }

    #[tokio::test]
    async fn create_branch_downgrades_to_manual_resolution() {
        let store = Arc::new(InMemoryStore::new());
        let id = WorkItemId::new();
        let existing = existing_item(id, "Old", Utc::now());
        store.seed(Table::WorkItem, id.to_string(), serde_json::to_value(&existing).unwrap());

        let engine = SyncEngine::new(store);
        let content = format!(
            r#"{{"id":"{id}","title":"New","type":"task","parent_id":"{}"}}"#,
            existing.parent_id.unwrap()
        );

        let outcome = engine
            .sync_file_to_store("work.json", content.as_bytes(), MergeStrategy::CreateBranch, false)
            .await
            .unwrap();
        let SyncOutcome::Conflict(conflict) = outcome else {
            panic!("create_branch must downgrade to manual_resolution, which surfaces a conflict");
        };
        assert_eq!(conflict.downgraded_from.as_deref(), Some("create_branch"));
    }
}
