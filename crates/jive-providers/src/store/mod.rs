//! In-memory implementation of the `Store` port (spec §4.1).
//!
//! Grounded on the teacher's `database/sqlite/memory_repository.rs`
//! CRUD-over-an-executor shape, generalized to a plain in-process map since
//! this core's only mandated backend is embedded, not a SQL file. The
//! optional SQLite-backed variant lives alongside it in [`sqlite`].

mod retry;
mod search;
#[cfg(feature = "memory-sqlite")]
pub mod sqlite;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jive_domain::error::{Error, Result};
use jive_domain::ports::{EmbeddingProvider, Store, Table};
use jive_domain::value_objects::{ListQuery, SearchQuery, SearchResult, SortOrder};
use serde_json::Value;
use tokio::sync::RwLock;

use self::retry::retry_write;
use self::search::{hybrid_search, keyword_search, vector_search};

/// One table's records plus its lazily-built full-text index (spec §4.1:
/// "created lazily on first keyword search after the table is non-empty").
#[derive(Debug, Default)]
struct TableData {
    records: BTreeMap<String, Value>,
    fts_built: bool,
    fts_index: std::collections::HashMap<String, std::collections::HashSet<String>>,
}

/// A typed, embedded document store backed by an in-process map. Tables are
/// lazily created on first access (spec §4.1).
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<std::collections::HashMap<Table, TableData>>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl InMemoryStore {
    /// Build a store that derives embeddings with `embedder`.
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { tables: RwLock::new(std::collections::HashMap::new()), embedder }
    }

    /// The designated text fields for `table`, concatenated with a single
    /// space, per spec §4.1 (`WorkItem`: `title + " " + description`). Other
    /// tables have no entity of their own in this spec, so the same
    /// `title`/`description` convention is applied uniformly; records
    /// lacking both fields embed the empty string.
    fn designated_text(record: &Value) -> String {
        let title = record.get("title").and_then(Value::as_str).unwrap_or("");
        let description = record.get("description").and_then(Value::as_str).unwrap_or("");
        format!("{title} {description}").trim().to_owned()
    }

    async fn embed(&self, text: &str) -> Vec<f32> {
        if text.is_empty() {
            return vec![0.0; self.embedder.dimension()];
        }
        match self.embedder.embed(text).await {
            Ok(vector) => vector,
            Err(error) => {
                tracing::warn!(%error, "embedding provider failed, writing zero vector");
                vec![0.0; self.embedder.dimension()]
            }
        }
    }

    fn require_id(record: &Value) -> Result<String> {
        record
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| Error::validation("record is missing a string \"id\" field"))
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create(&self, table: Table, mut record: Value) -> Result<Value> {
        let id = Self::require_id(&record)?;
        let now = Utc::now().to_rfc3339();
        let obj = record.as_object_mut().ok_or_else(|| Error::validation("record must be a JSON object"))?;
        obj.entry("created_at").or_insert_with(|| Value::String(now.clone()));
        obj.entry("updated_at").or_insert_with(|| Value::String(now));
        let text = Self::designated_text(&record);
        let embedding = self.embed(&text).await;
        record["embedding"] = serde_json::to_value(&embedding)?;

        retry_write(|| async {
            let mut tables = self.tables.write().await;
            let data = tables.entry(table).or_default();
            data.records.insert(id.clone(), record.clone());
            data.fts_built = false;
            Ok(())
        })
        .await?;
        Ok(record)
    }

    async fn update(&self, table: Table, id: &str, partial: Value) -> Result<Value> {
        let patch = partial.as_object().ok_or_else(|| Error::validation("update patch must be a JSON object"))?.clone();
        let text_changed = patch.contains_key("title") || patch.contains_key("description");

        let existing = {
            let tables = self.tables.read().await;
            tables
                .get(&table)
                .and_then(|data| data.records.get(id))
                .cloned()
                .ok_or_else(|| Error::not_found(format!("{table}/{id}")))?
        };

        let mut merged = existing;
        {
            let obj = merged.as_object_mut().ok_or_else(|| Error::validation("stored record must be a JSON object"))?;
            for (key, value) in patch {
                obj.insert(key, value);
            }
            obj.insert("updated_at".to_owned(), Value::String(Utc::now().to_rfc3339()));
        }

        if text_changed {
            let text = Self::designated_text(&merged);
            let embedding = self.embed(&text).await;
            merged["embedding"] = serde_json::to_value(&embedding)?;
        }

        let result = merged.clone();
        retry_write(|| async {
            let mut tables = self.tables.write().await;
            let data = tables.entry(table).or_default();
            data.records.insert(id.to_owned(), merged.clone());
            data.fts_built = false;
            Ok(())
        })
        .await?;
        Ok(result)
    }

    async fn get(&self, table: Table, id: &str) -> Result<Option<Value>> {
        let tables = self.tables.read().await;
        Ok(tables.get(&table).and_then(|data| data.records.get(id)).cloned())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<bool> {
        retry_write(|| async {
            let mut tables = self.tables.write().await;
            let Some(data) = tables.get_mut(&table) else {
                return Ok(false);
            };
            Ok(data.records.remove(id).is_some())
        })
        .await
    }

    async fn list(&self, table: Table, query: ListQuery) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        let Some(data) = tables.get(&table) else {
            return Ok(Vec::new());
        };

        let mut records: Vec<&Value> =
            data.records.values().filter(|record| query.filters.iter().all(|filter| filter.matches(record))).collect();

        let descending = matches!(query.sort_order, Some(SortOrder::Desc));
        records.sort_by(|a, b| {
            let primary = match &query.sort_by {
                Some(field) => compare_field(a, b, field),
                None => std::cmp::Ordering::Equal,
            };
            let primary = if descending { primary.reverse() } else { primary };
            primary.then_with(|| {
                a.get("id").and_then(Value::as_str).cmp(&b.get("id").and_then(Value::as_str))
            })
        });

        let offset = query.offset.unwrap_or(0);
        let iter = records.into_iter().skip(offset);
        let page: Vec<Value> = match query.limit {
            Some(limit) => iter.take(limit).cloned().collect(),
            None => iter.cloned().collect(),
        };
        Ok(page)
    }

    async fn search(&self, table: Table, query: SearchQuery) -> Result<Vec<SearchResult>> {
        if query.query.is_empty() {
            return Ok(Vec::new());
        }
        match query.kind {
            jive_domain::value_objects::SearchKind::Vector => {
                vector_search(self, table, &query).await
            }
            jive_domain::value_objects::SearchKind::Keyword => {
                self.ensure_fts(table).await;
                let tables = self.tables.read().await;
                let data = tables.get(&table);
                Ok(keyword_search(data, &query))
            }
            jive_domain::value_objects::SearchKind::Hybrid => {
                self.ensure_fts(table).await;
                hybrid_search(self, table, &query).await
            }
        }
    }

    async fn table_nonempty(&self, table: Table) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables.get(&table).is_some_and(|data| !data.records.is_empty()))
    }

    fn provider_name(&self) -> &'static str {
        "in-memory"
    }
}

impl InMemoryStore {
    async fn ensure_fts(&self, table: Table) {
        let mut tables = self.tables.write().await;
        let Some(data) = tables.get_mut(&table) else { return };
        if data.fts_built || data.records.is_empty() {
            return;
        }
        let mut index: std::collections::HashMap<String, std::collections::HashSet<String>> = std::collections::HashMap::new();
        for (id, record) in &data.records {
            for token in tokenize(&Self::designated_text(record)) {
                index.entry(token).or_default().insert(id.clone());
            }
        }
        data.fts_index = index;
        data.fts_built = true;
    }

    pub(crate) async fn read_table(&self, table: Table) -> Option<Vec<(String, Value)>> {
        let tables = self.tables.read().await;
        tables.get(&table).map(|data| data.records.iter().map(|(id, v)| (id.clone(), v.clone())).collect())
    }

    pub(crate) async fn embed_query(&self, text: &str) -> Vec<f32> {
        self.embed(text).await
    }

    /// Insert `record` verbatim, bypassing embedding/timestamp derivation —
    /// used to hydrate the mirror from an already-persisted record (see
    /// [`crate::store::sqlite`]).
    pub(crate) async fn hydrate(&self, table: Table, record: Value) {
        let Some(id) = record.get("id").and_then(Value::as_str).map(str::to_owned) else { return };
        let mut tables = self.tables.write().await;
        let data = tables.entry(table).or_default();
        data.records.insert(id, record);
        data.fts_built = false;
    }
}

fn compare_field(a: &Value, b: &Value, field: &str) -> std::cmp::Ordering {
    let av = a.get(field);
    let bv = b.get(field);
    match (av, bv) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(std::cmp::Ordering::Equal)
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => std::cmp::Ordering::Equal,
    }
}

pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase().split_whitespace().map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use jive_domain::value_objects::{Filter, SearchKind};
    use serde_json::json;

    use super::*;
    use crate::embedding::DeterministicEmbeddingProvider;

    fn store() -> InMemoryStore {
        InMemoryStore::new(Arc::new(DeterministicEmbeddingProvider::new(16)))
    }

    #[tokio::test]
    async fn create_assigns_timestamps_and_embedding() {
        let store = store();
        let record = json!({"id": "a", "title": "Build thing", "description": "does stuff"});
        let stored = store.create(Table::WorkItem, record).await.unwrap();
        assert!(stored.get("created_at").is_some());
        assert!(stored.get("updated_at").is_some());
        let embedding = stored.get("embedding").and_then(Value::as_array).unwrap();
        assert_eq!(embedding.len(), 16);
        assert!(embedding.iter().any(|v| v.as_f64().unwrap() != 0.0));
    }

    #[tokio::test]
    async fn update_regenerates_embedding_only_on_text_change() {
        let store = store();
        let record = json!({"id": "a", "title": "Build thing", "description": "does stuff"});
        let created = store.create(Table::WorkItem, record).await.unwrap();
        let original_embedding = created.get("embedding").cloned().unwrap();

        let updated = store.update(Table::WorkItem, "a", json!({"status": "ready"})).await.unwrap();
        assert_eq!(updated.get("embedding").cloned().unwrap(), original_embedding);

        let retitled = store.update(Table::WorkItem, "a", json!({"title": "Build other thing"})).await.unwrap();
        assert_ne!(retitled.get("embedding").cloned().unwrap(), original_embedding);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = store();
        let error = store.update(Table::WorkItem, "missing", json!({"status": "ready"})).await.unwrap_err();
        assert!(matches!(error, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_paginates_with_id_tiebreak() {
        let store = store();
        for id in ["c", "a", "b"] {
            store.create(Table::WorkItem, json!({"id": id, "title": "t", "description": "d"})).await.unwrap();
        }
        let page = store
            .list(Table::WorkItem, ListQuery { limit: Some(2), offset: Some(0), ..ListQuery::default() })
            .await
            .unwrap();
        let ids: Vec<&str> = page.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn list_filters_by_equals() {
        let store = store();
        store.create(Table::WorkItem, json!({"id": "a", "title": "t", "description": "d", "status": "ready"})).await.unwrap();
        store.create(Table::WorkItem, json!({"id": "b", "title": "t", "description": "d", "status": "done"})).await.unwrap();
        let page = store
            .list(
                Table::WorkItem,
                ListQuery {
                    filters: vec![Filter::Equals { field: "status".to_owned(), value: json!("done") }],
                    ..ListQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["id"], "b");
    }

    #[tokio::test]
    async fn empty_query_returns_empty_without_error() {
        let store = store();
        store.create(Table::WorkItem, json!({"id": "a", "title": "t", "description": "d"})).await.unwrap();
        let results = store
            .search(Table::WorkItem, SearchQuery { query: String::new(), kind: SearchKind::Vector, limit: 10, filters: Vec::new() })
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn keyword_search_falls_back_to_substring_before_fts_build() {
        let store = store();
        store.create(Table::WorkItem, json!({"id": "a", "title": "Refactor parser", "description": "cleanup"})).await.unwrap();
        let results = store
            .search(Table::WorkItem, SearchQuery { query: "parser".to_owned(), kind: SearchKind::Keyword, limit: 10, filters: Vec::new() })
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn table_nonempty_reflects_inserts() {
        let store = store();
        assert!(!store.table_nonempty(Table::WorkItem).await.unwrap());
        store.create(Table::WorkItem, json!({"id": "a", "title": "t", "description": "d"})).await.unwrap();
        assert!(store.table_nonempty(Table::WorkItem).await.unwrap());
    }
}
