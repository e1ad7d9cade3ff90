//! Shared async `Store`/`EmbeddingProvider` test doubles.
//!
//! Linear-scan, substring-search, no real vector similarity — just enough to
//! exercise use-case logic in isolation from any real persistence backend.

#![cfg(test)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use jive_domain::ports::{EmbeddingProvider, SearchKind, Store, Table};
use jive_domain::value_objects::{ListQuery, SearchQuery, SearchResult};
use jive_domain::{Error, Result};
use serde_json::Value;

/// A trivial in-memory `Store` double.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<HashMap<Table, HashMap<String, Value>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record directly, bypassing `create`'s id-from-field lookup.
    pub fn seed(&self, table: Table, id: impl Into<String>, record: Value) {
        self.lock().entry(table).or_default().insert(id.into(), record);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Table, HashMap<String, Value>>> {
        self.tables.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create(&self, table: Table, record: Value) -> Result<Value> {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::validation("record missing id"))?
            .to_owned();
        self.lock().entry(table).or_default().insert(id, record.clone());
        Ok(record)
    }

    async fn update(&self, table: Table, id: &str, partial: Value) -> Result<Value> {
        let mut tables = self.lock();
        let existing = tables
            .entry(table)
            .or_default()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{table:?}/{id}")))?;
        let mut merged = existing;
        if let (Value::Object(base), Value::Object(patch)) = (&mut merged, &partial) {
            for (k, v) in patch {
                base.insert(k.clone(), v.clone());
            }
        }
        tables.entry(table).or_default().insert(id.to_owned(), merged.clone());
        Ok(merged)
    }

    async fn get(&self, table: Table, id: &str) -> Result<Option<Value>> {
        Ok(self.lock().get(&table).and_then(|t| t.get(id)).cloned())
    }

    async fn delete(&self, table: Table, id: &str) -> Result<bool> {
        Ok(self.lock().get_mut(&table).is_some_and(|t| t.remove(id).is_some()))
    }

    async fn list(&self, table: Table, query: ListQuery) -> Result<Vec<Value>> {
        let tables = self.lock();
        let mut records: Vec<Value> = tables
            .get(&table)
            .into_iter()
            .flat_map(|t| t.values().cloned())
            .filter(|record| query.filters.iter().all(|f| f.matches(record)))
            .collect();
        records.sort_by(|a, b| {
            a.get("id")
                .and_then(Value::as_str)
                .cmp(&b.get("id").and_then(Value::as_str))
        });
        if let Some(offset) = query.offset {
            records = records.into_iter().skip(offset).collect();
        }
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    async fn search(&self, table: Table, query: SearchQuery) -> Result<Vec<SearchResult>> {
        if query.query.trim().is_empty() || matches!(query.kind, SearchKind::Vector) {
            return Ok(Vec::new());
        }
        let needle = query.query.to_lowercase();
        let tables = self.lock();
        let results: Vec<SearchResult> = tables
            .get(&table)
            .into_iter()
            .flat_map(|t| t.values().cloned())
            .filter_map(|record| {
                let haystack = format!(
                    "{} {}",
                    record.get("title").and_then(Value::as_str).unwrap_or_default(),
                    record
                        .get("description")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                )
                .to_lowercase();
                haystack
                    .contains(&needle)
                    .then_some(SearchResult { record, score: 1.0 })
            })
            .take(query.limit)
            .collect();
        Ok(results)
    }

    async fn table_nonempty(&self, table: Table) -> Result<bool> {
        Ok(self.lock().get(&table).is_some_and(|t| !t.is_empty()))
    }

    fn provider_name(&self) -> &'static str {
        "in_memory_test_double"
    }
}

/// A trivial embedding provider double: zero vector for empty text, a
/// constant vector otherwise. Never fails.
#[derive(Debug, Default)]
pub struct NullEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for NullEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimension()]);
        }
        #[allow(clippy::cast_precision_loss)]
        Ok(vec![text.len() as f32; self.dimension()])
    }

    fn dimension(&self) -> usize {
        jive_domain::constants::EMBEDDING_DIM
    }

    fn provider_name(&self) -> &'static str {
        "null_test_double"
    }
}
