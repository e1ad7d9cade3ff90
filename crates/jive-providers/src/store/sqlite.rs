//! Optional SQLite persistence for the Store (spec §6.3 persisted state is
//! optional; spec §3.3 "persistence is optional").
//!
//! Grounded on the teacher's `database/sqlite/provider.rs` connect-and-
//! apply-DDL factory shape, simplified to the one generic schema this core
//! needs: every table's records as an opaque JSON blob keyed by id, since
//! the Store's tables are fixed and schema-less from the persistence
//! layer's point of view. All query logic (filters, sort, search) is
//! delegated to an in-memory mirror kept in sync on every write — this is a
//! write-through cache over SQLite, not a SQL query engine.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use jive_domain::error::{Error, Result};
use jive_domain::ports::{EmbeddingProvider, Store, Table};
use jive_domain::value_objects::{ListQuery, SearchQuery, SearchResult};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use super::InMemoryStore;

/// SQLite-persisted Store: an [`InMemoryStore`] mirror plus a write-through
/// `records(table, id, data)` table.
#[derive(Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
    mirror: InMemoryStore,
}

impl SqliteStore {
    /// Connect to (creating if absent) the SQLite file at `path`, apply the
    /// schema, and hydrate the in-memory mirror from any existing rows.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreIo`] if the connection or schema setup fails.
    pub async fn connect(path: &Path, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| Error::store_with_source("failed to open sqlite store", e))?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS records (
                table_name TEXT NOT NULL,
                id TEXT NOT NULL,
                data TEXT NOT NULL,
                PRIMARY KEY (table_name, id)
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| Error::store_with_source("failed to create sqlite schema", e))?;

        let mirror = InMemoryStore::new(embedder);
        let rows = sqlx::query("SELECT table_name, id, data FROM records")
            .fetch_all(&pool)
            .await
            .map_err(|e| Error::store_with_source("failed to hydrate sqlite store", e))?;
        for row in rows {
            let table_name: String = row.try_get("table_name").map_err(|e| Error::store_with_source("corrupt row", e))?;
            let data: String = row.try_get("data").map_err(|e| Error::store_with_source("corrupt row", e))?;
            if let Some(table) = parse_table(&table_name) {
                if let Ok(value) = serde_json::from_str::<Value>(&data) {
                    mirror.hydrate(table, value).await;
                }
            }
        }

        Ok(Self { pool, mirror })
    }

    async fn persist(&self, table: Table, id: &str, record: &Value) -> Result<()> {
        let data = serde_json::to_string(record)?;
        sqlx::query(
            "INSERT INTO records (table_name, id, data) VALUES (?1, ?2, ?3)
             ON CONFLICT(table_name, id) DO UPDATE SET data = excluded.data",
        )
        .bind(table.as_str())
        .bind(id)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::store_with_source("sqlite write failed", e))?;
        Ok(())
    }

    async fn remove(&self, table: Table, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM records WHERE table_name = ?1 AND id = ?2")
            .bind(table.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| Error::store_with_source("sqlite delete failed", e))?;
        Ok(())
    }
}

fn parse_table(name: &str) -> Option<Table> {
    use std::str::FromStr;
    Table::from_str(name).ok()
}

#[async_trait]
impl Store for SqliteStore {
    async fn create(&self, table: Table, record: Value) -> Result<Value> {
        let stored = self.mirror.create(table, record).await?;
        let id = stored.get("id").and_then(Value::as_str).ok_or_else(|| Error::validation("record is missing \"id\""))?;
        self.persist(table, id, &stored).await?;
        Ok(stored)
    }

    async fn update(&self, table: Table, id: &str, partial: Value) -> Result<Value> {
        let stored = self.mirror.update(table, id, partial).await?;
        self.persist(table, id, &stored).await?;
        Ok(stored)
    }

    async fn get(&self, table: Table, id: &str) -> Result<Option<Value>> {
        self.mirror.get(table, id).await
    }

    async fn delete(&self, table: Table, id: &str) -> Result<bool> {
        let removed = self.mirror.delete(table, id).await?;
        if removed {
            self.remove(table, id).await?;
        }
        Ok(removed)
    }

    async fn list(&self, table: Table, query: ListQuery) -> Result<Vec<Value>> {
        self.mirror.list(table, query).await
    }

    async fn search(&self, table: Table, query: SearchQuery) -> Result<Vec<SearchResult>> {
        self.mirror.search(table, query).await
    }

    async fn table_nonempty(&self, table: Table) -> Result<bool> {
        self.mirror.table_nonempty(table).await
    }

    fn provider_name(&self) -> &'static str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map_err(|e| Error::store_with_source("sqlite health check failed", e))?;
        Ok(())
    }
}
