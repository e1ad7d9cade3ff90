//! The `Store` port — a typed, embedded document store with vector,
//! keyword, and hybrid search (spec §4.1). Every other component treats an
//! implementation of this trait as a black box.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::value_objects::{ListQuery, SearchQuery, SearchResult};

define_string_enum! {
    /// The fixed set of tables the Store exposes (spec §4.1).
    pub enum Table {
        WorkItem => "work_item",
        Task => "task",
        SearchIndex => "search_index",
        ExecutionLog => "execution_log",
        Dependency => "dependency",
    }
}

/// A typed, embedded document store. Tables are lazily created on first
/// access; each has a fixed schema with one `embedding` column of dimension
/// `D` (spec §4.1).
#[async_trait]
pub trait Store: Send + Sync + std::fmt::Debug {
    /// Validate schema, derive the embedding from the table's designated
    /// text fields, stamp `created_at = updated_at = now()` if missing, and
    /// insert. Returns the stored record (including assigned timestamps and
    /// embedding).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Validation`] on schema violation,
    /// [`crate::error::Error::StoreIo`] after the write retry budget is
    /// exhausted.
    async fn create(&self, table: Table, record: Value) -> Result<Value>;

    /// Merge `partial` into the existing record, bump `updated_at`, and
    /// regenerate the embedding iff a designated text field changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotFound`] if `id` does not exist in
    /// `table`, [`crate::error::Error::StoreIo`] after retries are exhausted.
    async fn update(&self, table: Table, id: &str, partial: Value) -> Result<Value>;

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StoreIo`] on a read failure.
    async fn get(&self, table: Table, id: &str) -> Result<Option<Value>>;

    /// Delete a record by id. Returns `true` iff a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StoreIo`] on a write failure.
    async fn delete(&self, table: Table, id: &str) -> Result<bool>;

    /// List records matching `query`'s filters, sorted and paginated with
    /// stable tie-break (ties broken by `id` ascending).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StoreIo`] on a read failure.
    async fn list(&self, table: Table, query: ListQuery) -> Result<Vec<Value>>;

    /// Run a vector, keyword, or hybrid search (spec §4.1). An empty query
    /// string returns an empty result list, never an error.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::NotFound`] for an unknown table name,
    /// [`crate::error::Error::StoreIo`] on a read failure.
    async fn search(&self, table: Table, query: SearchQuery) -> Result<Vec<SearchResult>>;

    /// `true` iff `table` currently has at least one record (used to decide
    /// whether to lazily build the FTS index for keyword search).
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StoreIo`] on a read failure.
    async fn table_nonempty(&self, table: Table) -> Result<bool>;

    /// Name of the concrete provider, for logging and diagnostics.
    fn provider_name(&self) -> &'static str;

    /// Cheap liveness check; default implementation always succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::StoreIo`] if the backing store is
    /// unreachable.
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
