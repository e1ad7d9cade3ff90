//! Search and query value objects shared by the Store port and its callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

define_string_enum! {
    /// The retrieval strategy for `Store::search` (spec §4.1).
    pub enum SearchKind {
        Vector => "vector",
        Keyword => "keyword",
        Hybrid => "hybrid",
    }
}

define_string_enum! {
    /// Ascending or descending sort for `Store::list`.
    pub enum SortOrder {
        Asc => "asc",
        Desc => "desc",
    }
}

/// A single `field = value` or `field IN (values)` filter for `Store::list`.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Filter {
    /// Field equals a scalar value.
    Equals {
        /// Field name.
        field: String,
        /// Expected value.
        value: Value,
    },
    /// Field's value is a member of the given set.
    In {
        /// Field name.
        field: String,
        /// Accepted values.
        values: Vec<Value>,
    },
}

impl Filter {
    /// True if `record[self.field]` satisfies this filter.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        match self {
            Self::Equals { field, value } => record.get(field) == Some(value),
            Self::In { field, values } => record
                .get(field)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
        }
    }
}

/// Pagination and ordering parameters for `Store::list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListQuery {
    /// Field-equals / field-in-set filters, all ANDed together.
    pub filters: Vec<Filter>,
    /// Field to sort by. `None` sorts by `id` ascending only.
    pub sort_by: Option<String>,
    /// Sort direction when `sort_by` is set.
    pub sort_order: Option<SortOrder>,
    /// Maximum number of records to return.
    pub limit: Option<usize>,
    /// Number of records to skip before collecting `limit`.
    pub offset: Option<usize>,
}

/// A search request against a Store table.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchQuery {
    /// Free-form query text.
    pub query: String,
    /// Retrieval strategy.
    pub kind: SearchKind,
    /// Maximum number of results.
    pub limit: usize,
    /// Additional field filters applied before/after retrieval.
    pub filters: Vec<Filter>,
}

/// One scored result from `Store::search`.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SearchResult {
    /// The matched record, verbatim.
    pub record: Value,
    /// Relevance score; comparable only within the same search call.
    pub score: f64,
}

/// Extra metadata attached to a tool response when a call spans mixed
/// status vocabularies (SPEC_FULL §11.1).
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Warnings {
    /// Human-readable warning messages, one per affected table scan.
    pub warnings: Vec<String>,
}

/// Opaque key/value metadata carried by several entities.
pub type Metadata = BTreeMap<String, Value>;
