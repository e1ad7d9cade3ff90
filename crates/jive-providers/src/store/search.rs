//! Vector, keyword, and hybrid search (spec §4.1).

use jive_domain::error::Result;
use jive_domain::ports::Table;
use jive_domain::value_objects::{Filter, SearchQuery, SearchResult};
use serde_json::Value;

use super::{tokenize, InMemoryStore, TableData};

fn apply_filters<'a>(records: &'a [(String, Value)], filters: &[Filter]) -> Vec<&'a (String, Value)> {
    records.iter().filter(|(_, record)| filters.iter().all(|filter| filter.matches(record))).collect()
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    f64::from(dot / (norm_a * norm_b))
}

pub(super) async fn vector_search(store: &InMemoryStore, table: Table, query: &SearchQuery) -> Result<Vec<SearchResult>> {
    let Some(records) = store.read_table(table).await else {
        return Ok(Vec::new());
    };
    let candidates = apply_filters(&records, &query.filters);
    let query_embedding = store.embed_query(&query.query).await;

    let mut scored: Vec<SearchResult> = candidates
        .into_iter()
        .map(|(_, record)| {
            let embedding: Vec<f32> = record
                .get("embedding")
                .and_then(Value::as_array)
                .map(|values| values.iter().filter_map(Value::as_f64).map(|v| v as f32).collect())
                .unwrap_or_default();
            SearchResult { record: record.clone(), score: cosine_similarity(&query_embedding, &embedding) }
        })
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(query.limit);
    Ok(scored)
}

fn designated_text_contains(record: &Value, needle: &str) -> bool {
    InMemoryStore::designated_text(record).to_lowercase().contains(needle)
}

pub(super) fn keyword_search(data: Option<&TableData>, query: &SearchQuery) -> Vec<SearchResult> {
    let Some(data) = data else {
        return Vec::new();
    };
    let query_tokens = tokenize(&query.query);
    if query_tokens.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<SearchResult> = if data.fts_built {
        let mut hits: std::collections::HashMap<&String, usize> = std::collections::HashMap::new();
        for token in &query_tokens {
            if let Some(ids) = data.fts_index.get(token) {
                for id in ids {
                    *hits.entry(id).or_insert(0) += 1;
                }
            }
        }
        hits.into_iter()
            .filter_map(|(id, count)| {
                data.records.get(id).map(|record| SearchResult { record: record.clone(), score: count as f64 })
            })
            .filter(|result| query.filters.iter().all(|filter| filter.matches(&result.record)))
            .collect()
    } else {
        let needle = query.query.to_lowercase();
        data.records
            .values()
            .filter(|record| designated_text_contains(record, &needle))
            .filter(|record| query.filters.iter().all(|filter| filter.matches(record)))
            .map(|record| SearchResult { record: record.clone(), score: 1.0 })
            .collect()
    };

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(query.limit);
    scored
}

/// Runs both strategies at `limit/2` each and merges by id, preserving
/// first-seen order, capped at `limit` (spec §4.1).
pub(super) async fn hybrid_search(store: &InMemoryStore, table: Table, query: &SearchQuery) -> Result<Vec<SearchResult>> {
    let half = (query.limit / 2).max(1);
    let vector_results = vector_search(store, table, &SearchQuery { limit: half, ..query.clone() }).await?;
    let keyword_results = {
        let tables = store.tables.read().await;
        keyword_search(tables.get(&table), &SearchQuery { limit: half, ..query.clone() })
    };

    let mut merged = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for result in vector_results.into_iter().chain(keyword_results) {
        if let Some(id) = result.record.get("id").and_then(Value::as_str) {
            if seen.insert(id.to_owned()) {
                merged.push(result);
            }
        }
        if merged.len() >= query.limit {
            break;
        }
    }
    merged.truncate(query.limit);
    Ok(merged)
}
