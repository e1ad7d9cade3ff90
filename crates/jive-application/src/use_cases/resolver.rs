//! Maps a free-form identifier string to a canonical `WorkItem` id (spec §4.2).

use std::cmp::Ordering;
use std::sync::Arc;

use jive_domain::constants::RESOLVER_KEYWORD_LIMIT;
use jive_domain::entities::WorkItem;
use jive_domain::error::Result;
use jive_domain::ports::{SearchKind, Store, Table};
use jive_domain::value_objects::{SearchQuery, WorkItemId};

/// Resolves free-form identifiers (UUID, exact title, keyword phrase) to a
/// canonical `WorkItem` id. Three stages, first success wins; never fails
/// for unresolvable input — it returns `None` instead.
#[derive(Debug, Clone)]
pub struct Resolver {
    store: Arc<dyn Store>,
}

impl Resolver {
    /// Build a resolver over the given Store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Resolve `identifier` to a canonical id, or `None` if no stage matches.
    ///
    /// # Errors
    ///
    /// Propagates Store read failures; never fails for an unresolvable but
    /// otherwise valid identifier.
    pub async fn resolve(&self, identifier: &str) -> Result<Option<WorkItemId>> {
        if let Some(id) = self.resolve_uuid(identifier).await? {
            return Ok(Some(id));
        }
        if let Some(id) = self.resolve_exact_title(identifier).await? {
            return Ok(Some(id));
        }
        self.resolve_keyword(identifier).await
    }

    async fn resolve_uuid(&self, identifier: &str) -> Result<Option<WorkItemId>> {
        let Ok(id) = identifier.parse::<WorkItemId>() else {
            return Ok(None);
        };
        let found = self.store.get(Table::WorkItem, &id.to_string()).await?;
        Ok(found.map(|_| id))
    }

    async fn resolve_exact_title(&self, identifier: &str) -> Result<Option<WorkItemId>> {
        let candidates = self.keyword_search(identifier, RESOLVER_KEYWORD_LIMIT).await?;
        let target = identifier.trim().to_lowercase();
        let mut matches: Vec<WorkItem> = candidates
            .into_iter()
            .map(|(item, _score)| item)
            .filter(|item| item.title.trim().to_lowercase() == target)
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(Some(matches.remove(0).id)),
            _ => {
                // Largest updated_at wins; ties by larger created_at, then by
                // lexicographically smaller id (spec §4.2 stage 2).
                matches.sort_by(|a, b| {
                    b.updated_at
                        .cmp(&a.updated_at)
                        .then_with(|| b.created_at.cmp(&a.created_at))
                        .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
                });
                Ok(Some(matches.remove(0).id))
            }
        }
    }

    async fn resolve_keyword(&self, identifier: &str) -> Result<Option<WorkItemId>> {
        let candidates = self.keyword_search(identifier, RESOLVER_KEYWORD_LIMIT).await?;
        let needle = identifier.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(None);
        }

        let scored: Vec<(WorkItemId, f64)> = candidates
            .into_iter()
            .map(|(item, relevance)| {
                let title_hit = f64::from(u8::from(item.title.to_lowercase().contains(&needle)));
                let description_hit =
                    f64::from(u8::from(item.description.to_lowercase().contains(&needle)));
                let score = 10.0 * title_hit + 5.0 * description_hit + 2.0 * relevance;
                (item.id, score)
            })
            .collect();

        let Some(&(best_id, best_score)) = scored
            .iter()
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        else {
            return Ok(None);
        };
        if best_score <= 0.0 {
            return Ok(None);
        }
        let winners = scored
            .iter()
            .filter(|(_, score)| (*score - best_score).abs() < f64::EPSILON)
            .count();
        Ok((winners == 1).then_some(best_id))
    }

    /// Keyword search over `WorkItem`, returning each hit with its raw
    /// relevance score. Empty queries never reach the Store (spec §8: empty
    /// query returns an empty list, not an error).
    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<(WorkItem, f64)>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let results = self
            .store
            .search(
                Table::WorkItem,
                SearchQuery {
                    query: query.to_owned(),
                    kind: SearchKind::Keyword,
                    limit,
                    filters: Vec::new(),
                },
            )
            .await?;
        results
            .into_iter()
            .map(|r| Ok((serde_json::from_value::<WorkItem>(r.record)?, r.score)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, Utc};
    use jive_domain::entities::{Priority, WorkItemStatus, WorkItemType};
    use jive_domain::ports::Table;

    use super::*;
    use crate::test_support::InMemoryStore;

    fn work_item(id: WorkItemId, title: &str, updated_at: chrono::DateTime<Utc>) -> WorkItem {
        WorkItem {
            id,
            item_type: WorkItemType::Epic,
            title: title.to_owned(),
            description: String::new(),
            status: WorkItemStatus::Ready,
            priority: Priority::Medium,
            complexity: None,
            parent_id: None,
            dependencies: Vec::new(),
            acceptance_criteria: Vec::new(),
            progress_percentage: 0,
            tags: Default::default(),
            metadata: Default::default(),
            created_at: updated_at,
            updated_at,
            embedding: Vec::new(),
        }
    }

    #[tokio::test]
    async fn resolves_uuid_when_present() {
        let store = Arc::new(InMemoryStore::new());
        let id = WorkItemId::new();
        let item = work_item(id, "E-commerce Platform Modernization", Utc::now());
        store.seed(Table::WorkItem, id.to_string(), serde_json::to_value(&item).unwrap());

        let resolver = Resolver::new(store);
        assert_eq!(resolver.resolve(&id.to_string()).await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn unresolvable_identifier_returns_none_not_error() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = Resolver::new(store);
        assert!(resolver.resolve("nothing matches this").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tie_break_prefers_larger_updated_at() {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        let first = WorkItemId::new();
        let second = WorkItemId::new();
        let item1 = work_item(first, "Migration", now);
        let item2 = work_item(second, "Migration", now + Duration::seconds(1));
        store.seed(Table::WorkItem, first.to_string(), serde_json::to_value(&item1).unwrap());
        store.seed(Table::WorkItem, second.to_string(), serde_json::to_value(&item2).unwrap());

        let resolver = Resolver::new(store.clone());
        assert_eq!(resolver.resolve("Migration").await.unwrap(), Some(second));

        // Touch the first item's updated_at to a later time; it should now win.
        let mut bumped = item1.clone();
        bumped.updated_at = now + Duration::seconds(2);
        store.seed(Table::WorkItem, first.to_string(), serde_json::to_value(&bumped).unwrap());
        assert_eq!(resolver.resolve("Migration").await.unwrap(), Some(first));
    }
}
