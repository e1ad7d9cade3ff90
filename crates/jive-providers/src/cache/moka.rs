//! Moka-backed embedding cache, grounded on the teacher's
//! `MokaCacheProvider` (same builder shape, same concurrent-cache crate),
//! narrowed to decorate an [`EmbeddingProvider`] instead of implementing a
//! generic byte-cache port this domain doesn't define.

use std::time::Duration;

use async_trait::async_trait;
use jive_domain::error::Result;
use jive_domain::ports::EmbeddingProvider;
use moka::future::Cache;

/// Wraps any `EmbeddingProvider` with a bounded, TTL-expiring cache keyed by
/// the exact input text. Safe because embeddings are deterministic in their
/// input (spec §3.2 invariant 5) — a cache hit is indistinguishable from a
/// fresh call.
pub struct CachingEmbeddingProvider {
    inner: std::sync::Arc<dyn EmbeddingProvider>,
    cache: Cache<String, Vec<f32>>,
}

impl CachingEmbeddingProvider {
    /// Wrap `inner`, caching up to `max_entries` vectors for `ttl`.
    #[must_use]
    pub fn new(inner: std::sync::Arc<dyn EmbeddingProvider>, max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(max_entries).time_to_live(ttl).build();
        Self { inner, cache }
    }
}

impl std::fmt::Debug for CachingEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingEmbeddingProvider")
            .field("inner", &self.inner.provider_name())
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl EmbeddingProvider for CachingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if let Some(cached) = self.cache.get(text).await {
            return Ok(cached);
        }
        let vector = self.inner.embed(text).await?;
        self.cache.insert(text.to_owned(), vector.clone()).await;
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }

    fn provider_name(&self) -> &'static str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[derive(Debug)]
    struct CountingProvider(AtomicUsize);

    #[async_trait]
    impl EmbeddingProvider for CountingProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![1.0, 2.0, 3.0])
        }

        fn dimension(&self) -> usize {
            3
        }

        fn provider_name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let inner = Arc::new(CountingProvider(AtomicUsize::new(0)));
        let cached = CachingEmbeddingProvider::new(inner.clone(), 10, Duration::from_secs(60));

        cached.embed("hello world").await.unwrap();
        cached.embed("hello world").await.unwrap();
        assert_eq!(inner.0.load(Ordering::SeqCst), 1);
    }
}
