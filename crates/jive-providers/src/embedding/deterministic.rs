//! Deterministic, dependency-free default embedding provider.
//!
//! Hashes overlapping word shingles into a fixed-dimension vector so the
//! Store has a usable vector space without any external model — the
//! default the teacher's registry pattern expects every provider family to
//! have (`embedding-ollama` is this crate's default *feature*, but a
//! zero-config fallback should never require a reachable server).

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use jive_domain::error::Result;
use jive_domain::ports::EmbeddingProvider;
use jive_domain::registry::embedding::{EmbeddingProviderConfig, EmbeddingProviderEntry, EMBEDDING_PROVIDERS};

use crate::constants::EMBEDDING_DIMENSION;

/// Deterministic in `(title, description)` per spec §3.2 invariant 5,
/// without calling out to any model.
#[derive(Debug, Clone)]
pub struct DeterministicEmbeddingProvider {
    dimension: usize,
}

impl DeterministicEmbeddingProvider {
    /// Build a provider producing vectors of `dimension` length.
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for DeterministicEmbeddingProvider {
    fn default() -> Self {
        Self::new(EMBEDDING_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for DeterministicEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }
        let mut vector = vec![0.0f32; self.dimension];
        for word in text.split_whitespace() {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() as usize) % self.dimension;
            vector[bucket] += 1.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "deterministic"
    }
}

fn build(config: &EmbeddingProviderConfig) -> std::result::Result<std::sync::Arc<dyn EmbeddingProvider>, String> {
    let dimension = config
        .extra
        .get("dimension")
        .map(|raw| raw.parse::<usize>().map_err(|e| format!("invalid dimension: {e}")))
        .transpose()?
        .unwrap_or(EMBEDDING_DIMENSION);
    Ok(std::sync::Arc::new(DeterministicEmbeddingProvider::new(dimension)))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static DETERMINISTIC_EMBEDDING_PROVIDER: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "deterministic",
    description: "Hash-based deterministic embedding, no external model required",
    build,
};
