//! `FastEmbed` (local ONNX) embedding provider, feature-gated since it pulls
//! in a model download + ONNX runtime.

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use jive_domain::error::{Error, Result};
use jive_domain::ports::EmbeddingProvider;
use jive_domain::registry::embedding::{EmbeddingProviderConfig, EmbeddingProviderEntry, EMBEDDING_PROVIDERS};
use tokio::sync::Mutex;

/// Wraps a local `fastembed` model. `TextEmbedding::embed` is synchronous
/// and not `Send`-friendly across awaits, so calls are funneled through a
/// `tokio::sync::Mutex` and run via `spawn_blocking`.
pub struct FastEmbedProvider {
    model: std::sync::Arc<Mutex<TextEmbedding>>,
    dimension: usize,
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider").field("dimension", &self.dimension).finish()
    }
}

impl FastEmbedProvider {
    /// Load the default `fastembed` model at construction time. This is the
    /// one provider whose construction can genuinely fail (model load),
    /// matching the port's documented `Error::Embedding` carve-out.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Embedding`] if the model fails to initialize.
    pub fn new() -> Result<Self> {
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .map_err(|e| Error::embedding(format!("failed to load fastembed model: {e}")))?;
        Ok(Self { model: std::sync::Arc::new(Mutex::new(model)), dimension: 384 })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }
        let model = self.model.clone();
        let owned_text = text.to_owned();
        let result = tokio::task::spawn_blocking(move || {
            let mut model = model.blocking_lock();
            model.embed(vec![owned_text], None)
        })
        .await;

        match result {
            Ok(Ok(mut vectors)) if !vectors.is_empty() => Ok(vectors.remove(0)),
            Ok(Ok(_)) => {
                tracing::warn!("fastembed returned no vectors, writing zero vector");
                Ok(vec![0.0; self.dimension])
            }
            Ok(Err(error)) => {
                tracing::warn!(%error, "fastembed inference failed");
                Ok(vec![0.0; self.dimension])
            }
            Err(error) => {
                tracing::warn!(%error, "fastembed blocking task panicked");
                Ok(vec![0.0; self.dimension])
            }
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "fastembed"
    }
}

fn build(_config: &EmbeddingProviderConfig) -> std::result::Result<std::sync::Arc<dyn EmbeddingProvider>, String> {
    FastEmbedProvider::new().map(|p| std::sync::Arc::new(p) as std::sync::Arc<dyn EmbeddingProvider>).map_err(|e| e.to_string())
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static FASTEMBED_EMBEDDING_PROVIDER: EmbeddingProviderEntry =
    EmbeddingProviderEntry { name: "fastembed", description: "Local ONNX embedding model via fastembed", build };
