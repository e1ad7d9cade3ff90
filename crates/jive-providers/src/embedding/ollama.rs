//! Ollama HTTP-backed embedding provider.

use async_trait::async_trait;
use jive_domain::error::Result;
use jive_domain::ports::EmbeddingProvider;
use jive_domain::registry::embedding::{EmbeddingProviderConfig, EmbeddingProviderEntry, EMBEDDING_PROVIDERS};
use serde::Deserialize;

use crate::constants::{OLLAMA_DEFAULT_BASE_URL, OLLAMA_DEFAULT_MODEL, OLLAMA_EMBED_ENDPOINT};

/// Calls a local (or remote) Ollama server's `/api/embed` endpoint.
#[derive(Debug)]
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbeddingProvider {
    /// Build a provider against `base_url` using `model`, expecting
    /// `dimension`-length vectors back.
    #[must_use]
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into(), model: model.into(), dimension }
    }
}

impl Default for OllamaEmbeddingProvider {
    fn default() -> Self {
        Self::new(OLLAMA_DEFAULT_BASE_URL, OLLAMA_DEFAULT_MODEL, crate::constants::EMBEDDING_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }
        let url = format!("{}{}", self.base_url, OLLAMA_EMBED_ENDPOINT);
        let result = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "model": self.model, "input": text }))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(response) => match response.json::<EmbedResponse>().await {
                Ok(body) => match body.embeddings.into_iter().next() {
                    Some(vector) => Ok(vector),
                    None => {
                        tracing::warn!("ollama returned no embeddings, writing zero vector");
                        Ok(vec![0.0; self.dimension])
                    }
                },
                Err(error) => {
                    tracing::warn!(%error, "failed to parse ollama embedding response");
                    Ok(vec![0.0; self.dimension])
                }
            },
            Err(error) => {
                tracing::warn!(%error, "ollama embedding request failed");
                Ok(vec![0.0; self.dimension])
            }
        }
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &'static str {
        "ollama"
    }
}

fn build(config: &EmbeddingProviderConfig) -> std::result::Result<std::sync::Arc<dyn EmbeddingProvider>, String> {
    let base_url = config.base_url.clone().unwrap_or_else(|| OLLAMA_DEFAULT_BASE_URL.to_owned());
    let model = config.model.clone().unwrap_or_else(|| OLLAMA_DEFAULT_MODEL.to_owned());
    let dimension = config
        .extra
        .get("dimension")
        .map(|raw| raw.parse::<usize>().map_err(|e| format!("invalid dimension: {e}")))
        .transpose()?
        .unwrap_or(crate::constants::EMBEDDING_DIMENSION);
    Ok(std::sync::Arc::new(OllamaEmbeddingProvider::new(base_url, model, dimension)))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static OLLAMA_EMBEDDING_PROVIDER: EmbeddingProviderEntry =
    EmbeddingProviderEntry { name: "ollama", description: "Ollama-hosted embedding model over HTTP", build };
