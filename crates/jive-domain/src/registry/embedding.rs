//! Compile-time auto-registration for `EmbeddingProvider` implementations.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Configuration for resolving an `EmbeddingProvider` from the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EmbeddingProviderConfig {
    /// Registered provider name (`"deterministic"`, `"ollama"`, `"fastembed"`).
    pub provider: String,
    /// Model name/identifier, provider-specific.
    pub model: Option<String>,
    /// Base URL for HTTP-backed providers (e.g. Ollama).
    pub base_url: Option<String>,
    /// Whether to L2-normalize vectors before returning them (spec §6.4
    /// `normalize_embeddings`).
    pub normalize: Option<bool>,
    /// Provider-specific key/value overrides.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(EmbeddingProviderConfig {
    /// Set the model name.
    model: with_model(into String),
    /// Set the base URL for HTTP-backed providers.
    base_url: with_base_url(into String),
    /// Set whether to L2-normalize embeddings before returning them.
    normalize: with_normalize(bool),
});

crate::impl_registry! {
    provider_trait: crate::ports::EmbeddingProvider,
    config_type: EmbeddingProviderConfig,
    entry_type: EmbeddingProviderEntry,
    slice_name: EMBEDDING_PROVIDERS,
    resolve_fn: resolve_embedding_provider,
    list_fn: list_embedding_providers
}
