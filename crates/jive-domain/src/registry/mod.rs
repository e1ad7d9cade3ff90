//! Provider auto-registration registry (compile-time, via `linkme`).

/// `EmbeddingProvider` registry.
pub mod embedding;

pub use embedding::{
    EMBEDDING_PROVIDERS, EmbeddingProviderConfig, EmbeddingProviderEntry,
    list_embedding_providers, resolve_embedding_provider,
};
