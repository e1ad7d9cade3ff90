//! # Providers Layer
//!
//! Concrete implementations of the domain's [`jive_domain::ports`] traits:
//! the Store (C1, spec §4.1) and its embedding providers, plus the
//! in-process cache that decorates them.
//!
//! ## Providers
//!
//! | Kind | Implementation | Registration |
//! |------|-----------------|--------------|
//! | `Store` | [`store::InMemoryStore`], optional [`store::sqlite`] persistence | constructed directly, not registry-resolved |
//! | `EmbeddingProvider` | [`embedding::DeterministicEmbeddingProvider`], [`embedding::OllamaEmbeddingProvider`], `fastembed` (feature-gated) | `jive_domain::registry::embedding` (`linkme`) |
//! | Embedding cache | [`cache::CachingEmbeddingProvider`] | decorator, not registry-resolved |
//!
//! Depends only on [`jive_domain`]'s ports and [`jive_utils`]; never on the
//! application or server layers (Clean Architecture).

/// Caching decorator for `EmbeddingProvider`s.
pub mod cache;
/// Tunables shared across providers.
pub mod constants;
/// `EmbeddingProvider` implementations.
pub mod embedding;
/// `Store` implementations.
pub mod store;

pub use cache::CachingEmbeddingProvider;
pub use embedding::{DeterministicEmbeddingProvider, OllamaEmbeddingProvider};
#[cfg(feature = "embedding-fastembed")]
pub use embedding::FastEmbedProvider;
pub use store::InMemoryStore;
#[cfg(feature = "memory-sqlite")]
pub use store::sqlite::SqliteStore;
