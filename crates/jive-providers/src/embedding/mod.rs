//! `EmbeddingProvider` implementations, registered via
//! [`jive_domain::registry::embedding`] the same way the teacher registers
//! its embedding/vector-store/cache providers (`linkme` distributed slices).

mod deterministic;
#[cfg(feature = "embedding-fastembed")]
mod fastembed_provider;
mod ollama;

pub use deterministic::DeterministicEmbeddingProvider;
#[cfg(feature = "embedding-fastembed")]
pub use fastembed_provider::FastEmbedProvider;
pub use ollama::OllamaEmbeddingProvider;
