//! The `EmbeddingProvider` port — derives a fixed-dimension vector from text
//! (spec §4.1 embedding contract).

use async_trait::async_trait;

use crate::error::Result;

/// Produces embeddings for the Store's `embedding` column. Implementations
/// must return a zero vector of [`EmbeddingProvider::dimension`] length for
/// empty input (spec §8 boundary behavior) and should return a zero vector
/// — not an error — on internal failure, logging the incident instead
/// (spec §4.1 embedding contract).
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Embed `text`. Never fails the caller's write: implementations that
    /// hit an internal error should log it and return `Ok(zero_vector)`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Embedding`] only for configuration
    /// errors that make the provider entirely unusable (e.g. the model
    /// failed to load at construction time); per-call failures degrade to a
    /// zero vector instead.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The fixed output dimension `D` this provider produces.
    fn dimension(&self) -> usize;

    /// Name of the concrete provider, for logging and diagnostics.
    fn provider_name(&self) -> &'static str;
}
