//! In-process caching, kept from the teacher's `cache::moka` provider and
//! repurposed as an embedding-result cache: the Store's embedding contract
//! already lets a provider answer from cache as long as it stays
//! deterministic in the input text (spec §3.2 invariant 5).

mod moka;

pub use moka::CachingEmbeddingProvider;
