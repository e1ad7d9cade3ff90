//! Explicit composition root (SPEC_FULL §9, §12): wires the Store and
//! embedding provider selected by [`Config`] into the application layer's
//! use cases.
//!
//! No `dill`-style IoC container or runtime provider swapping — providers
//! are resolved once, at process bootstrap, from `jive_domain`'s `linkme`
//! registry, and handed to the use cases as plain `Arc`s.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use jive_application::{DependencyEngine, ExecutorDriver, HierarchyManager, Orchestrator, Resolver, SyncEngine};
use jive_domain::error::Result;
use jive_domain::ports::{EmbeddingProvider, Store};
use jive_domain::registry::embedding::{resolve_embedding_provider, EmbeddingProviderConfig};
use jive_providers::cache::CachingEmbeddingProvider;
use jive_providers::store::InMemoryStore;
#[cfg(feature = "memory-sqlite")]
use jive_providers::store::sqlite::SqliteStore;

use crate::config::Config;

/// Default embedding cache capacity: generous enough that re-syncing a
/// work item's unchanged text never re-embeds it within a session.
const EMBEDDING_CACHE_ENTRIES: u64 = 10_000;
const EMBEDDING_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Every component a tool handler needs, wired once at startup.
pub struct Core {
    pub store: Arc<dyn Store>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub resolver: Resolver,
    pub dependency_engine: DependencyEngine,
    pub hierarchy: HierarchyManager,
    pub sync_engine: Arc<SyncEngine>,
    pub orchestrator: Arc<Orchestrator>,
    pub executor_driver: Arc<ExecutorDriver>,
}

impl Core {
    /// Resolve the configured embedding provider, build the configured
    /// Store backend, and wire every use case over them.
    ///
    /// # Errors
    ///
    /// Returns [`jive_domain::error::Error::Config`] if `config.embedding_model`
    /// names an unregistered provider, or propagates Store connection
    /// failures (e.g. an unwritable `data_path` for the SQLite backend).
    pub async fn bootstrap(config: &Config) -> Result<Self> {
        let embedder = build_embedder(config)?;
        let store = build_store(config, embedder.clone()).await?;

        let resolver = Resolver::new(store.clone());
        let dependency_engine = DependencyEngine::new(store.clone());
        let hierarchy = HierarchyManager::new(store.clone());
        let sync_engine = Arc::new(SyncEngine::new(store.clone()));
        let executor_driver = Arc::new(ExecutorDriver::new(store.clone()));
        let orchestrator = Arc::new(Orchestrator::new(
            store.clone(),
            Resolver::new(store.clone()),
            HierarchyManager::new(store.clone()),
            DependencyEngine::new(store.clone()),
            sync_engine.clone(),
        ));

        Ok(Self {
            store,
            embedder,
            resolver,
            dependency_engine,
            hierarchy,
            sync_engine,
            orchestrator,
            executor_driver,
        })
    }
}

fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    let provider_config = EmbeddingProviderConfig {
        provider: config.embedding_model.clone(),
        normalize: Some(config.normalize_embeddings),
        ..Default::default()
    };
    let base = resolve_embedding_provider(&provider_config)?;
    Ok(Arc::new(CachingEmbeddingProvider::new(base, EMBEDDING_CACHE_ENTRIES, EMBEDDING_CACHE_TTL)))
}

#[cfg(feature = "memory-sqlite")]
async fn build_store(config: &Config, embedder: Arc<dyn EmbeddingProvider>) -> Result<Arc<dyn Store>> {
    let store = SqliteStore::connect(Path::new(&config.data_path), embedder).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "memory-sqlite"))]
async fn build_store(_config: &Config, embedder: Arc<dyn EmbeddingProvider>) -> Result<Arc<dyn Store>> {
    Ok(Arc::new(InMemoryStore::new(embedder)))
}
