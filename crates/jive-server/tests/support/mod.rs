//! Shared test fixture: an in-memory [`Core`] wired the same way
//! [`jive_infrastructure::core::Core::bootstrap`] does, minus the config
//! layer, so handler tests never touch the filesystem.

use std::sync::Arc;

use jive_application::{DependencyEngine, ExecutorDriver, HierarchyManager, Orchestrator, Resolver, SyncEngine};
use jive_infrastructure::Core;
use jive_providers::embedding::DeterministicEmbeddingProvider;
use jive_providers::store::InMemoryStore;

const TEST_EMBEDDING_DIMENSION: usize = 8;

pub fn build_core() -> Core {
    let embedder = Arc::new(DeterministicEmbeddingProvider::new(TEST_EMBEDDING_DIMENSION));
    let store = Arc::new(InMemoryStore::new(embedder.clone()));

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

    Core { store, embedder, resolver, dependency_engine, hierarchy, sync_engine, orchestrator, executor_driver }
}
