//! # Application Layer
//!
//! Use cases driving the hierarchical work-item orchestration engine (spec
//! §4.2–§4.7). Each use case is a thin, testable wrapper over the domain's
//! `Store`/`EmbeddingProvider` ports — no transport, persistence, or
//! configuration concerns live here.
//!
//! ## Use cases
//!
//! | Component | Responsibility |
//! |-----------|-----------------|
//! | [`use_cases::Resolver`] | free-form identifier → canonical `WorkItem` id |
//! | [`use_cases::DependencyEngine`] | scheduling DAG: ordering, cycle detection |
//! | [`use_cases::HierarchyManager`] | parent/child tree operations, derived progress |
//! | [`use_cases::SyncEngine`] | file ↔ Store reconciliation and conflict resolution |
//! | [`use_cases::Orchestrator`] | session-driven execution plan and dispatch loop |
//! | [`use_cases::ExecutorDriver`] | background completion of a delegated item's children |
//!
//! ## Clean Architecture Principles
//!
//! - Depends only on [`jive_domain`]'s ports and entities, never on a
//!   concrete provider or transport.
//! - Use cases may depend on one another (e.g. the `Orchestrator` calls the
//!   `Resolver` and `HierarchyManager`) but never reach outside this layer
//!   and the domain layer beneath it.

/// Use cases implementing spec §4.2–§4.7.
pub mod use_cases;

#[cfg(test)]
mod test_support;

pub use use_cases::{
    DependencyEngine, DispatchedTask, ExecutorDriver, HierarchyManager, HierarchyNode, Orchestrator, PlanOrdering,
    ProgressReport, Resolver, StatusOutcome, SyncEngine, SyncOutcome, TaskGuidance,
};
