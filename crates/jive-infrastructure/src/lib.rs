//! # Infrastructure Layer
//!
//! Cross-cutting technical concerns that support the application and domain
//! layers: configuration loading, the `tracing` bootstrap, and the explicit
//! composition root (`Core`) that wires a Store and embedding provider into
//! the application layer's use cases. All concrete providers live in
//! `jive-providers`, resolved here via `jive_domain`'s `linkme` registry.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`config`] | Layered TOML + env configuration (SPEC_FULL §10.3) |
//! | [`core`] | Composition root wiring Store + use cases (SPEC_FULL §9, §12) |
//! | [`logging`] | `tracing` subscriber bootstrap (SPEC_FULL §10.2) |

pub mod config;
pub mod core;
pub mod logging;

pub use core::Core;
