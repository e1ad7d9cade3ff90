//! Process-wide `tracing` bootstrap (SPEC_FULL §10.2).
//!
//! Library crates (`jive-domain`, `jive-application`, `jive-providers`) only
//! ever emit `tracing` events; installing the subscriber happens exactly
//! once, here, at process entry.

mod setup;

pub use setup::init_logging;
