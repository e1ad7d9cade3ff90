//! # Jive
//!
//! Hierarchical work-item orchestration engine for autonomous agents,
//! exposed over the Model Context Protocol. This crate is a thin re-export
//! shell: `main.rs` is the only code that runs, everything else lives in
//! [`jive_domain`], [`jive_application`], [`jive_infrastructure`], and
//! [`jive_server`].

pub use jive_application as application;
pub use jive_domain as domain;
pub use jive_infrastructure as infrastructure;
pub use jive_server as server;
