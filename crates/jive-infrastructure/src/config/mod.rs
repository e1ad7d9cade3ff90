//! Layered configuration: TOML file + `JIVE_`-prefixed environment overlay
//! (SPEC_FULL §10.3), loaded with `figment` the way the teacher's
//! `config::loader` layers its own sources.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::Config;
