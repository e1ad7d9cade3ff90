//! Installs the process-wide `tracing` subscriber (SPEC_FULL §10.2).

use jive_domain::error::{Error, Result};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Install a global `tracing` subscriber filtered by `config.log_level` and
/// formatted per `config.log_format` (`pretty` or `json`, validated eagerly
/// by [`crate::config::ConfigLoader`]).
///
/// Call exactly once, at process entry. Safe to call from `main` only —
/// never from a library crate, which should just emit events.
///
/// # Errors
///
/// Returns [`Error::Internal`] if a subscriber is already installed for this
/// process.
pub fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| Error::config_with_source("invalid log_level filter", e))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(true);

    let result = if config.log_format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| Error::internal(format!("failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_level() {
        let mut config = Config::default();
        config.log_level = "not-a-valid-filter!!".to_owned();
        let error = init_logging(&config).unwrap_err();
        assert!(matches!(error, Error::Config { .. }));
    }
}
