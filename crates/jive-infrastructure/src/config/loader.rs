//! TOML file + `JIVE_`-prefixed environment overlay, via `figment`
//! (SPEC_FULL §10.3). Grounded on the teacher's `ConfigLoader` shape
//! (explicit-path override, eager validation after merge), re-pointed from
//! Loco YAML to figment TOML+env.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use jive_domain::error::{Error, Result};

use super::types::Config;

/// Loads and validates a [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Build a loader with no explicit file override.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from this TOML file instead of the default search path.
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Merge defaults, the TOML file (if present), and `JIVE_`-prefixed
    /// environment variables, then validate eagerly.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the TOML file is malformed, an
    /// environment variable doesn't parse into its field's type, or a
    /// validated value is out of range.
    pub fn load(&self) -> Result<Config> {
        let path = self.config_path.clone().unwrap_or_else(|| PathBuf::from("jive.toml"));

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if path.exists() {
            figment = figment.merge(Toml::file(&path));
        }
        figment = figment.merge(Env::prefixed("JIVE_"));

        let config: Config =
            figment.extract().map_err(|e| Error::config_with_source("failed to load configuration", e))?;
        validate(&config)?;
        Ok(config)
    }
}

/// Eager range checks (SPEC_FULL §10.3): never silently clamp, always
/// surface [`Error::Config`].
fn validate(config: &Config) -> Result<()> {
    if config.max_parallel == 0 {
        return Err(Error::config("max_parallel must be greater than 0"));
    }
    if config.session_timeout_minutes == 0 {
        return Err(Error::config("session_timeout_minutes must be greater than 0"));
    }
    if config.store_op_timeout_seconds == 0 {
        return Err(Error::config("store_op_timeout_seconds must be greater than 0"));
    }
    if config.store_max_retries == 0 {
        return Err(Error::config("store_max_retries must be greater than 0"));
    }
    if config.data_path.trim().is_empty() {
        return Err(Error::config("data_path must not be empty"));
    }
    if !matches!(config.log_format.as_str(), "pretty" | "json") {
        return Err(Error::config(format!("log_format must be \"pretty\" or \"json\", got {:?}", config.log_format)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_validate() {
        let loader = ConfigLoader::new().with_config_path("/nonexistent/jive.toml");
        let config = loader.load().unwrap();
        assert_eq!(config.max_parallel, 3);
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_parallel = 7\ndata_path = \"/tmp/jive-data\"").unwrap();
        let config = ConfigLoader::new().with_config_path(file.path()).load().unwrap();
        assert_eq!(config.max_parallel, 7);
        assert_eq!(config.data_path, "/tmp/jive-data");
    }

    #[test]
    fn zero_max_parallel_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_parallel = 0").unwrap();
        let error = ConfigLoader::new().with_config_path(file.path()).load().unwrap_err();
        assert!(matches!(error, Error::Config { .. }));
    }

    #[test]
    fn env_override_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_parallel = 7").unwrap();
        // SAFETY: test-only, single-threaded within this test function.
        unsafe { std::env::set_var("JIVE_MAX_PARALLEL", "9") };
        let config = ConfigLoader::new().with_config_path(file.path()).load().unwrap();
        unsafe { std::env::remove_var("JIVE_MAX_PARALLEL") };
        assert_eq!(config.max_parallel, 9);
    }
}
