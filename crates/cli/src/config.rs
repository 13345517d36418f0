//! Configuration loading and validation for the `sodium` command.
//!
//! Values are read from environment variables at startup. `APP_KEY` is passed
//! through untouched: an unset variable and an empty one are different states
//! and the cipher service reports them differently.

use anyhow::{Context, Result};
use cipher_svc::KeySource;
use serde::Deserialize;

/// Validated command configuration.
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Default key used when no `--key` is given.
    #[serde(default)]
    pub app_key: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::load(config::Environment::default())
    }

    fn load(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}

impl KeySource for Config {
    fn default_key(&self) -> Option<String> {
        self.app_key.clone()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material.
        f.debug_struct("Config")
            .field("app_key", &self.app_key.as_ref().map(|_| "[REDACTED]"))
            .field("log_level", &self.log_level)
            .finish()
    }
}
