//! Application configuration
//!
//! A TOML file with one table per component:
//!
//! ```toml
//! [catalog]
//! base_url = "https://api.example.com"
//! page_limit = 250
//!
//! [engine]
//! history_limit = 20
//! priority_path = "~/.scf/priorities.json"
//! ```

use anyhow::{Context, Result};
use scf_catalog::CatalogConfig;
use scf_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Composed configuration for the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog client
    pub catalog: CatalogConfig,
    /// Configurator engine
    pub engine: EngineConfig,
    /// Default tracing directive when `RUST_LOG` is unset
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    /// Returns an error for malformed TOML or an invalid component config.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw).context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Validate every component
    ///
    /// # Errors
    /// Returns the first component validation error.
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        self.engine.validate()?;
        Ok(())
    }

    /// With a catalog base URL override
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.catalog = self.catalog.with_base_url(base_url);
        self
    }
}
