//! Catalog client configuration

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};

/// Largest page the catalog API accepts
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Catalog client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// API origin, e.g. `https://api.example.com`
    pub base_url: String,
    /// Path prefix in front of `/public/frameworks/scf`
    pub api_prefix: String,
    /// Page size requested per call (1..=500)
    pub page_limit: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum cached page bodies
    pub cache_capacity: u64,
    /// Cached page lifetime in seconds (0 keeps pages until evicted)
    pub cache_ttl_secs: u64,
}

impl CatalogConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// With page limit
    #[inline]
    #[must_use]
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Check the configuration before building a client
    ///
    /// # Errors
    /// - `CatalogError::Config` for an empty base URL or an out-of-range page limit
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(CatalogError::Config("base_url is empty".to_string()));
        }
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(CatalogError::Config(format!(
                "page_limit must be within 1..={MAX_PAGE_LIMIT}, got {}",
                self.page_limit
            )));
        }
        Ok(())
    }

    /// Root of the SCF catalog endpoints
    #[must_use]
    pub fn scf_root(&self) -> String {
        format!(
            "{}/{}/public/frameworks/scf",
            self.base_url.trim_end_matches('/'),
            self.api_prefix.trim_matches('/')
        )
        .replace("//public", "/public")
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_prefix: "/api/v1".to_string(),
            page_limit: MAX_PAGE_LIMIT,
            timeout_secs: 30,
            cache_capacity: 1_000,
            cache_ttl_secs: 300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CatalogConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_limit, 500);
    }

    #[test]
    fn rejects_out_of_range_page_limit() {
        assert!(CatalogConfig::new().with_page_limit(0).validate().is_err());
        assert!(CatalogConfig::new().with_page_limit(501).validate().is_err());
        assert!(CatalogConfig::new().with_base_url(" ").validate().is_err());
    }

    #[test]
    fn scf_root_joins_prefix() {
        let config = CatalogConfig::new().with_base_url("https://api.example.com/");
        assert_eq!(
            config.scf_root(),
            "https://api.example.com/api/v1/public/frameworks/scf"
        );

        let mut bare = CatalogConfig::new().with_base_url("http://h");
        bare.api_prefix = String::new();
        assert_eq!(bare.scf_root(), "http://h/public/frameworks/scf");
    }

    #[test]
    fn config_from_partial_json() {
        let config: CatalogConfig =
            serde_json::from_str(r#"{"base_url":"http://x","page_limit":100}"#).unwrap();
        assert_eq!(config.page_limit, 100);
        assert_eq!(config.timeout_secs, 30);
    }
}
