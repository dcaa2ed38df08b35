//! Page sources: where raw catalog pages come from

use crate::cache::PageCache;
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result};
use crate::query::{CatalogKind, CatalogQuery};
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fetches one raw page of a catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Raw response body for the page starting at `offset`
    async fn fetch_page(
        &self,
        kind: CatalogKind,
        query: &CatalogQuery,
        offset: u32,
        limit: u32,
    ) -> Result<Arc<str>>;
}

/// HTTP page source backed by the public catalog API
///
/// # Example
///
/// ```rust,no_run
/// use scf_catalog::{CatalogConfig, CatalogLoader, HttpSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = CatalogConfig::new().with_base_url("https://api.example.com");
/// let loader = CatalogLoader::new(HttpSource::new(config.clone())?)
///     .with_page_limit(config.page_limit);
///
/// let report = loader.load_all().await;
/// println!("{} controls", report.catalog.controls().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpSource {
    root: Url,
    client: Client,
    cache: PageCache,
}

impl HttpSource {
    /// Build a source from configuration
    ///
    /// # Errors
    /// - `CatalogError::Config` if the configuration is rejected
    /// - `CatalogError::InvalidUrl` if the base URL does not parse
    /// - `CatalogError::Http` if the HTTP client cannot be built
    pub fn new(config: CatalogConfig) -> Result<Self> {
        config.validate()?;

        let root_str = config.scf_root();
        let root = Url::parse(&root_str)
            .map_err(|e| CatalogError::InvalidUrl(format!("{root_str}: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let cache = if config.cache_ttl_secs == 0 {
            PageCache::new(config.cache_capacity)
        } else {
            PageCache::with_ttl(config.cache_capacity, Duration::from_secs(config.cache_ttl_secs))
        };

        Ok(Self {
            root,
            client,
            cache,
        })
    }

    /// The page cache
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    fn endpoint(&self, kind: CatalogKind) -> String {
        format!("{}{}", self.root.as_str().trim_end_matches('/'), kind.path())
    }

    async fn handle_response(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Server {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl CatalogSource for HttpSource {
    async fn fetch_page(
        &self,
        kind: CatalogKind,
        query: &CatalogQuery,
        offset: u32,
        limit: u32,
    ) -> Result<Arc<str>> {
        let request = self
            .client
            .get(self.endpoint(kind))
            .query(&query.to_pairs(offset, limit))
            .build()?;
        let url = request.url().to_string();

        if let Some(body) = self.cache.get(&url).await {
            debug!(catalog = %kind, %url, "page cache hit");
            return Ok(body);
        }

        debug!(catalog = %kind, %url, "fetching page");
        let response = self.client.execute(request).await?;
        let body: Arc<str> = Arc::from(Self::handle_response(response).await?);
        self.cache.insert(url, Arc::clone(&body)).await;
        Ok(body)
    }
}
