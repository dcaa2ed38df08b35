//! Page body cache using moka
//!
//! Keyed by the full request URL (path and query string), so two requests
//! for the same page of the same filtered view share one entry.

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Cached raw page bodies
#[derive(Debug, Clone)]
pub struct PageCache {
    inner: Cache<String, Arc<str>>,
}

impl PageCache {
    /// Create a cache holding up to `max_capacity` pages
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
        }
    }

    /// Create a cache whose entries expire after `ttl`
    #[inline]
    #[must_use]
    pub fn with_ttl(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Cached body for a URL
    #[inline]
    pub async fn get(&self, url: &str) -> Option<Arc<str>> {
        self.inner.get(url).await
    }

    /// Store a body
    #[inline]
    pub async fn insert(&self, url: String, body: Arc<str>) {
        self.inner.insert(url, body).await;
    }

    /// Drop every cached page
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }

    /// Approximate number of cached pages
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for PageCache {
    fn default() -> Self {
        Self::new(1_000)
    }
}
