//! Page Cache
//!
//! Caches fetched page bodies under `cache:<url>` for a fixed TTL and counts
//! fetches per URL under `count:<url>`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::page::Fetcher;
use crate::store::{decode_int, decode_utf8, Scalar, Store};

/// Lifetime of a cached page unless configured otherwise.
pub const DEFAULT_PAGE_TTL: Duration = Duration::from_secs(10);

/// Store key holding the cached body for `url`.
pub fn cache_key(url: &str) -> String {
    format!("cache:{}", url)
}

/// Store key holding the fetch counter for `url`.
pub fn count_key(url: &str) -> String {
    format!("count:{}", url)
}

// == Page Cache ==
/// TTL-bounded cache of fetched pages.
///
/// Concurrent misses on the same URL are not coalesced; each one fetches
/// and bumps the counter.
#[derive(Debug)]
pub struct PageCache<F> {
    store: Arc<Store>,
    fetcher: F,
    ttl: Duration,
}

impl<F: Fetcher> PageCache<F> {
    /// Creates a page cache with the default ten second TTL.
    ///
    /// Unlike [`crate::cache::Cache`], the store is not flushed.
    pub fn new(store: Arc<Store>, fetcher: F) -> Self {
        Self {
            store,
            fetcher,
            ttl: DEFAULT_PAGE_TTL,
        }
    }

    pub fn from_config(store: Arc<Store>, fetcher: F, config: &Config) -> Self {
        Self::new(store, fetcher).with_ttl(config.page_ttl())
    }

    /// Overrides the cached page lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Get Page ==
    /// Returns the page body for `url`, fetching it on a miss.
    ///
    /// A miss stores the body for the configured TTL and increments the
    /// URL's fetch counter. Fetch errors are returned as-is and nothing is
    /// cached.
    ///
    /// # Arguments
    /// * `url` - Page address; its derived store keys must fit
    ///   [`crate::store::MAX_KEY_LENGTH`]
    ///
    /// # Returns
    /// The page body. A URL too long to key is rejected with
    /// `InvalidRequest` before anything is fetched. A body larger than the
    /// store's value limit is returned and counted but not cached.
    pub async fn get_page(&self, url: &str) -> Result<String> {
        let key = cache_key(url);
        let counter = count_key(url);
        self.store.check_key(&key)?;
        self.store.check_key(&counter)?;
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidRequest(
                "Page TTL must be positive".to_string(),
            ));
        }

        let cached = self
            .store
            .get(&key)?
            .map(|raw| decode_utf8(raw.as_bytes()))
            .transpose()?;
        if let Some(content) = cached {
            debug!("Page cache hit for {}", url);
            return Ok(content);
        }

        info!("Page cache miss for {}, fetching", url);
        let page = self.fetcher.fetch(url).await.inspect_err(|e| {
            warn!("Fetching {} failed: {}", url, e);
        })?;

        if self.store.check_value_size(page.content.len()).is_ok() {
            self.store
                .setex(&key, self.ttl, &Scalar::from(page.content.as_str()))?;
        } else {
            warn!(
                "Page {} is {} bytes, over the {} byte store limit; not caching",
                url,
                page.content.len(),
                self.store.max_value_size()
            );
        }
        let fetches = self.store.incr(&counter)?;
        debug!(
            "Cached {} ({} bytes, status {}), fetch #{}",
            url,
            page.content.len(),
            page.status,
            fetches
        );

        Ok(page.content)
    }

    // == Fetch Count ==
    /// Number of times `url` has been fetched (0 if never).
    pub fn fetch_count(&self, url: &str) -> Result<i64> {
        Ok(self
            .store
            .get(&count_key(url))?
            .map(|raw| decode_int(raw.as_bytes()))
            .transpose()?
            .unwrap_or(0))
    }
}
