//! Page Module
//!
//! TTL cache for fetched web pages and the fetcher it delegates misses to.

mod fetcher;
mod page_cache;

pub use fetcher::{FetchedPage, Fetcher, HttpFetcher};
pub use page_cache::{cache_key, count_key, PageCache, DEFAULT_PAGE_TTL};
