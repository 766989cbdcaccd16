//! Replay Cache - An in-process instrumented key-value cache
//!
//! Provides Redis-like storage with lazy TTL expiration, call counting and
//! call-history replay, and a TTL cache for fetched web pages.

pub mod cache;
pub mod config;
pub mod error;
pub mod instrument;
pub mod page;
pub mod store;

pub use cache::{Cache, ReplayLog, STORE};
pub use config::Config;
pub use error::{CacheError, Result};
pub use page::{HttpFetcher, PageCache};
pub use store::{Scalar, Store};
