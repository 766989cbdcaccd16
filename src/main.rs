//! Replay Cache demo harness
//!
//! Stores a value, reads it back, replays the recorded calls, then fetches
//! the demo URL twice through the page cache.

use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use replay_cache::{Cache, Config, HttpFetcher, PageCache, Store, STORE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "replay_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: page_ttl={}s, fetch_timeout={}s, demo_url={}",
        config.page_ttl, config.fetch_timeout, config.demo_url
    );

    let store = Arc::new(Store::new());

    // Instrumented cache
    let cache = Cache::new(store.clone());
    let key = cache.store("hello")?;
    if let Some(value) = cache.get_str(&key)? {
        println!("{}", value);
    }
    let log = cache.replay(&STORE)?;
    println!("{}", log);
    debug!("Replay as JSON: {}", serde_json::to_string(&log)?);

    // Page cache
    let fetcher = HttpFetcher::from_config(&config)?;
    let pages = PageCache::from_config(store.clone(), fetcher, &config);
    for _ in 0..2 {
        let page = pages
            .get_page(&config.demo_url)
            .await
            .with_context(|| format!("fetching {}", config.demo_url))?;
        println!("{}", page);
    }
    println!(
        "{} fetched {} times",
        config.demo_url,
        pages.fetch_count(&config.demo_url)?
    );

    info!("Store stats: {}", serde_json::to_string(&store.stats())?);
    Ok(())
}
