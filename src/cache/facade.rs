//! Cache Facade Module
//!
//! Public entry point: stores scalars under generated keys through the
//! instrumentation chain and reads them back with typed projections.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::cache::{CallRecord, ReplayLog};
use crate::error::Result;
use crate::instrument::{standard_chain, InterceptorChain, Invocation, Method};
use crate::store::{decode_int, decode_utf8, Scalar, Store};

/// The instrumented `Cache::store` method.
pub const STORE: Method = Method::new("Cache", "store");

// == Cache ==
/// Instrumented cache over a shared [`Store`].
#[derive(Debug)]
pub struct Cache {
    store: Arc<Store>,
    interceptors: InterceptorChain,
}

impl Cache {
    // == Constructors ==
    /// Creates a cache with the standard chain (counter, then history).
    ///
    /// The store is flushed so every cache starts from an empty keyspace.
    /// Caches sharing one store also share its counters and history lists;
    /// their instrumented calls are serialised through the store, so history
    /// order always matches call order across all of them.
    ///
    /// # Arguments
    /// * `store` - Shared store; flushed on construction
    pub fn new(store: Arc<Store>) -> Self {
        Self::with_interceptors(store, standard_chain())
    }

    /// Creates a cache whose `store` method runs through `interceptors`.
    pub fn with_interceptors(store: Arc<Store>, interceptors: InterceptorChain) -> Self {
        store.flushdb();
        info!("Cache ready with {} interceptors", interceptors.len());
        Self {
            store,
            interceptors,
        }
    }

    /// The underlying store.
    pub fn backend(&self) -> &Arc<Store> {
        &self.store
    }

    // == Store ==
    /// Saves `value` under a freshly generated key.
    ///
    /// # Arguments
    /// * `value` - Any scalar: text, bytes, integer or float
    ///
    /// # Returns
    /// The generated UUID key. Each call increments the `Cache.store` counter
    /// and appends one input record; the output record is only written when
    /// the write succeeds.
    pub fn store(&self, value: impl Into<Scalar>) -> Result<String> {
        let args = [value.into()];
        let call = Invocation::new(&STORE, &args);

        let _guard = self.store.lock_calls();
        self.interceptors.invoke(&self.store, &call, || {
            let key = Uuid::new_v4().to_string();
            self.store.set(&key, &args[0], None)?;
            debug!("Stored {} under {}", args[0].repr(), key);
            Ok(key)
        })
    }

    // == Get ==
    /// Returns the value at `key` decoded by its stored kind, or None.
    pub fn get(&self, key: &str) -> Result<Option<Scalar>> {
        self.store
            .get(key)?
            .map(|raw| raw.decode())
            .transpose()
    }

    /// Returns `projection` applied to the raw bytes at `key`.
    ///
    /// The projection is never called for an absent key.
    pub fn get_with<T, F>(&self, key: &str, projection: F) -> Result<Option<T>>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        self.store
            .get(key)?
            .map(|raw| projection(raw.as_bytes()))
            .transpose()
    }

    /// Returns the value at `key` as UTF-8 text.
    pub fn get_str(&self, key: &str) -> Result<Option<String>> {
        self.get_with(key, decode_utf8)
    }

    /// Returns the value at `key` parsed as an integer.
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.get_with(key, decode_int)
    }

    // == Instrumentation Readers ==
    /// Number of recorded attempts to call `method`.
    pub fn call_count(&self, method: &Method) -> Result<i64> {
        Ok(self.get_int(&method.qualified_name())?.unwrap_or(0))
    }

    /// Recorded calls to `method`, paired input to output.
    pub fn history(&self, method: &Method) -> Result<Vec<CallRecord>> {
        Ok(self.replay(method)?.records().to_vec())
    }

    // == Replay ==
    /// Builds the replay log for `method` from its recorded history.
    ///
    /// Inputs and outputs are paired by position; see
    /// [`ReplayLog::from_history`] for how unmatched inputs are handled.
    pub fn replay(&self, method: &Method) -> Result<ReplayLog> {
        let inputs = self.store.lrange(&method.inputs_key(), 0, -1)?;
        let outputs = self.store.lrange(&method.outputs_key(), 0, -1)?;
        Ok(ReplayLog::from_history(method.name(), inputs, outputs))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use crate::instrument::{CallHistory, CountCalls};

    fn new_cache() -> Cache {
        Cache::new(Arc::new(Store::new()))
    }

    #[test]
    fn test_store_and_get_str() {
        let cache = new_cache();

        let key = cache.store("hello").unwrap();

        assert_eq!(cache.get_str(&key).unwrap(), Some("hello".to_string()));
    }

    #[test]
    fn test_store_generates_distinct_keys() {
        let cache = new_cache();

        let a = cache.store("same").unwrap();
        let b = cache.store("same").unwrap();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_get_decodes_by_kind() {
        let cache = new_cache();

        let int_key = cache.store(42).unwrap();
        let float_key = cache.store(2.5).unwrap();
        let bytes_key = cache.store(vec![0u8, 1, 2]).unwrap();

        assert_eq!(cache.get(&int_key).unwrap(), Some(Scalar::Int(42)));
        assert_eq!(cache.get(&float_key).unwrap(), Some(Scalar::Float(2.5)));
        assert_eq!(cache.get(&bytes_key).unwrap(), Some(Scalar::Bytes(vec![0, 1, 2])));
    }

    #[test]
    fn test_get_int_projection() {
        let cache = new_cache();

        let key = cache.store(123).unwrap();
        assert_eq!(cache.get_int(&key).unwrap(), Some(123));

        let text_key = cache.store("not a number").unwrap();
        assert!(matches!(cache.get_int(&text_key), Err(CacheError::Decode(_))));
    }

    #[test]
    fn test_get_absent_skips_projection() {
        let cache = new_cache();

        let result = cache
            .get_with("missing", |_| -> Result<()> { panic!("projection called") })
            .unwrap();

        assert!(result.is_none());
        assert!(cache.get("missing").unwrap().is_none());
        assert!(cache.get_str("missing").unwrap().is_none());
    }

    #[test]
    fn test_get_with_custom_projection() {
        let cache = new_cache();
        let key = cache.store("abc").unwrap();

        let len = cache.get_with(&key, |bytes| Ok(bytes.len())).unwrap();
        assert_eq!(len, Some(3));
    }

    #[test]
    fn test_new_flushes_store() {
        let store = Arc::new(Store::new());
        store.set("stale", &Scalar::from("x"), None).unwrap();

        let cache = Cache::new(store.clone());

        assert!(cache.get("stale").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_call_count() {
        let cache = new_cache();
        assert_eq!(cache.call_count(&STORE).unwrap(), 0);

        cache.store("a").unwrap();
        cache.store(1).unwrap();

        assert_eq!(cache.call_count(&STORE).unwrap(), 2);
    }

    #[test]
    fn test_replay_example() {
        let cache = new_cache();
        let key = cache.store("hello").unwrap();

        let lines: Vec<String> = cache.replay(&STORE).unwrap().lines().collect();

        assert_eq!(
            lines,
            vec![
                "store was called 1 times:".to_string(),
                format!("store(*('hello',)) -> {}", key),
            ]
        );
    }

    #[test]
    fn test_history_pairs_inputs_with_keys() {
        let cache = new_cache();
        let k1 = cache.store("first").unwrap();
        let k2 = cache.store(2).unwrap();

        let history = cache.history(&STORE).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].inputs, "('first',)");
        assert_eq!(history[0].output, k1);
        assert_eq!(history[1].inputs, "(2,)");
        assert_eq!(history[1].output, k2);
    }

    #[test]
    fn test_failed_store_is_counted_but_not_replayed() {
        let store = Arc::new(Store::new().with_max_value_size(4));
        let cache = Cache::new(store);

        let ok_key = cache.store("tiny").unwrap();
        let result = cache.store("too large");

        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
        assert_eq!(cache.call_count(&STORE).unwrap(), 2);

        let log = cache.replay(&STORE).unwrap();
        assert_eq!(log.total_calls(), 2);
        assert_eq!(log.records().len(), 1);
        assert_eq!(log.records()[0].output, ok_key);
    }

    #[test]
    fn test_history_only_chain_does_not_count() {
        let cache = Cache::with_interceptors(
            Arc::new(Store::new()),
            InterceptorChain::new().layer(CallHistory),
        );

        cache.store("x").unwrap();

        assert_eq!(cache.call_count(&STORE).unwrap(), 0);
        assert_eq!(cache.replay(&STORE).unwrap().records().len(), 1);
    }

    #[test]
    fn test_count_only_chain_records_no_history() {
        let cache = Cache::with_interceptors(
            Arc::new(Store::new()),
            InterceptorChain::new().layer(CountCalls),
        );

        cache.store("x").unwrap();

        assert_eq!(cache.call_count(&STORE).unwrap(), 1);
        assert_eq!(cache.replay(&STORE).unwrap().total_calls(), 0);
    }

    #[test]
    fn test_caches_sharing_a_store_keep_history_paired() {
        let store = Arc::new(Store::new());
        let caches = [Arc::new(Cache::new(store.clone())), Arc::new(Cache::new(store.clone()))];

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = caches[t % 2].clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|i| {
                            let value = (t * 100 + i) as i64;
                            (value, cache.store(value).unwrap())
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut expected = std::collections::HashMap::new();
        for handle in handles {
            for (value, key) in handle.join().unwrap() {
                expected.insert(key, value);
            }
        }

        assert_eq!(caches[0].call_count(&STORE).unwrap(), 200);
        let history = caches[1].history(&STORE).unwrap();
        assert_eq!(history.len(), 200);
        for record in history {
            assert_eq!(record.inputs, format!("({},)", expected[&record.output]));
        }
    }

    #[test]
    fn test_concurrent_stores_keep_history_paired() {
        let cache = Arc::new(new_cache());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    (0..25)
                        .map(|i| (i64::from(t) * 100 + i, cache.store(i64::from(t) * 100 + i).unwrap()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut expected = std::collections::HashMap::new();
        for handle in handles {
            for (value, key) in handle.join().unwrap() {
                expected.insert(key, value);
            }
        }

        assert_eq!(cache.call_count(&STORE).unwrap(), 200);
        let history = cache.history(&STORE).unwrap();
        assert_eq!(history.len(), 200);
        for record in history {
            let value = expected[&record.output];
            assert_eq!(record.inputs, format!("({},)", value));
        }
    }
}
