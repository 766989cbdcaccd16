//! Store Engine Module
//!
//! In-memory keyspace with lazy TTL expiration. Every operation takes the
//! keyspace lock exactly once, so each command is atomic with respect to
//! every other command.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::TimeDelta;
use tracing::{debug, info};

use crate::error::{CacheError, Result};
use crate::store::lock::mutex_lock;
use crate::store::{
    decode_int, Clock, Entry, RawValue, Scalar, ScalarKind, StoreStats, SystemClock, Value,
    MAX_KEY_LENGTH, MAX_VALUE_SIZE,
};

const SOURCE: &str = "store::engine";

// == Keyspace ==
#[derive(Debug, Default)]
struct Keyspace {
    entries: HashMap<String, Entry>,
    stats: StoreStats,
}

impl Keyspace {
    /// Drops `key` if its TTL has elapsed. Returns true if it was dropped.
    fn purge_if_expired(&mut self, key: &str, clock: &dyn Clock) -> bool {
        let now = clock.now();
        if self.entries.get(key).is_some_and(|e| e.is_expired(now)) {
            self.entries.remove(key);
            self.stats.record_expiration();
            debug!("Lazily expired key {}", key);
            true
        } else {
            false
        }
    }
}

// == Store ==
/// In-memory key-value store with per-key expiration.
#[derive(Debug)]
pub struct Store {
    inner: Mutex<Keyspace>,
    /// Held across a whole instrumented call by every cache sharing this store
    calls: Mutex<()>,
    clock: Arc<dyn Clock>,
    max_value_size: usize,
}

impl Store {
    // == Constructors ==
    /// Creates an empty store backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an empty store reading time from `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Keyspace::default()),
            calls: Mutex::new(()),
            clock,
            max_value_size: MAX_VALUE_SIZE,
        }
    }

    /// Overrides the largest encoded value `set` accepts.
    ///
    /// # Arguments
    /// * `max_value_size` - Limit in bytes, replacing [`MAX_VALUE_SIZE`]
    pub fn with_max_value_size(mut self, max_value_size: usize) -> Self {
        self.max_value_size = max_value_size;
        self
    }

    /// Largest encoded value `set` accepts, in bytes.
    pub fn max_value_size(&self) -> usize {
        self.max_value_size
    }

    /// Serialises instrumented calls made through this store.
    ///
    /// Every cache sharing the store takes this guard for the whole call, so
    /// counter and history writes of one call never interleave with another's.
    pub(crate) fn lock_calls(&self) -> MutexGuard<'_, ()> {
        mutex_lock(&self.calls, SOURCE, "lock_calls")
    }

    // == Set ==
    /// Stores a scalar, replacing whatever the key held before.
    ///
    /// The creation time is reset. With `ttl == None` the key never expires,
    /// clearing any previous expiration.
    ///
    /// # Arguments
    /// * `key` - The key to store, at most [`MAX_KEY_LENGTH`] bytes
    /// * `value` - The scalar to store; its encoding must fit the value limit
    /// * `ttl` - Optional lifetime
    pub fn set(&self, key: &str, value: &Scalar, ttl: Option<Duration>) -> Result<()> {
        self.check_key(key)?;
        let raw = value.encode();
        self.check_value_size(raw.as_bytes().len())?;
        let ttl = ttl.map(to_time_delta).transpose()?;

        let mut keyspace = mutex_lock(&self.inner, SOURCE, "set");
        let entry = Entry::new(Value::Scalar(raw), self.clock.now(), ttl);
        keyspace.entries.insert(key.to_string(), entry);
        debug!("SET {} (ttl={:?})", key, ttl);
        Ok(())
    }

    // == Set With Expiry ==
    /// Stores a scalar that expires after `ttl`. A zero TTL is rejected.
    pub fn setex(&self, key: &str, ttl: Duration, value: &Scalar) -> Result<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidRequest(format!(
                "Invalid expire time for key {}",
                key
            )));
        }
        self.set(key, value, Some(ttl))
    }

    // == Get ==
    /// Returns the encoded scalar at `key`, or None if absent or expired.
    pub fn get(&self, key: &str) -> Result<Option<RawValue>> {
        let mut keyspace = mutex_lock(&self.inner, SOURCE, "get");
        keyspace.purge_if_expired(key, self.clock.as_ref());

        let value = match keyspace.entries.get(key).map(|e| &e.value) {
            Some(Value::Scalar(raw)) => Some(raw.clone()),
            Some(Value::List(_)) => return Err(CacheError::WrongType(key.to_string())),
            None => None,
        };

        if value.is_some() {
            keyspace.stats.record_hit();
        } else {
            keyspace.stats.record_miss();
        }
        Ok(value)
    }

    // == Increment ==
    /// Adds one to the integer at `key`, starting from 0 if absent.
    ///
    /// The existing expiration, if any, is preserved.
    ///
    /// # Returns
    /// The value after incrementing. `TypeMismatch` if the stored bytes are
    /// not a decimal integer, `Overflow` at `i64::MAX`, `WrongType` on a list.
    pub fn incr(&self, key: &str) -> Result<i64> {
        self.check_key(key)?;
        let mut keyspace = mutex_lock(&self.inner, SOURCE, "incr");
        keyspace.purge_if_expired(key, self.clock.as_ref());

        let current = match keyspace.entries.get(key).map(|e| &e.value) {
            Some(Value::Scalar(raw)) => decode_int(raw.as_bytes())
                .map_err(|_| CacheError::TypeMismatch(key.to_string()))?,
            Some(Value::List(_)) => return Err(CacheError::WrongType(key.to_string())),
            None => 0,
        };
        let next = current
            .checked_add(1)
            .ok_or_else(|| CacheError::Overflow(key.to_string()))?;
        let raw = RawValue::new(ScalarKind::Int, next.to_string().into_bytes());

        match keyspace.entries.get_mut(key) {
            Some(entry) => entry.value = Value::Scalar(raw),
            None => {
                let entry = Entry::new(Value::Scalar(raw), self.clock.now(), None);
                keyspace.entries.insert(key.to_string(), entry);
            }
        }
        debug!("INCR {} -> {}", key, next);
        Ok(next)
    }

    // == Right Push ==
    /// Appends `item` to the list at `key`, creating the list if needed.
    ///
    /// # Returns
    /// The list length after the push.
    pub fn rpush(&self, key: &str, item: &str) -> Result<usize> {
        self.check_key(key)?;
        let mut keyspace = mutex_lock(&self.inner, SOURCE, "rpush");
        keyspace.purge_if_expired(key, self.clock.as_ref());

        let now = self.clock.now();
        let entry = keyspace
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::new(Value::List(Vec::new()), now, None));

        match &mut entry.value {
            Value::List(items) => {
                items.push(item.to_string());
                Ok(items.len())
            }
            Value::Scalar(_) => Err(CacheError::WrongType(key.to_string())),
        }
    }

    // == List Range ==
    /// Returns the inclusive slice `start..=stop` of the list at `key`.
    ///
    /// Negative indices count from the end (`-1` is the last item) and
    /// out-of-range indices are clamped. Absent keys yield an empty list.
    pub fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>> {
        let mut keyspace = mutex_lock(&self.inner, SOURCE, "lrange");
        keyspace.purge_if_expired(key, self.clock.as_ref());

        let items = match keyspace.entries.get(key).map(|e| &e.value) {
            Some(Value::List(items)) => items,
            Some(Value::Scalar(_)) => return Err(CacheError::WrongType(key.to_string())),
            None => return Ok(Vec::new()),
        };

        Ok(match list_bounds(items.len(), start, stop) {
            Some((from, to)) => items[from..=to].to_vec(),
            None => Vec::new(),
        })
    }

    // == Delete ==
    /// Removes `key`. Returns true if a live key was removed.
    pub fn delete(&self, key: &str) -> bool {
        let mut keyspace = mutex_lock(&self.inner, SOURCE, "delete");
        keyspace.purge_if_expired(key, self.clock.as_ref());
        keyspace.entries.remove(key).is_some()
    }

    // == Exists ==
    /// Returns true if `key` holds a live value of any type.
    pub fn exists(&self, key: &str) -> bool {
        let mut keyspace = mutex_lock(&self.inner, SOURCE, "exists");
        keyspace.purge_if_expired(key, self.clock.as_ref());
        keyspace.entries.contains_key(key)
    }

    // == Time To Live ==
    /// Returns the remaining lifetime of `key`.
    ///
    /// None if the key is absent or has no expiration.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let mut keyspace = mutex_lock(&self.inner, SOURCE, "ttl");
        keyspace.purge_if_expired(key, self.clock.as_ref());
        let now = self.clock.now();
        keyspace
            .entries
            .get(key)
            .and_then(|entry| entry.ttl_remaining(now))
    }

    // == Flush ==
    /// Removes every key. Statistics are kept.
    pub fn flushdb(&self) {
        let mut keyspace = mutex_lock(&self.inner, SOURCE, "flushdb");
        let removed = keyspace.entries.len();
        keyspace.entries.clear();
        info!("Flushed store: removed {} keys", removed);
    }

    // == Stats ==
    /// Returns current store statistics.
    pub fn stats(&self) -> StoreStats {
        let keyspace = mutex_lock(&self.inner, SOURCE, "stats");
        let mut stats = keyspace.stats.clone();
        stats.set_total_keys(keyspace.entries.len());
        stats
    }

    // == Length ==
    /// Returns the number of keys held, including expired keys not yet read.
    pub fn len(&self) -> usize {
        mutex_lock(&self.inner, SOURCE, "len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Limits ==
    /// Rejects keys longer than [`MAX_KEY_LENGTH`].
    ///
    /// Every writing command applies this check.
    pub fn check_key(&self, key: &str) -> Result<()> {
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        Ok(())
    }

    /// Rejects encoded values larger than [`Store::max_value_size`].
    pub fn check_value_size(&self, len: usize) -> Result<()> {
        if len > self.max_value_size {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                self.max_value_size
            )));
        }
        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

fn to_time_delta(ttl: Duration) -> Result<TimeDelta> {
    TimeDelta::from_std(ttl)
        .map_err(|_| CacheError::InvalidRequest(format!("TTL out of range: {:?}", ttl)))
}

/// Resolves redis-style inclusive list bounds against a list of `len` items.
fn list_bounds(len: usize, start: i64, stop: i64) -> Option<(usize, usize)> {
    let len = len as i64;
    let start = if start < 0 { (start + len).max(0) } else { start };
    let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };

    if len == 0 || start > stop || start >= len {
        None
    } else {
        Some((start as usize, stop as usize))
    }
}
