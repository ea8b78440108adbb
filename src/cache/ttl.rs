//! Generic in-memory cache with per-entry time-to-live.

use parking_lot::Mutex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// A cached value, the instant it was written, and how long it stays usable.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
  value: V,
  inserted_at: Instant,
  ttl: Duration,
}

impl<V> CacheEntry<V> {
  fn is_expired(&self, now: Instant) -> bool {
    now.duration_since(self.inserted_at) > self.ttl
  }
}

/// Map from key to value where every entry expires.
///
/// All operations on one instance serialize through a single mutex — the
/// expected workload is an interactive client, so there is no per-key
/// locking. Entries expire lazily: `get` evicts the dead entry it finds as a
/// documented side effect, and `evict_expired` sweeps the rest on demand.
pub struct TtlCache<K, V> {
  entries: Mutex<HashMap<K, CacheEntry<V>>>,
  default_ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
  /// Create an empty cache whose entries live for `default_ttl`.
  pub fn new(default_ttl: Duration) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      default_ttl,
    }
  }

  /// The TTL stamped on entries inserted with [`put`](Self::put).
  pub fn default_ttl(&self) -> Duration {
    self.default_ttl
  }

  /// Get the value for `key` if it is present and within its TTL.
  ///
  /// An entry found expired is removed before returning `None`, so
  /// subsequent `contains`/`len` calls reflect the eviction.
  pub fn get<Q>(&self, key: &Q) -> Option<V>
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    let mut entries = self.entries.lock();
    let fresh = match entries.get(key) {
      Some(entry) if !entry.is_expired(Instant::now()) => Some(entry.value.clone()),
      Some(_) => None,
      None => return None,
    };
    if fresh.is_none() {
      // Self-healing read: the entry we just found is dead, evict it.
      entries.remove(key);
    }
    fresh
  }

  /// Insert or replace the value for `key` with the default TTL.
  ///
  /// Re-putting an identical value only resets the insertion timestamp.
  pub fn put(&self, key: K, value: V) {
    self.insert(key, value, self.default_ttl);
  }

  /// Insert or replace the value for `key` with its own TTL.
  ///
  /// The override is stored on the entry and honored by the read path.
  pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
    self.insert(key, value, ttl);
  }

  fn insert(&self, key: K, value: V, ttl: Duration) {
    self.entries.lock().insert(
      key,
      CacheEntry {
        value,
        inserted_at: Instant::now(),
        ttl,
      },
    );
  }

  /// Remove the entry for `key`; no-op when absent.
  pub fn invalidate<Q>(&self, key: &Q)
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.entries.lock().remove(key);
  }

  /// Remove every entry; no-op when already empty.
  pub fn clear(&self) {
    self.entries.lock().clear();
  }

  /// Raw membership check, deliberately without a TTL check — "present" is
  /// not "usable".
  pub fn contains<Q>(&self, key: &Q) -> bool
  where
    K: Borrow<Q>,
    Q: Hash + Eq + ?Sized,
  {
    self.entries.lock().contains_key(key)
  }

  /// Raw entry count, possibly including expired entries not yet swept.
  pub fn len(&self) -> usize {
    self.entries.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.lock().is_empty()
  }

  /// Sweep every expired entry, returning how many were removed.
  ///
  /// `get` self-heals, so this is not needed for correctness — it bounds
  /// memory for caches that are written but never re-read.
  pub fn evict_expired(&self) -> usize {
    let now = Instant::now();
    let mut entries = self.entries.lock();
    let before = entries.len();
    entries.retain(|_, entry| !entry.is_expired(now));
    before - entries.len()
  }
}
