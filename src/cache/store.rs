//! TTL cache storage.
//!
//! Entries carry their insertion time and expire lazily: nothing sweeps the
//! map, a `get` that finds an expired entry removes it and reports a miss.
//! The map itself is a `DashMap`, so concurrent readers and writers never
//! corrupt it; callers that pair `get` with a later `set` accept that two
//! concurrent misses may both compute and the last `set` wins.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use time::OffsetDateTime;
use tracing::trace;

use super::clock::Clock;

struct CacheEntry<V> {
    value: V,
    inserted_at: OffsetDateTime,
}

pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: time::Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache whose entries live for `ttl` after insertion.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: time::Duration::try_from(ttl).unwrap_or(time::Duration::MAX),
            clock,
        }
    }

    /// Return the value for `key` if it was set less than `ttl` ago.
    ///
    /// An entry read exactly at `inserted_at + ttl` is expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        {
            let entry = self.entries.get(key)?;
            if self.is_fresh(&entry, now) {
                return Some(entry.value.clone());
            }
        }

        // Only drop the entry if it is still the expired one; a concurrent
        // `set` may already have replaced it.
        if self
            .entries
            .remove_if(key, |_, entry| !self.is_fresh(entry, now))
            .is_some()
        {
            trace!(target = "chess_stats::cache", "Removed expired cache entry");
        }
        None
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn set(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            inserted_at: self.clock.now(),
        };
        self.entries.insert(key, entry);
    }

    pub fn ttl(&self) -> Duration {
        Duration::try_from(self.ttl).unwrap_or(Duration::MAX)
    }

    /// Number of stored entries, expired ones included until they are read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: OffsetDateTime) -> bool {
        entry
            .inserted_at
            .checked_add(self.ttl)
            .is_none_or(|deadline| now < deadline)
    }
}
