use std::collections::{HashMap, VecDeque};
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use http::StatusCode;


/// A single cached upstream response, keyed by request path.
#[derive(Clone, Debug)]
pub struct CacheEntry {
    pub body: Bytes,
    pub content_type: String,
    pub status: StatusCode,
    pub inserted_at: SystemTime,
}

/// Byte-bounded response cache with least-recently-used eviction and a
/// freshness window. Entries older than the window behave as absent on
/// lookup. Charged size is the byte length of the stored body.
///
/// Operations take `now` explicitly so freshness is deterministic in tests;
/// callers pass `SystemTime::now()`.
pub struct ResponseCache {
    entries: HashMap<String, CacheEntry>,
    recency: VecDeque<String>, // front = least recently used
    total_bytes: usize,
    capacity_bytes: usize,
    freshness: Duration,
}

impl ResponseCache {
    pub fn new(capacity_bytes: usize, freshness: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            recency: VecDeque::new(),
            total_bytes: 0,
            capacity_bytes,
            freshness,
        }
    }

    /// Returns the entry if present and still fresh, refreshing its recency.
    /// A stale entry found here is removed and its bytes released.
    pub fn get(&mut self, key: &str, now: SystemTime) -> Option<CacheEntry> {
        let fresh = match self.entries.get(key) {
            Some(entry) => is_fresh(entry, self.freshness, now),
            None => return None,
        };
        if !fresh {
            self.remove(key);
            return None;
        }
        self.touch(key);
        self.entries.get(key).cloned()
    }

    /// Inserts or replaces an entry, then evicts least-recently-used entries
    /// until the charged size fits the capacity. A body larger than the whole
    /// capacity is never stored.
    pub fn put(
        &mut self,
        key: String,
        body: Bytes,
        content_type: String,
        status: StatusCode,
        now: SystemTime,
    ) {
        if body.len() > self.capacity_bytes {
            tracing::debug!(key = %key, size = body.len(), "body exceeds cache capacity, not stored");
            return;
        }

        self.remove(&key);
        self.total_bytes += body.len();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                body,
                content_type,
                status,
                inserted_at: now,
            },
        );
        self.recency.push_back(key);

        while self.total_bytes > self.capacity_bytes {
            if let Some(oldest) = self.recency.pop_front() {
                if let Some(evicted) = self.entries.remove(&oldest) {
                    self.total_bytes -= evicted.body.len();
                    tracing::debug!(key = %oldest, "evicted");
                }
            } else {
                break;
            }
        }
    }

    /// Removes the entry if present; returns whether it existed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove(key)
    }

    /// Existence check with the same freshness semantics as `get`, without
    /// mutating recency.
    pub fn has(&self, key: &str, now: SystemTime) -> bool {
        self.entries
            .get(key)
            .map(|entry| is_fresh(entry, self.freshness, now))
            .unwrap_or(false)
    }

    pub fn reset(&mut self) {
        self.entries.clear();
        self.recency.clear();
        self.total_bytes = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(entry) => {
                self.total_bytes -= entry.body.len();
                self.recency.retain(|k| k != key);
                true
            }
            None => false,
        }
    }

    fn touch(&mut self, key: &str) {
        self.recency.retain(|k| k != key);
        self.recency.push_back(key.to_string());
    }
}

fn is_fresh(entry: &CacheEntry, freshness: Duration, now: SystemTime) -> bool {
    now.duration_since(entry.inserted_at)
        .map(|age| age <= freshness)
        .unwrap_or(true)
}
