//! LRU cache for event headers read or written through the bridge.
//!
//! The cache absorbs read traffic and confirms recent writes without
//! a store round-trip. It is never authoritative: a hit reflects what
//! was (or is about to be) committed, and a miss never implies the
//! event is absent from the store.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use dagbridge_types::{Event, EventId};
use tracing::trace;

/// Default capacity, in entries.
pub const DEFAULT_CACHE_CAPACITY: usize = 500;

/// Thread-safe LRU cache mapping event ID → event header.
///
/// All operations acquire a single lock — this is fine because the
/// critical section is pure in-memory work (HashMap lookup / VecDeque
/// manipulation) with no I/O.
pub struct EventCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    /// Access order: front = oldest (eviction candidate), back = newest.
    order: VecDeque<EventId>,
    /// Cached headers.
    entries: HashMap<EventId, Event>,
}

impl EventCache {
    /// Create a cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner {
                order: VecDeque::new(),
                entries: HashMap::new(),
            }),
        }
    }

    /// Insert or refresh an event, evicting the oldest entry if full.
    pub fn put(&self, event: Event) {
        if self.capacity == 0 {
            return;
        }

        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let id = event.id;

        // If already cached, drop the stale position first.
        if inner.entries.remove(&id).is_some() {
            inner.order.retain(|e| *e != id);
        }

        while inner.entries.len() >= self.capacity {
            let Some(evict_id) = inner.order.pop_front() else {
                break;
            };
            inner.entries.remove(&evict_id);
            trace!(evicted = %evict_id, "evicted cached event header");
        }

        inner.entries.insert(id, event);
        inner.order.push_back(id);
    }

    /// Look up a cached event and promote it to most-recently-used.
    pub fn get(&self, id: &EventId) -> Option<Event> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        let event = inner.entries.get(id)?.clone();

        // Promote: remove from current position, push to back.
        inner.order.retain(|e| e != id);
        inner.order.push_back(*id);

        Some(event)
    }

    /// Whether the event is currently cached (no promotion).
    pub fn contains(&self, id: &EventId) -> bool {
        self.inner
            .lock()
            .expect("cache lock poisoned")
            .entries
            .contains_key(id)
    }

    /// Current number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .expect("cache lock poisoned")
            .entries
            .is_empty()
    }
}
