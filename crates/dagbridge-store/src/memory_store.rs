//! In-memory graph store backend.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};

use dagbridge_types::{Creator, Epoch, Event, EventId};
use tracing::debug;

use crate::error::StoreError;
use crate::traits::GraphStore;

/// Header fields of a committed event node (edges live separately).
#[derive(Debug, Clone)]
struct NodeRecord {
    creator: Creator,
    epoch: Epoch,
    seq: u32,
    frame: u32,
    lamport: u32,
}

struct Inner {
    /// Event ID → header properties.
    nodes: HashMap<EventId, NodeRecord>,
    /// PARENT edges created at commit time, child → parents.
    ///
    /// Only edges whose target existed when the child was committed;
    /// a late-arriving parent does not retroactively gain an edge.
    edges: HashMap<EventId, Vec<EventId>>,
    /// Singleton epoch counter. `None` until bootstrapped or set.
    epoch: Option<Epoch>,
}

/// In-memory graph store backed by a `RwLock`.
///
/// Doubles as the test fake for the pipeline and facade, and as the
/// backend for memory-only deployments.
pub struct MemoryGraphStore {
    inner: RwLock<Inner>,
    /// Ancestor traversal depth cap. `None` means unbounded.
    max_depth: Option<usize>,
    /// Fault injection: the next N put_event calls fail as transient.
    fail_next_puts: AtomicU32,
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGraphStore {
    /// Create an empty in-memory store with unbounded traversal.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                nodes: HashMap::new(),
                edges: HashMap::new(),
                epoch: None,
            }),
            max_depth: None,
            fail_next_puts: AtomicU32::new(0),
        }
    }

    /// Cap ancestor traversals at `depth` hops. The closure is
    /// silently truncated there, mirroring backends that enforce a
    /// maximum traversal depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Make the next `n` `put_event` calls fail with
    /// [`StoreError::Unavailable`]. For exercising the swallow path.
    pub fn fail_next_puts(&self, n: u32) {
        self.fail_next_puts.store(n, Ordering::Relaxed);
    }

    /// Number of committed event nodes.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").nodes.len()
    }

    /// Whether the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").nodes.is_empty()
    }
}

#[async_trait::async_trait]
impl GraphStore for MemoryGraphStore {
    async fn bootstrap(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().expect("lock poisoned");
        if inner.epoch.is_none() {
            inner.epoch = Some(Epoch(1));
        }
        Ok(())
    }

    async fn put_event(&self, event: &Event) -> Result<(), StoreError> {
        if self.fail_next_puts.load(Ordering::Relaxed) > 0 {
            self.fail_next_puts.fetch_sub(1, Ordering::Relaxed);
            return Err(StoreError::Unavailable("injected fault".to_string()));
        }

        let mut inner = self.inner.write().expect("lock poisoned");

        if inner.nodes.contains_key(&event.id) {
            return Err(StoreError::DuplicateEvent(event.id));
        }

        inner.nodes.insert(
            event.id,
            NodeRecord {
                creator: event.creator,
                epoch: event.epoch,
                seq: event.seq,
                frame: event.frame,
                lamport: event.lamport,
            },
        );

        // Link only the parents that are present; report the rest.
        let mut linked = Vec::with_capacity(event.parents.len());
        let mut missing = Vec::new();
        for parent in &event.parents {
            if inner.nodes.contains_key(parent) {
                linked.push(*parent);
            } else {
                missing.push(*parent);
            }
        }
        inner.edges.insert(event.id, linked);

        debug!(event = %event.id, parents = event.parents.len(), "committed event node");

        if missing.is_empty() {
            Ok(())
        } else {
            Err(StoreError::MissingParents {
                event: event.id,
                missing,
            })
        }
    }

    async fn has_event(&self, id: EventId) -> Result<bool, StoreError> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.nodes.contains_key(&id))
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        let inner = self.inner.read().expect("lock poisoned");
        let Some(record) = inner.nodes.get(&id) else {
            return Ok(None);
        };
        let parents = inner.edges.get(&id).cloned().unwrap_or_default();
        Ok(Some(Event {
            id,
            creator: record.creator,
            epoch: record.epoch,
            seq: record.seq,
            frame: record.frame,
            lamport: record.lamport,
            parents,
        }))
    }

    async fn find_ancestors(&self, id: EventId) -> Result<Vec<EventId>, StoreError> {
        let inner = self.inner.read().expect("lock poisoned");

        // Breadth-first over PARENT edges. The source DAG is acyclic,
        // so `seen` only guards against duplicate work on shared
        // ancestry, not against cycles.
        let mut seen: HashSet<EventId> = HashSet::new();
        let mut ancestors = Vec::new();
        let mut frontier = VecDeque::new();
        frontier.push_back((id, 0usize));

        while let Some((current, depth)) = frontier.pop_front() {
            if let Some(max) = self.max_depth {
                if depth >= max {
                    continue;
                }
            }
            let Some(parents) = inner.edges.get(&current) else {
                continue;
            };
            for parent in parents {
                if seen.insert(*parent) {
                    ancestors.push(*parent);
                    frontier.push_back((*parent, depth + 1));
                }
            }
        }

        Ok(ancestors)
    }

    async fn get_epoch(&self) -> Result<Epoch, StoreError> {
        let inner = self.inner.read().expect("lock poisoned");
        Ok(inner.epoch.unwrap_or_default())
    }

    async fn set_epoch(&self, epoch: Epoch) -> Result<(), StoreError> {
        let mut inner = self.inner.write().expect("lock poisoned");
        inner.epoch = Some(epoch);
        Ok(())
    }
}
