//! The graph store capability trait.

use dagbridge_types::{Epoch, Event, EventId};

use crate::error::StoreError;

/// The only boundary between dagbridge and the backing graph store.
///
/// Logical schema, backend-agnostic: an `Event` node per event with a
/// uniqueness constraint on its ID, a singleton `Epoch` counter, and
/// directed `PARENT` edges from each event to its causal
/// predecessors. All implementations must be `Send + Sync` so the
/// pipeline consumer and concurrent readers can share them.
#[async_trait::async_trait]
pub trait GraphStore: Send + Sync {
    /// Idempotently prepare the store: ensure the event/epoch
    /// structures exist and seed the singleton epoch to 1 if absent.
    async fn bootstrap(&self) -> Result<(), StoreError>;

    /// Commit an event header and its PARENT edges as one unit.
    ///
    /// An already-present event yields [`StoreError::DuplicateEvent`].
    /// Absent parents still commit the header plus the edges whose
    /// targets exist, then yield [`StoreError::MissingParents`].
    async fn put_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Check whether an event node exists.
    async fn has_event(&self, id: EventId) -> Result<bool, StoreError>;

    /// Fetch an event header with its parent edges. `None` if absent.
    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError>;

    /// Transitive closure over PARENT edges: every distinct ancestor
    /// of the given event, the event itself excluded.
    ///
    /// Backends may impose a maximum traversal depth and silently
    /// truncate the closure there.
    async fn find_ancestors(&self, id: EventId) -> Result<Vec<EventId>, StoreError>;

    /// Read the singleton epoch counter. 1 if it was never written.
    async fn get_epoch(&self) -> Result<Epoch, StoreError>;

    /// Unconditionally overwrite the singleton epoch counter.
    async fn set_epoch(&self, epoch: Epoch) -> Result<(), StoreError>;
}
