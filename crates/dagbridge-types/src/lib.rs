//! Shared types for dagbridge.
//!
//! This crate defines the identifiers and the event data model used
//! across the workspace: [`EventId`] (content hash), [`Creator`],
//! [`Epoch`], and the immutable [`Event`] header with its parent
//! references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Content-addressed identifier for an event: `blake3(event content)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct EventId([u8; 32]);

impl EventId {
    /// Create an ID by hashing arbitrary data with BLAKE3.
    pub fn from_data(data: &[u8]) -> Self {
        Self(blake3::hash(data).into())
    }

    /// Return the raw 32-byte representation.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for EventId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for EventId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({self})")
    }
}

/// Identifier of the validator that created an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Creator(pub u32);

impl fmt::Display for Creator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The ledger's current processing era.
///
/// A singleton monotonic counter in the backing store. The store
/// bootstraps it to 1; this layer performs no monotonicity checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Epoch(pub u32);

impl Default for Epoch {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable node in the causal history graph.
///
/// Identified by the content hash of its header fields; carries zero
/// or more parent references (causal predecessors). Owned by the
/// ledger subsystem — dagbridge only reads and persists events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// blake3 hash of `(creator, epoch, seq, frame, lamport, parents)`.
    pub id: EventId,
    /// Validator that created this event.
    pub creator: Creator,
    /// Epoch the event belongs to.
    pub epoch: Epoch,
    /// Sequence number within the creator's own chain.
    pub seq: u32,
    /// Consensus frame the event was assigned to.
    pub frame: u32,
    /// Lamport timestamp.
    pub lamport: u32,
    /// Hashes of parent events (directed PARENT edges, acyclic).
    pub parents: Vec<EventId>,
}

/// Hashable content of an [`Event`] (everything but `id`).
#[derive(Serialize)]
struct HashableContent<'a> {
    creator: Creator,
    epoch: Epoch,
    seq: u32,
    frame: u32,
    lamport: u32,
    parents: &'a [EventId],
}

impl Event {
    /// Create an event, deriving its ID from the content hash.
    pub fn new(
        creator: Creator,
        epoch: Epoch,
        seq: u32,
        frame: u32,
        lamport: u32,
        parents: Vec<EventId>,
    ) -> Self {
        let id = Self::compute_id(creator, epoch, seq, frame, lamport, &parents);
        Self {
            id,
            creator,
            epoch,
            seq,
            frame,
            lamport,
            parents,
        }
    }

    /// Compute the blake3 content hash of an event's header fields.
    pub fn compute_id(
        creator: Creator,
        epoch: Epoch,
        seq: u32,
        frame: u32,
        lamport: u32,
        parents: &[EventId],
    ) -> EventId {
        let content = HashableContent {
            creator,
            epoch,
            seq,
            frame,
            lamport,
            parents,
        };
        let bytes = postcard::to_allocvec(&content).expect("serialization should not fail");
        EventId::from_data(&bytes)
    }

    /// Verify that the stored ID matches the event's content.
    pub fn verify_id(&self) -> bool {
        let expected = Self::compute_id(
            self.creator,
            self.epoch,
            self.seq,
            self.frame,
            self.lamport,
            &self.parents,
        );
        self.id == expected
    }
}
