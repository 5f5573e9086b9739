//! Error types for graph store operations.

use dagbridge_types::EventId;

/// Errors that can occur during graph store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The event is already present (uniqueness constraint on its ID).
    #[error("duplicate event: {0}")]
    DuplicateEvent(EventId),

    /// One or more parent nodes were absent when creating PARENT edges.
    ///
    /// The event header and the edges whose targets exist are still
    /// committed; ancestor queries return partial results until the
    /// missing parents arrive.
    #[error("missing parents for event {event}: {missing:?}")]
    MissingParents {
        /// The event whose edges could not all be created.
        event: EventId,
        /// Parent IDs with no corresponding node in the store.
        missing: Vec<EventId>,
    },

    /// An I/O error occurred.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode or decode a stored record.
    #[error("codec error: {0}")]
    Codec(#[from] postcard::Error),

    /// The store refused the operation (connectivity blip, injected
    /// fault). Never retried by callers; the ingestion path treats it
    /// as non-critical.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether this is an expected constraint-style rejection
    /// (duplicate commit, out-of-order parent) rather than a store
    /// communication failure. Both are swallowed by the ingestion
    /// path; this only steers the log wording.
    pub fn is_non_fatal(&self) -> bool {
        matches!(
            self,
            Self::DuplicateEvent(_) | Self::MissingParents { .. }
        )
    }
}
