//! File-based graph store backend.
//!
//! Stores one postcard-encoded record per event with a 2-level
//! fan-out directory structure: `{base_dir}/{hex[0..2]}/{hex[2..4]}/{hex}`.
//! The singleton epoch counter lives in `{base_dir}/epoch`.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use dagbridge_types::{Creator, Epoch, Event, EventId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::traits::GraphStore;

/// On-disk record for one event node.
///
/// `parents` holds only the PARENT edges that were created at commit
/// time, i.e. the parents that already had a node. Header fields are
/// stored verbatim.
#[derive(Debug, Serialize, Deserialize)]
struct EventRecord {
    creator: Creator,
    epoch: Epoch,
    seq: u32,
    frame: u32,
    lamport: u32,
    parents: Vec<EventId>,
}

/// File-based graph store with 2-level fan-out layout.
///
/// Writes are atomic: records are written to a temporary file first,
/// then renamed into place, so a crash never leaves a half-written
/// event behind. Event identity is unique by construction of the
/// path, which stands in for the uniqueness constraint a graph
/// database would enforce.
pub struct FileGraphStore {
    base_dir: PathBuf,
}

impl FileGraphStore {
    /// Create a file store rooted at the given directory.
    ///
    /// The directory is created if it does not exist.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    /// Compute the record path for an event ID.
    fn event_path(&self, id: &EventId) -> PathBuf {
        let hex = id.to_string();
        self.base_dir.join(&hex[0..2]).join(&hex[2..4]).join(&hex)
    }

    fn epoch_path(&self) -> PathBuf {
        self.base_dir.join("epoch")
    }

    async fn read_record(&self, id: EventId) -> Result<Option<EventRecord>, StoreError> {
        match tokio::fs::read(self.event_path(&id)).await {
            Ok(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Atomic write: temp file in the target directory, then rename.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp_path = path.with_extension("tmp");
        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl GraphStore for FileGraphStore {
    async fn bootstrap(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.base_dir).await?;
        let epoch_path = self.epoch_path();
        if tokio::fs::metadata(&epoch_path).await.is_err() {
            let bytes = postcard::to_allocvec(&Epoch(1))?;
            self.write_atomic(&epoch_path, &bytes).await?;
        }
        Ok(())
    }

    async fn put_event(&self, event: &Event) -> Result<(), StoreError> {
        let path = self.event_path(&event.id);
        if tokio::fs::metadata(&path).await.is_ok() {
            return Err(StoreError::DuplicateEvent(event.id));
        }

        let mut linked = Vec::with_capacity(event.parents.len());
        let mut missing = Vec::new();
        for parent in &event.parents {
            if tokio::fs::metadata(self.event_path(parent)).await.is_ok() {
                linked.push(*parent);
            } else {
                missing.push(*parent);
            }
        }

        let record = EventRecord {
            creator: event.creator,
            epoch: event.epoch,
            seq: event.seq,
            frame: event.frame,
            lamport: event.lamport,
            parents: linked,
        };
        let bytes = postcard::to_allocvec(&record)?;
        self.write_atomic(&path, &bytes).await?;

        debug!(event = %event.id, path = %path.display(), "committed event record");

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
        match tokio::fs::metadata(self.event_path(&id)).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn get_event(&self, id: EventId) -> Result<Option<Event>, StoreError> {
        let Some(record) = self.read_record(id).await? else {
            return Ok(None);
        };
        Ok(Some(Event {
            id,
            creator: record.creator,
            epoch: record.epoch,
            seq: record.seq,
            frame: record.frame,
            lamport: record.lamport,
            parents: record.parents,
        }))
    }

    async fn find_ancestors(&self, id: EventId) -> Result<Vec<EventId>, StoreError> {
        let mut seen: HashSet<EventId> = HashSet::new();
        let mut ancestors = Vec::new();
        let mut frontier = VecDeque::new();
        frontier.push_back(id);

        while let Some(current) = frontier.pop_front() {
            let Some(record) = self.read_record(current).await? else {
                continue;
            };
            for parent in record.parents {
                if seen.insert(parent) {
                    ancestors.push(parent);
                    frontier.push_back(parent);
                }
            }
        }

        Ok(ancestors)
    }

    async fn get_epoch(&self) -> Result<Epoch, StoreError> {
        match tokio::fs::read(self.epoch_path()).await {
            Ok(bytes) => Ok(postcard::from_bytes(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Epoch(1)),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn set_epoch(&self, epoch: Epoch) -> Result<(), StoreError> {
        let bytes = postcard::to_allocvec(&epoch)?;
        self.write_atomic(&self.epoch_path(), &bytes).await
    }
}
