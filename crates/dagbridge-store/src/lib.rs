//! Graph store trait and backend implementations.
//!
//! This crate defines the [`GraphStore`] trait — the only boundary
//! between dagbridge and the backing graph store — along with three
//! backends:
//!
//! - [`MemoryGraphStore`] — in-memory store backed by a `RwLock`,
//!   doubling as the test fake.
//! - [`FileGraphStore`] — persistent store with one record per event
//!   and a 2-level fan-out directory layout.
//! - [`SlowGraphStore`] — latency-injecting wrapper for tests.

mod error;
mod file_store;
mod memory_store;
mod slow_store;
mod traits;

pub use error::StoreError;
pub use file_store::FileGraphStore;
pub use memory_store::MemoryGraphStore;
pub use slow_store::SlowGraphStore;
pub use traits::GraphStore;
