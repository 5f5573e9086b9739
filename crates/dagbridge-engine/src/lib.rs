//! Ingestion-and-query bridge between a ledger's event DAG and a
//! graph-shaped backing store.
//!
//! The [`DagBridge`] owns the event header cache, the bounded
//! ingestion pipeline, and the store handle, and exposes the read
//! operations (existence, fetch, ancestor set, epoch get/set).
//! Backends implement the [`GraphStore`](dagbridge_store::GraphStore)
//! trait, so everything here runs unmodified against the in-memory
//! fake or a persistent store.

pub mod bridge;
pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod rate;

pub use bridge::{BridgeConfig, DagBridge, DEFAULT_QUEUE_CAPACITY, DEFAULT_REPORT_INTERVAL};
pub use cache::{DEFAULT_CACHE_CAPACITY, EventCache};
pub use config::BridgeSettings;
pub use error::BridgeError;
pub use pipeline::{FailurePolicy, IngestionPipeline};
pub use rate::{RateTracker, ReportGate};

#[cfg(test)]
mod tests;
