//! TOML configuration for embedding the bridge.
//!
//! All sections are optional; an empty file yields the defaults the
//! original import tool shipped with (queue of 10, cache of 500,
//! 8-second report limit, fire-and-forget saves, memory backend).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dagbridge_store::{FileGraphStore, GraphStore, MemoryGraphStore};
use serde::Deserialize;

use crate::bridge::{BridgeConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_REPORT_INTERVAL};
use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::BridgeError;

/// Top-level configuration, parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Ingestion pipeline tuning.
    pub ingest: IngestSection,
    /// Event header cache.
    pub cache: CacheSection,
    /// Graph store backend selection.
    pub store: StoreSection,
    /// Logging configuration.
    pub log: LogSection,
}

/// `[ingest]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    /// Maximum pending tasks in the bounded queue.
    pub queue_capacity: Option<usize>,
    /// Whether `save` waits for its commit to complete.
    pub synced: bool,
    /// Minimum seconds between progress lines.
    pub report_interval_secs: Option<u64>,
}

/// `[cache]` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    /// Maximum cached event headers. 0 disables caching.
    pub capacity: Option<usize>,
}

/// `[store]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Backend type: `"memory"` (default) or `"file"`.
    pub backend: String,
    /// Directory for the file backend's records.
    pub data_dir: Option<PathBuf>,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            data_dir: None,
        }
    }
}

/// `[log]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Log level filter (e.g. `"info"`, `"debug"`, `"trace"`).
    ///
    /// Subscriber installation is the embedding process's concern;
    /// this only carries the configured level to it.
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl BridgeSettings {
    /// Load settings from a TOML file, or use defaults if no path given.
    pub fn load(path: Option<&Path>) -> Result<Self, BridgeError> {
        match path {
            Some(p) => {
                let content = std::fs::read_to_string(p)?;
                Ok(toml::from_str(&content)?)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(s: &str) -> Result<Self, BridgeError> {
        Ok(toml::from_str(s)?)
    }

    /// Effective queue capacity.
    pub fn queue_capacity(&self) -> usize {
        self.ingest.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    /// Effective cache capacity.
    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity.unwrap_or(DEFAULT_CACHE_CAPACITY)
    }

    /// Effective report interval.
    pub fn report_interval(&self) -> Duration {
        self.ingest
            .report_interval_secs
            .map_or(DEFAULT_REPORT_INTERVAL, Duration::from_secs)
    }

    /// Runtime bridge configuration derived from these settings.
    ///
    /// Rejects a zero queue capacity: the bounded queue needs at
    /// least one slot to accept work.
    pub fn bridge_config(&self) -> Result<BridgeConfig, BridgeError> {
        if self.queue_capacity() == 0 {
            return Err(BridgeError::InvalidConfig(
                "ingest.queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(BridgeConfig {
            queue_capacity: self.queue_capacity(),
            cache_capacity: self.cache_capacity(),
            synced: self.ingest.synced,
            report_interval: self.report_interval(),
            failure_policy: Default::default(),
        })
    }

    /// Open the configured store backend.
    pub fn open_store(&self) -> Result<Arc<dyn GraphStore>, BridgeError> {
        match self.store.backend.as_str() {
            "memory" => Ok(Arc::new(MemoryGraphStore::new())),
            "file" => {
                let dir = self.store.data_dir.as_ref().ok_or_else(|| {
                    BridgeError::InvalidConfig(
                        "store.data_dir is required for the file backend".to_string(),
                    )
                })?;
                Ok(Arc::new(FileGraphStore::new(dir)?))
            }
            other => Err(BridgeError::InvalidConfig(format!(
                "unknown store backend: {other:?}"
            ))),
        }
    }
}
