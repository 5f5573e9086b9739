//! Error types for the bridge engine.

use dagbridge_store::StoreError;

/// Errors that can occur while operating the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// `save` was called after the pipeline was closed.
    #[error("ingestion pipeline closed")]
    PipelineClosed,

    /// Failed to open or access a store backend.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An I/O error occurred (config loading).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the TOML configuration.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration is structurally valid but unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
