//! Configuration errors.

use thiserror::Error;

/// Errors raised while loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_saphyr::Error),
    /// The JSON document could not be parsed.
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// The configured store was not compiled in.
    #[error("store {0} is not available, enable the matching crate feature")]
    StoreNotAvailable(String),
    /// A bounded store needs exactly one of `max_entries` or `max_bytes`.
    #[error("store {store} needs exactly one of max_entries or max_bytes")]
    InvalidCapacity {
        /// Store type.
        store: String,
    },
    /// A configured path is not an absolute path.
    #[error("{field} entry {path:?} must start with '/'")]
    InvalidPath {
        /// Configuration field holding the path.
        field: &'static str,
        /// The offending path.
        path: String,
    },
}
