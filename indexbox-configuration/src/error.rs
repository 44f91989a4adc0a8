use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("Invalid configuration: {0}")]
    Parse(String),

    /// The configured store is not compiled in or could not be created.
    #[error("Store not available: {0}")]
    StoreNotAvailable(String),
}
