//! Error types for Redis store operations.
//!
//! All errors can be converted to [`StoreError`] for uniform error handling
//! across stores.
//!
//! [`StoreError`]: indexbox_backend::StoreError

use indexbox_backend::StoreError;
use redis::RedisError;

/// Error type for Redis store operations.
///
/// # When You'll Encounter This
///
/// - Using [`RedisStoreBuilder::build`] with an invalid connection URL
/// - Performing the first query when Redis is unreachable
///   (connection is established lazily)
/// - Performing queries when the Redis server returns an error
///
/// During queries this error is converted to [`StoreError`]: I/O failures
/// become [`StoreError::ConnectionError`], everything else
/// [`StoreError::InternalError`].
///
/// [`RedisStoreBuilder::build`]: crate::RedisStoreBuilder::build
/// [`StoreError`]: indexbox_backend::StoreError
/// [`StoreError::ConnectionError`]: indexbox_backend::StoreError::ConnectionError
/// [`StoreError::InternalError`]: indexbox_backend::StoreError::InternalError
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the underlying Redis client.
    ///
    /// This includes connection failures, protocol errors, authentication
    /// failures, and command execution errors.
    #[error("Redis store error: {0}")]
    Redis(#[from] RedisError),
}

impl From<Error> for StoreError {
    fn from(error: Error) -> Self {
        match error {
            Error::Redis(ref source) if source.is_io_error() || source.is_connection_dropped() => {
                Self::ConnectionError(Box::new(error))
            }
            Error::Redis(_) => Self::InternalError(Box::new(error)),
        }
    }
}
