//! Error types for store operations.

use crate::convert::ConvertError;
use thiserror::Error;

/// Error type for store operations.
///
/// Groups failures of store interactions so callers can tell a broken
/// connection from a rejected command. An empty result is never an error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Internal store error, state or command error.
    ///
    /// Any error not related to network interaction.
    #[error(transparent)]
    InternalError(Box<dyn std::error::Error + Send>),

    /// Network interaction error.
    ///
    /// Errors occurring during communication with remote stores (e.g., Redis).
    #[error(transparent)]
    ConnectionError(Box<dyn std::error::Error + Send>),

    /// Entity conversion error.
    #[error(transparent)]
    ConvertError(#[from] ConvertError),
}
