use indexbox_backend::{ConvertError, StoreError};
use indexbox_core::MappingError;
use thiserror::Error;

/// Error of a query or template operation.
///
/// An empty result is never an error: a query that matches nothing returns
/// an empty list or a zero count.
#[derive(Error, Debug)]
pub enum QueryError {
    /// A store round-trip failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A property path could not be resolved against the entity metadata.
    /// Raised before the store is touched.
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// A hash could not be converted into the entity or back.
    #[error(transparent)]
    Convert(#[from] ConvertError),
}

/// Result of a query or template operation.
pub type QueryResult<T> = Result<T, QueryError>;
