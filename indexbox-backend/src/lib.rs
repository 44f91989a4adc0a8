#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod adapter;
mod connection;
pub mod convert;
mod error;
mod record;

pub use adapter::{DeleteStatus, StoreAdapter};
pub use connection::StoreConnection;
pub use convert::{ConvertError, Converter, HashConverter};
pub use error::StoreError;
pub use record::{EntityWrite, GeoEntry, IndexEntry, RawEntity, RawHash};

/// Result of a store interaction.
pub type StoreResult<T> = Result<T, StoreError>;
