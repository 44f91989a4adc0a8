//! Conversion between entities and raw store records.

use bytes::Bytes;
use indexbox_core::{Entity, IndexValue};
use smol_str::SmolStr;
use thiserror::Error;

use crate::{EntityWrite, RawEntity};

mod hash;

pub use hash::HashConverter;

/// Entity conversion error.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// The entity could not be serialized.
    #[error("failed to serialize entity: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The hash could not be turned back into the entity type.
    #[error("failed to deserialize entity: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// Entities must serialize to a map of properties.
    #[error("entity must serialize to a map, got {0}")]
    NotAMap(&'static str),

    /// A hash field name is not a valid property path.
    #[error("hash field is not valid UTF-8: {0:?}")]
    InvalidField(Bytes),

    /// A hash field value is not valid.
    #[error("invalid value for field '{field}': {source}")]
    InvalidValue {
        /// Field name.
        field: SmolStr,
        /// Parse error.
        source: serde_json::Error,
    },

    /// A geo indexed property does not hold a point.
    #[error("geo indexed property '{0}' does not hold a point")]
    NotAPoint(SmolStr),
}

/// Converts entities to raw records and back.
pub trait Converter: Send + Sync {
    /// Flattens an entity into its hash and collects its index memberships.
    fn write<T: Entity>(&self, entity: &T) -> Result<EntityWrite, ConvertError>;

    /// Rebuilds an entity from its hash. The id is attached when the hash
    /// does not carry it.
    fn read<T: Entity>(&self, raw: RawEntity) -> Result<T, ConvertError>;

    /// On-wire id for an identifier predicate value.
    fn convert_id(&self, value: &IndexValue) -> Bytes {
        value.to_bytes()
    }
}
