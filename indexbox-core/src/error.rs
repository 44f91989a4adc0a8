//! Mapping errors.

use smol_str::SmolStr;
use thiserror::Error;

/// A predicate does not fit the persistent metadata of its entity.
///
/// Raised while a query is planned, before any store access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// The path does not name a persistent property of the entity.
    #[error("No property '{path}' found on entity '{entity}'")]
    UnknownProperty {
        /// Entity name.
        entity: SmolStr,
        /// Offending path.
        path: SmolStr,
    },

    /// A near predicate targets a property without a geo index.
    #[error("Property '{path}' of entity '{entity}' is not geo indexed")]
    NotGeoIndexed {
        /// Entity name.
        entity: SmolStr,
        /// Offending path.
        path: SmolStr,
    },
}
