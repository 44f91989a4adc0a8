//! Persistent metadata of entity types.
//!
//! Each property path an entity exposes to queries is declared once with a
//! [`PropertyKind`]. Queries resolve their paths against this table instead of
//! inspecting the entity at runtime.
//!
//! ```
//! use indexbox_core::{EntityMetadata, PropertyKind};
//!
//! let metadata = EntityMetadata::builder("Person", "persons")
//!     .id("id")
//!     .indexed("firstname")
//!     .indexed("address.city")
//!     .geo_indexed("address.location")
//!     .property("age")
//!     .build();
//!
//! assert_eq!(metadata.resolve("id").unwrap().kind(), PropertyKind::Identifier);
//! assert!(metadata.resolve("address.country").is_err());
//! ```

use serde::{Serialize, de::DeserializeOwned};
use smol_str::SmolStr;

use crate::{IndexValue, Keyspace, MappingError};

/// Role of a persistent property in queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// The identifier. Predicates on it resolve to entity keys directly.
    Identifier,
    /// Backed by one index set per distinct value.
    Indexed,
    /// Backed by a geo set holding the entity position.
    GeoIndexed,
    /// Stored in the hash but not indexed.
    Plain,
}

/// A property path together with its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PersistentProperty {
    path: SmolStr,
    kind: PropertyKind,
}

impl PersistentProperty {
    /// Dotted property path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Role of the property.
    #[inline]
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// True for the identifier property.
    #[inline]
    pub fn is_id(&self) -> bool {
        self.kind == PropertyKind::Identifier
    }
}

/// Persistent metadata of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityMetadata {
    name: SmolStr,
    keyspace: Keyspace,
    properties: Vec<PersistentProperty>,
}

impl EntityMetadata {
    /// Starts describing an entity named `name` stored under `keyspace`.
    pub fn builder(name: impl Into<SmolStr>, keyspace: impl Into<Keyspace>) -> EntityMetadataBuilder {
        EntityMetadataBuilder {
            name: name.into(),
            keyspace: keyspace.into(),
            properties: Vec::new(),
        }
    }

    /// Entity name used in diagnostics.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Default keyspace of the entity.
    #[inline]
    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    /// All declared properties.
    #[inline]
    pub fn properties(&self) -> &[PersistentProperty] {
        &self.properties
    }

    /// The identifier property, if declared.
    pub fn id_property(&self) -> Option<&PersistentProperty> {
        self.properties.iter().find(|p| p.is_id())
    }

    /// Looks a path up.
    pub fn resolve(&self, path: &str) -> Result<&PersistentProperty, MappingError> {
        self.properties
            .iter()
            .find(|p| p.path == path)
            .ok_or_else(|| MappingError::UnknownProperty {
                entity: self.name.clone(),
                path: SmolStr::new(path),
            })
    }

    /// Looks a path up and requires it to carry a geo index.
    pub fn resolve_geo(&self, path: &str) -> Result<&PersistentProperty, MappingError> {
        let property = self.resolve(path)?;
        if property.kind != PropertyKind::GeoIndexed {
            return Err(MappingError::NotGeoIndexed {
                entity: self.name.clone(),
                path: property.path.clone(),
            });
        }
        Ok(property)
    }

    /// Properties backed by index sets.
    pub fn indexed(&self) -> impl Iterator<Item = &PersistentProperty> {
        self.properties
            .iter()
            .filter(|p| p.kind == PropertyKind::Indexed)
    }

    /// Properties backed by geo sets.
    pub fn geo_indexed(&self) -> impl Iterator<Item = &PersistentProperty> {
        self.properties
            .iter()
            .filter(|p| p.kind == PropertyKind::GeoIndexed)
    }
}

/// Builder for [`EntityMetadata`].
///
/// Declaring a path twice keeps the last declaration.
#[derive(Debug)]
pub struct EntityMetadataBuilder {
    name: SmolStr,
    keyspace: Keyspace,
    properties: Vec<PersistentProperty>,
}

impl EntityMetadataBuilder {
    /// Declares the identifier property.
    pub fn id(self, path: impl Into<SmolStr>) -> Self {
        self.property_of(path, PropertyKind::Identifier)
    }

    /// Declares a property backed by index sets.
    pub fn indexed(self, path: impl Into<SmolStr>) -> Self {
        self.property_of(path, PropertyKind::Indexed)
    }

    /// Declares a property backed by a geo set.
    pub fn geo_indexed(self, path: impl Into<SmolStr>) -> Self {
        self.property_of(path, PropertyKind::GeoIndexed)
    }

    /// Declares a plain, non-indexed property.
    pub fn property(self, path: impl Into<SmolStr>) -> Self {
        self.property_of(path, PropertyKind::Plain)
    }

    fn property_of(mut self, path: impl Into<SmolStr>, kind: PropertyKind) -> Self {
        let path = path.into();
        self.properties.retain(|p| p.path != path);
        self.properties.push(PersistentProperty { path, kind });
        self
    }

    /// Finishes the metadata.
    pub fn build(self) -> EntityMetadata {
        EntityMetadata {
            name: self.name,
            keyspace: self.keyspace,
            properties: self.properties,
        }
    }
}

/// A domain type persisted as a hash.
///
/// Implementations usually keep their metadata in a `static`:
///
/// ```
/// use std::sync::LazyLock;
/// use indexbox_core::{Entity, EntityMetadata, IndexValue};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct City {
///     id: u64,
///     name: String,
/// }
///
/// static CITY: LazyLock<EntityMetadata> = LazyLock::new(|| {
///     EntityMetadata::builder("City", "cities").id("id").indexed("name").build()
/// });
///
/// impl Entity for City {
///     fn metadata() -> &'static EntityMetadata {
///         &CITY
///     }
///
///     fn id(&self) -> IndexValue {
///         self.id.into()
///     }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Persistent metadata shared by all instances.
    fn metadata() -> &'static EntityMetadata;

    /// Identifier of this instance in on-wire form.
    fn id(&self) -> IndexValue;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> EntityMetadata {
        EntityMetadata::builder("Person", "persons")
            .id("id")
            .indexed("firstname")
            .geo_indexed("address.location")
            .property("age")
            .build()
    }

    #[test]
    fn test_resolve_known_path() {
        let metadata = person();
        let property = metadata.resolve("firstname").unwrap();
        assert_eq!(property.kind(), PropertyKind::Indexed);
        assert!(!property.is_id());
    }

    #[test]
    fn test_resolve_unknown_path() {
        let err = person().resolve("nickname").unwrap_err();
        assert_eq!(
            err,
            MappingError::UnknownProperty {
                entity: "Person".into(),
                path: "nickname".into(),
            }
        );
    }

    #[test]
    fn test_resolve_geo_requires_geo_index() {
        let metadata = person();
        assert!(metadata.resolve_geo("address.location").is_ok());
        assert!(matches!(
            metadata.resolve_geo("firstname"),
            Err(MappingError::NotGeoIndexed { .. })
        ));
    }

    #[test]
    fn test_redeclaring_a_path_replaces_it() {
        let metadata = EntityMetadata::builder("Person", "persons")
            .indexed("age")
            .property("age")
            .build();
        assert_eq!(metadata.properties().len(), 1);
        assert_eq!(metadata.resolve("age").unwrap().kind(), PropertyKind::Plain);
    }

    #[test]
    fn test_id_property_is_optional() {
        let metadata = EntityMetadata::builder("Log", "logs").property("line").build();
        assert!(metadata.id_property().is_none());
        assert_eq!(person().id_property().unwrap().path(), "id");
    }
}
