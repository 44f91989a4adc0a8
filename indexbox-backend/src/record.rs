//! Raw records exchanged with a store.

use std::collections::{BTreeMap, HashMap, btree_map};

use bytes::Bytes;
use indexbox_core::{IndexValue, Keyspace, Point};
use smol_str::SmolStr;

/// Field/value pairs of one entity hash, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHash(BTreeMap<Bytes, Bytes>);

impl RawHash {
    /// Creates an empty hash.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<Bytes>, value: impl Into<Bytes>) -> Option<Bytes> {
        self.0.insert(field.into(), value.into())
    }

    /// Value of a field.
    pub fn get(&self, field: &[u8]) -> Option<&Bytes> {
        self.0.get(field)
    }

    /// True when the hash holds no field. A missing key reads as an empty hash.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates fields in order.
    pub fn iter(&self) -> btree_map::Iter<'_, Bytes, Bytes> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for RawHash
where
    K: Into<Bytes>,
    V: Into<Bytes>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

impl From<HashMap<Vec<u8>, Vec<u8>>> for RawHash {
    fn from(map: HashMap<Vec<u8>, Vec<u8>>) -> Self {
        map.into_iter().collect()
    }
}

impl IntoIterator for RawHash {
    type Item = (Bytes, Bytes);
    type IntoIter = btree_map::IntoIter<Bytes, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RawHash {
    type Item = (&'a Bytes, &'a Bytes);
    type IntoIter = btree_map::Iter<'a, Bytes, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An entity hash together with the id and keyspace it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntity {
    /// Identifier in on-wire form.
    pub id: Bytes,
    /// Keyspace the entity lives in.
    pub keyspace: Keyspace,
    /// Flattened entity.
    pub hash: RawHash,
}

impl RawEntity {
    /// Creates a raw entity.
    pub fn new(id: impl Into<Bytes>, keyspace: Keyspace, hash: RawHash) -> Self {
        Self {
            id: id.into(),
            keyspace,
            hash,
        }
    }
}

/// Membership of an entity in the index set `{keyspace}:{path}:{value}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexEntry {
    /// Indexed property path.
    pub path: SmolStr,
    /// Current value of the property.
    pub value: IndexValue,
}

/// Position of an entity in the geo set of `path`, `None` when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoEntry {
    /// Geo indexed property path.
    pub path: SmolStr,
    /// Current position.
    pub point: Option<Point>,
}

/// Everything a store writes for one entity.
///
/// `indexes` lists the complete, current set of index memberships; stores
/// drop memberships not listed here. `geo` lists every geo indexed path of the
/// entity type, with or without a position.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityWrite {
    /// Entity hash.
    pub entity: RawEntity,
    /// Index set memberships.
    pub indexes: Vec<IndexEntry>,
    /// Geo set positions.
    pub geo: Vec<GeoEntry>,
}
