use bytes::Bytes;
use indexbox_core::{Entity, IndexValue, Point};
use serde_json::{Map, Value};
use smol_str::SmolStr;
use tracing::trace;

use super::{ConvertError, Converter};
use crate::{EntityWrite, GeoEntry, IndexEntry, RawEntity, RawHash};

/// Converter storing entities as flat hashes.
///
/// The serde JSON form of the entity is flattened into dotted paths: nested
/// objects become `address.city`, sequence elements `tags.[0]`. Each leaf is
/// stored JSON-encoded so numbers, booleans and strings survive the round
/// trip. Null leaves are omitted.
///
/// Index values are taken from the same JSON form: strings raw, numbers and
/// booleans by their textual representation, one entry per element when an
/// indexed path holds a sequence of scalars.
///
/// ```
/// use std::sync::LazyLock;
/// use indexbox_backend::{Converter, HashConverter};
/// use indexbox_core::{Entity, EntityMetadata, IndexValue};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct City {
///     id: u64,
///     name: String,
/// }
///
/// static CITY: LazyLock<EntityMetadata> =
///     LazyLock::new(|| EntityMetadata::builder("City", "cities").id("id").indexed("name").build());
///
/// impl Entity for City {
///     fn metadata() -> &'static EntityMetadata { &CITY }
///     fn id(&self) -> IndexValue { self.id.into() }
/// }
///
/// let write = HashConverter.write(&City { id: 1, name: "Caemlyn".into() }).unwrap();
/// assert_eq!(&write.entity.id[..], b"1");
/// assert_eq!(write.entity.hash.get(b"name").unwrap().as_ref(), b"\"Caemlyn\"");
/// assert_eq!(write.indexes[0].value, IndexValue::from("Caemlyn"));
///
/// let city: City = HashConverter.read(write.entity).unwrap();
/// assert_eq!(city.name, "Caemlyn");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HashConverter;

impl Converter for HashConverter {
    fn write<T: Entity>(&self, entity: &T) -> Result<EntityWrite, ConvertError> {
        let metadata = T::metadata();
        let value = serde_json::to_value(entity).map_err(ConvertError::Serialize)?;
        if !value.is_object() {
            return Err(ConvertError::NotAMap(kind_of(&value)));
        }

        let mut hash = RawHash::new();
        flatten("", &value, &mut hash)?;

        let mut indexes = Vec::new();
        for property in metadata.indexed() {
            let path = SmolStr::new(property.path());
            match lookup(&value, property.path()) {
                Some(Value::Array(items)) => {
                    indexes.extend(items.iter().filter_map(index_value).map(|value| IndexEntry {
                        path: path.clone(),
                        value,
                    }));
                }
                Some(leaf) => {
                    if let Some(value) = index_value(leaf) {
                        indexes.push(IndexEntry { path, value });
                    }
                }
                None => {}
            }
        }

        let geo = metadata
            .geo_indexed()
            .map(|property| {
                let path = SmolStr::new(property.path());
                let point = match lookup(&value, property.path()) {
                    None | Some(Value::Null) => None,
                    Some(leaf) => Some(
                        serde_json::from_value::<Point>(leaf.clone())
                            .map_err(|_| ConvertError::NotAPoint(path.clone()))?,
                    ),
                };
                Ok(GeoEntry { path, point })
            })
            .collect::<Result<Vec<_>, ConvertError>>()?;

        let id = self.convert_id(&entity.id());
        trace!(
            keyspace = %metadata.keyspace(),
            fields = hash.len(),
            indexes = indexes.len(),
            "Entity flattened"
        );

        Ok(EntityWrite {
            entity: RawEntity::new(id, metadata.keyspace().clone(), hash),
            indexes,
            geo,
        })
    }

    fn read<T: Entity>(&self, raw: RawEntity) -> Result<T, ConvertError> {
        let mut root = Value::Object(Map::new());
        // a flattened sequence spends one field per item
        let max_items = raw.hash.len();
        for (field, value) in raw.hash {
            let path =
                std::str::from_utf8(&field).map_err(|_| ConvertError::InvalidField(field.clone()))?;
            let leaf: Value =
                serde_json::from_slice(&value).map_err(|source| ConvertError::InvalidValue {
                    field: SmolStr::new(path),
                    source,
                })?;
            let segments: Vec<&str> = path.split('.').collect();
            insert(&mut root, &segments, leaf, max_items)
                .ok_or_else(|| ConvertError::InvalidField(field.clone()))?;
        }

        if let Some(id) = T::metadata().id_property()
            && lookup(&root, id.path()).is_none()
        {
            let segments: Vec<&str> = id.path().split('.').collect();
            insert(&mut root, &segments, id_value(&raw.id), max_items).ok_or_else(|| {
                ConvertError::InvalidField(Bytes::copy_from_slice(id.path().as_bytes()))
            })?;
        }

        serde_json::from_value(root).map_err(ConvertError::Deserialize)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_owned()
    } else {
        format!("{prefix}.{segment}")
    }
}

fn flatten(prefix: &str, value: &Value, hash: &mut RawHash) -> Result<(), ConvertError> {
    match value {
        Value::Null => Ok(()),
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                flatten(&join(prefix, key), child, hash)?;
            }
            Ok(())
        }
        Value::Array(items) if !items.is_empty() => {
            for (index, child) in items.iter().enumerate() {
                flatten(&join(prefix, &format!("[{index}]")), child, hash)?;
            }
            Ok(())
        }
        // Scalars and empty containers are stored as JSON leaves.
        _ if prefix.is_empty() => Ok(()),
        leaf => {
            let encoded = serde_json::to_vec(leaf).map_err(ConvertError::Serialize)?;
            hash.insert(Bytes::from(prefix.to_owned()), encoded);
            Ok(())
        }
    }
}

fn array_index(segment: &str) -> Option<usize> {
    segment
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|index| index.parse().ok())
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match array_index(segment) {
        Some(index) => current.get(index),
        None => current.get(segment),
    })
}

/// Places `leaf` under `segments`, growing arrays up to `max_items`.
///
/// Returns `None` for an array index at or past `max_items`.
fn insert(target: &mut Value, segments: &[&str], leaf: Value, max_items: usize) -> Option<()> {
    let Some((segment, rest)) = segments.split_first() else {
        *target = leaf;
        return Some(());
    };
    match array_index(segment) {
        Some(index) => {
            if index >= max_items {
                return None;
            }
            if !target.is_array() {
                *target = Value::Array(Vec::new());
            }
            let Value::Array(items) = target else {
                return None;
            };
            if items.len() <= index {
                items.resize(index + 1, Value::Null);
            }
            insert(&mut items[index], rest, leaf, max_items)
        }
        None => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            let Value::Object(map) = target else {
                return None;
            };
            let slot = map.entry(segment.to_string()).or_insert(Value::Null);
            insert(slot, rest, leaf, max_items)
        }
    }
}

fn index_value(value: &Value) -> Option<IndexValue> {
    match value {
        Value::String(s) => Some(IndexValue::from(s.as_str())),
        Value::Number(n) => Some(IndexValue::from(n.to_string())),
        Value::Bool(b) => Some(IndexValue::from(*b)),
        _ => None,
    }
}

/// Numeric ids go back as numbers, everything else as a string.
fn id_value(id: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(id) {
        Ok(number @ Value::Number(_)) => number,
        _ => Value::String(String::from_utf8_lossy(id).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexbox_core::EntityMetadata;
    use serde::{Deserialize, Serialize};
    use std::sync::LazyLock;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Address {
        city: String,
        location: Option<Point>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Person {
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        firstname: String,
        age: u32,
        active: bool,
        tags: Vec<String>,
        address: Address,
    }

    static PERSON: LazyLock<EntityMetadata> = LazyLock::new(|| {
        EntityMetadata::builder("Person", "persons")
            .id("id")
            .indexed("firstname")
            .indexed("tags")
            .indexed("address.city")
            .geo_indexed("address.location")
            .property("age")
            .build()
    });

    impl Entity for Person {
        fn metadata() -> &'static EntityMetadata {
            &PERSON
        }

        fn id(&self) -> IndexValue {
            self.id.as_deref().unwrap_or_default().into()
        }
    }

    fn rand() -> Person {
        Person {
            id: Some("1".into()),
            firstname: "rand".into(),
            age: 20,
            active: true,
            tags: vec!["dragon".into(), "shepherd".into()],
            address: Address {
                city: "Emond's Field".into(),
                location: Some(Point::new(-0.5, 51.2)),
            },
        }
    }

    #[test]
    fn test_write_flattens_nested_paths() {
        let write = HashConverter.write(&rand()).unwrap();
        let hash = &write.entity.hash;
        assert_eq!(hash.get(b"firstname").unwrap().as_ref(), b"\"rand\"");
        assert_eq!(hash.get(b"age").unwrap().as_ref(), b"20");
        assert_eq!(hash.get(b"active").unwrap().as_ref(), b"true");
        assert_eq!(hash.get(b"tags.[1]").unwrap().as_ref(), b"\"shepherd\"");
        assert_eq!(hash.get(b"address.location.x").unwrap().as_ref(), b"-0.5");
        assert_eq!(write.entity.keyspace.as_str(), "persons");
        assert_eq!(&write.entity.id[..], b"1");
    }

    #[test]
    fn test_write_collects_index_entries() {
        let write = HashConverter.write(&rand()).unwrap();
        let entries: Vec<(&str, &[u8])> = write
            .indexes
            .iter()
            .map(|entry| (entry.path.as_str(), entry.value.as_bytes()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("firstname", &b"rand"[..]),
                ("tags", &b"dragon"[..]),
                ("tags", &b"shepherd"[..]),
                ("address.city", &b"Emond's Field"[..]),
            ]
        );
        assert_eq!(
            write.geo,
            vec![GeoEntry {
                path: "address.location".into(),
                point: Some(Point::new(-0.5, 51.2)),
            }]
        );
    }

    #[test]
    fn test_unset_geo_property_yields_empty_entry() {
        let mut person = rand();
        person.address.location = None;
        let write = HashConverter.write(&person).unwrap();
        assert_eq!(write.geo[0].point, None);
        assert!(write.entity.hash.get(b"address.location").is_none());
    }

    #[test]
    fn test_read_restores_entity() {
        let person = rand();
        let write = HashConverter.write(&person).unwrap();
        let restored: Person = HashConverter.read(write.entity).unwrap();
        assert_eq!(restored, person);
    }

    #[test]
    fn test_read_attaches_missing_id() {
        let mut person = rand();
        person.id = None;
        let write = HashConverter.write(&person).unwrap();
        let raw = RawEntity::new("a7", write.entity.keyspace, write.entity.hash);
        let restored: Person = HashConverter.read(raw).unwrap();
        assert_eq!(restored.id.as_deref(), Some("a7"));
    }

    #[test]
    fn test_empty_sequence_survives() {
        let mut person = rand();
        person.tags.clear();
        let write = HashConverter.write(&person).unwrap();
        assert_eq!(write.entity.hash.get(b"tags").unwrap().as_ref(), b"[]");
        let restored: Person = HashConverter.read(write.entity).unwrap();
        assert!(restored.tags.is_empty());
    }

    #[test]
    fn test_read_rejects_garbage_value() {
        let hash: RawHash = [("firstname", "not json")].into_iter().collect();
        let raw = RawEntity::new("1", "persons".into(), hash);
        let err = HashConverter.read::<Person>(raw).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidValue { ref field, .. } if field == "firstname"));
    }

    #[test]
    fn test_read_rejects_out_of_range_index() {
        let write = HashConverter.write(&rand()).unwrap();
        let mut hash = write.entity.hash;
        hash.insert(Bytes::from_static(b"tags.[18446744073709551615]"), Bytes::from_static(b"\"x\""));
        let raw = RawEntity::new("1", "persons".into(), hash);
        let err = HashConverter.read::<Person>(raw).unwrap_err();
        assert!(
            matches!(err, ConvertError::InvalidField(ref field) if &field[..] == b"tags.[18446744073709551615]")
        );

        let hash: RawHash = [("firstname", "\"rand\""), ("tags.[1000000]", "\"x\"")]
            .into_iter()
            .collect();
        let raw = RawEntity::new("1", "persons".into(), hash);
        let err = HashConverter.read::<Person>(raw).unwrap_err();
        assert!(matches!(err, ConvertError::InvalidField(_)));
    }

    #[test]
    fn test_id_value() {
        assert_eq!(id_value(b"42"), Value::from(42));
        assert_eq!(id_value(b"abc"), Value::from("abc"));
        assert_eq!(id_value(b"true"), Value::from("true"));
    }
}
