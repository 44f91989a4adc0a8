//! Keyspace type and the on-wire key layout.
//!
//! Every key the store sees is derived from a [`Keyspace`]:
//!
//! | key                                 | type      | members / fields        |
//! |-------------------------------------|-----------|-------------------------|
//! | `{keyspace}`                        | set       | all stored ids          |
//! | `{keyspace}:{id}`                   | hash      | flattened entity        |
//! | `{keyspace}:{path}:{value}`         | set       | ids with `path = value` |
//! | `{keyspace}:{geo_index_name(path)}` | geo set   | ids at their position   |
//! | `{keyspace}:{id}:idx`               | set       | index keys of one id    |
//!
//! ```
//! use indexbox_core::Keyspace;
//!
//! let keyspace = Keyspace::new("persons");
//! assert_eq!(&keyspace.entity_key(b"42")[..], b"persons:42");
//! assert_eq!(&keyspace.index_key("firstname", b"rand")[..], b"persons:firstname:rand");
//! assert_eq!(&keyspace.geo_key("address.location")[..], b"persons:address:location");
//! ```

use bytes::{BufMut, Bytes, BytesMut};
use smol_str::SmolStr;
use std::fmt;

const SEPARATOR: u8 = b':';
const INDEX_HELPER_SUFFIX: &[u8] = b":idx";

/// Logical namespace under which all keys of one entity type live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Keyspace(SmolStr);

impl Keyspace {
    /// Creates a new keyspace.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a keyspace from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the keyspace as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the registry set holding every id stored in this keyspace.
    pub fn registry_key(&self) -> Bytes {
        Bytes::copy_from_slice(self.0.as_bytes())
    }

    /// Key prefix shared by all entity and index keys: `{keyspace}:`.
    pub fn prefix(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.0.len() + 1);
        buf.put_slice(self.0.as_bytes());
        buf.put_u8(SEPARATOR);
        buf.freeze()
    }

    /// Hash key of a single entity: `{keyspace}:{id}`.
    pub fn entity_key(&self, id: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.0.len() + 1 + id.len());
        buf.put_slice(self.0.as_bytes());
        buf.put_u8(SEPARATOR);
        buf.put_slice(id);
        buf.freeze()
    }

    /// Secondary index set key: `{keyspace}:{path}:{value}`.
    pub fn index_key(&self, path: &str, value: &[u8]) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.0.len() + path.len() + value.len() + 2);
        buf.put_slice(self.0.as_bytes());
        buf.put_u8(SEPARATOR);
        buf.put_slice(path.as_bytes());
        buf.put_u8(SEPARATOR);
        buf.put_slice(value);
        buf.freeze()
    }

    /// Geo index key for a property path: `{keyspace}:{geo_index_name(path)}`.
    pub fn geo_key(&self, path: &str) -> Bytes {
        let name = geo_index_name(path);
        let mut buf = BytesMut::with_capacity(self.0.len() + 1 + name.len());
        buf.put_slice(self.0.as_bytes());
        buf.put_u8(SEPARATOR);
        buf.put_slice(name.as_bytes());
        buf.freeze()
    }

    /// Helper set listing the index keys an entity currently belongs to.
    pub fn index_helper_key(&self, id: &[u8]) -> Bytes {
        let mut buf =
            BytesMut::with_capacity(self.0.len() + 1 + id.len() + INDEX_HELPER_SUFFIX.len());
        buf.put_slice(self.0.as_bytes());
        buf.put_u8(SEPARATOR);
        buf.put_slice(id);
        buf.put_slice(INDEX_HELPER_SUFFIX);
        buf.freeze()
    }
}

/// Name of the geo index for a property path.
///
/// The last `.` of the path becomes a `:`, so `address.location` is stored
/// under `address:location`. Paths without a dot are returned unchanged.
pub fn geo_index_name(path: &str) -> SmolStr {
    match path.rfind('.') {
        Some(index) => {
            let mut name = String::with_capacity(path.len());
            name.push_str(&path[..index]);
            name.push(':');
            name.push_str(&path[index + 1..]);
            SmolStr::from(name)
        }
        None => SmolStr::new(path),
    }
}

impl fmt::Display for Keyspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Keyspace {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for Keyspace {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl AsRef<str> for Keyspace {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix() {
        assert_eq!(&Keyspace::new("persons").prefix()[..], b"persons:");
    }

    #[test]
    fn test_entity_key_with_binary_id() {
        let key = Keyspace::new_static("blobs").entity_key(&[0xff, 0x00]);
        assert_eq!(&key[..], b"blobs:\xff\x00");
    }

    #[test]
    fn test_index_key_nested_path() {
        let key = Keyspace::new("persons").index_key("address.city", b"Emond's Field");
        assert_eq!(&key[..], b"persons:address.city:Emond's Field");
    }

    #[test]
    fn test_geo_index_name() {
        assert_eq!(geo_index_name("location"), "location");
        assert_eq!(geo_index_name("address.location"), "address:location");
        assert_eq!(geo_index_name("a.b.c"), "a.b:c");
    }

    #[test]
    fn test_index_helper_key() {
        let key = Keyspace::new("persons").index_helper_key(b"7");
        assert_eq!(&key[..], b"persons:7:idx");
    }

    #[test]
    fn test_registry_key() {
        assert_eq!(&Keyspace::new("persons").registry_key()[..], b"persons");
    }
}
