//! Memory store implementation.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use indexbox_backend::{
    DeleteStatus, EntityWrite, RawEntity, RawHash, StoreAdapter, StoreResult,
};
use indexbox_core::{Keyspace, Page, Point};
use smol_str::SmolStr;
use tokio::sync::RwLock;
use tracing::trace;

use crate::{MemoryConnection, MemoryStoreBuilder, state::State};

/// In-memory store.
///
/// Clones share the same data. Writes of one entity are applied under a
/// single write lock, so readers never observe half of an update.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use indexbox_backend::{StoreAdapter, StoreConnection};
/// use indexbox_memory::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MemoryStore::new();
/// store.add_to_set("persons:firstname:rand", "1").await;
///
/// let mut connection = store.connection().await.unwrap();
/// let ids = connection
///     .union(&[Bytes::from_static(b"persons:firstname:rand")])
///     .await.unwrap();
/// assert_eq!(ids, vec!["1"]);
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    pub(crate) state: Arc<RwLock<State>>,
    pub(crate) label: SmolStr,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates new MemoryStore builder with default settings.
    #[must_use]
    pub fn builder() -> MemoryStoreBuilder {
        MemoryStoreBuilder::default()
    }

    /// Remove every key.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        state.hashes.clear();
        state.sets.clear();
        state.geo.clear();
    }

    /// Add a member to a set without touching anything else.
    pub async fn add_to_set(&self, key: impl Into<Bytes>, member: impl Into<Bytes>) -> bool {
        self.state.write().await.sadd(key.into(), member.into())
    }

    /// Remove a member from a set without touching anything else.
    pub async fn remove_from_set(&self, key: &[u8], member: &[u8]) -> bool {
        self.state.write().await.srem(key, member)
    }

    /// Members of a set, in insertion order.
    pub async fn set_members(&self, key: &[u8]) -> Vec<Bytes> {
        self.state.read().await.smembers(key)
    }

    /// Position of a member in a geo set.
    pub async fn geo_position(&self, key: &[u8], member: &[u8]) -> Option<Point> {
        let state = self.state.read().await;
        state
            .geo
            .get(key)
            .and_then(|positions| positions.get(member))
            .copied()
    }

    /// Replace a hash without touching anything else.
    pub async fn insert_hash(&self, key: impl Into<Bytes>, hash: RawHash) {
        self.state.write().await.hashes.insert(key.into(), hash);
    }

    /// Remove a hash without touching anything else.
    pub async fn remove_hash(&self, key: &[u8]) -> bool {
        self.state.write().await.hashes.remove(key).is_some()
    }

    /// Whether any value is stored at `key`.
    pub async fn contains_key(&self, key: &[u8]) -> bool {
        let state = self.state.read().await;
        state.hashes.contains_key(key) || state.sets.contains_key(key) || state.geo.contains_key(key)
    }
}

#[async_trait]
impl StoreAdapter for MemoryStore {
    type Connection = MemoryConnection;

    async fn connection(&self) -> StoreResult<MemoryConnection> {
        Ok(MemoryConnection {
            state: self.state.clone(),
        })
    }

    async fn get_all_of(&self, keyspace: &Keyspace, page: Page) -> StoreResult<Vec<RawEntity>> {
        let state = self.state.read().await;
        let ids = page.apply(state.smembers(&keyspace.registry_key()));
        Ok(ids
            .into_iter()
            .filter_map(|id| {
                let hash = state.hash(&keyspace.entity_key(&id));
                (!hash.is_empty()).then(|| RawEntity::new(id, keyspace.clone(), hash))
            })
            .collect())
    }

    async fn count(&self, keyspace: &Keyspace) -> StoreResult<u64> {
        Ok(self.state.read().await.scard(&keyspace.registry_key()) as u64)
    }

    async fn get(&self, keyspace: &Keyspace, id: &[u8]) -> StoreResult<Option<RawEntity>> {
        let hash = self.state.read().await.hash(&keyspace.entity_key(id));
        Ok((!hash.is_empty()).then(|| RawEntity::new(Bytes::copy_from_slice(id), keyspace.clone(), hash)))
    }

    async fn put(&self, write: EntityWrite) -> StoreResult<()> {
        let EntityWrite {
            entity,
            indexes,
            geo,
        } = write;
        let keyspace = &entity.keyspace;
        let id = entity.id;
        let helper = keyspace.index_helper_key(&id);

        let mut state = self.state.write().await;
        for stale in state.smembers(&helper) {
            state.srem(&stale, &id);
        }
        state.sets.remove(&helper);

        let entity_key = keyspace.entity_key(&id);
        if entity.hash.is_empty() {
            state.hashes.remove(&entity_key);
        } else {
            state.hashes.insert(entity_key, entity.hash);
        }
        state.sadd(keyspace.registry_key(), id.clone());

        for entry in &indexes {
            let index_key = keyspace.index_key(&entry.path, entry.value.as_bytes());
            state.sadd(index_key.clone(), id.clone());
            state.sadd(helper.clone(), index_key);
        }
        for entry in &geo {
            let geo_key = keyspace.geo_key(&entry.path);
            state.geo_remove(&geo_key, &id);
            if let Some(point) = entry.point {
                state.geo_add(geo_key, id.clone(), point);
            }
        }

        trace!(
            store = %self.label,
            keyspace = %keyspace,
            indexes = indexes.len(),
            "Entity written"
        );
        Ok(())
    }

    async fn delete(
        &self,
        keyspace: &Keyspace,
        id: &[u8],
        geo_paths: &[SmolStr],
    ) -> StoreResult<DeleteStatus> {
        let helper = keyspace.index_helper_key(id);

        let mut state = self.state.write().await;
        for stale in state.smembers(&helper) {
            state.srem(&stale, id);
        }
        state.sets.remove(&helper);
        for path in geo_paths {
            state.geo_remove(&keyspace.geo_key(path), id);
        }
        let registered = state.srem(&keyspace.registry_key(), id);
        let existed = state.hashes.remove(&keyspace.entity_key(id)).is_some();

        trace!(store = %self.label, keyspace = %keyspace, existed, "Entity deleted");
        Ok(if existed || registered {
            DeleteStatus::Deleted
        } else {
            DeleteStatus::Missing
        })
    }

    fn label(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexbox_backend::{GeoEntry, IndexEntry};
    use indexbox_core::IndexValue;

    fn write(id: &'static str, city: &'static str, point: Option<Point>) -> EntityWrite {
        let hash: RawHash = [("city", city)].into_iter().collect();
        EntityWrite {
            entity: RawEntity::new(id, Keyspace::new("persons"), hash),
            indexes: vec![IndexEntry {
                path: "city".into(),
                value: IndexValue::from(city),
            }],
            geo: vec![GeoEntry {
                path: "location".into(),
                point,
            }],
        }
    }

    #[tokio::test]
    async fn test_put_maintains_indexes() {
        let store = MemoryStore::new();
        store
            .put(write("1", "Tear", Some(Point::new(1.0, 1.0))))
            .await
            .unwrap();

        assert_eq!(store.set_members(b"persons").await, vec!["1"]);
        assert_eq!(store.set_members(b"persons:city:Tear").await, vec!["1"]);
        assert_eq!(
            store.set_members(b"persons:1:idx").await,
            vec!["persons:city:Tear"]
        );
        assert_eq!(
            store.geo_position(b"persons:location", b"1").await,
            Some(Point::new(1.0, 1.0))
        );
    }

    #[tokio::test]
    async fn test_put_replaces_stale_memberships() {
        let store = MemoryStore::new();
        store.put(write("1", "Tear", Some(Point::new(1.0, 1.0)))).await.unwrap();
        store.put(write("1", "Caemlyn", None)).await.unwrap();

        assert!(!store.contains_key(b"persons:city:Tear").await);
        assert_eq!(store.set_members(b"persons:city:Caemlyn").await, vec!["1"]);
        assert_eq!(store.geo_position(b"persons:location", b"1").await, None);
        assert_eq!(store.count(&Keyspace::new("persons")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_removes_everything() {
        let store = MemoryStore::new();
        let keyspace = Keyspace::new("persons");
        store.put(write("1", "Tear", Some(Point::new(1.0, 1.0)))).await.unwrap();

        let status = store
            .delete(&keyspace, b"1", &[SmolStr::new("location")])
            .await
            .unwrap();
        assert_eq!(status, DeleteStatus::Deleted);
        for key in [
            &b"persons"[..],
            &b"persons:1"[..],
            &b"persons:1:idx"[..],
            &b"persons:city:Tear"[..],
            &b"persons:location"[..],
        ] {
            assert!(!store.contains_key(key).await, "{key:?} still present");
        }

        let status = store.delete(&keyspace, b"1", &[]).await.unwrap();
        assert_eq!(status, DeleteStatus::Missing);
    }

    #[tokio::test]
    async fn test_get_all_of_pages_and_skips_missing_hashes() {
        let store = MemoryStore::new();
        let keyspace = Keyspace::new("persons");
        for id in ["1", "2", "3"] {
            store.put(write(id, "Tear", None)).await.unwrap();
        }
        store.remove_hash(b"persons:2").await;

        let all = store.get_all_of(&keyspace, Page::unpaged()).await.unwrap();
        let ids: Vec<_> = all.iter().map(|raw| raw.id.clone()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let page = store.get_all_of(&keyspace, Page::new(2, 5)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, "3");
    }
}
