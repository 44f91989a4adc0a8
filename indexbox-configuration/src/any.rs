use async_trait::async_trait;
use bytes::Bytes;
use indexbox_backend::{
    DeleteStatus, EntityWrite, RawEntity, RawHash, StoreAdapter, StoreConnection, StoreResult,
};
use indexbox_core::{Circle, Keyspace, Page};
use smol_str::SmolStr;

#[cfg(feature = "memory")]
use indexbox_memory::{MemoryConnection, MemoryStore};
#[cfg(feature = "redis")]
use indexbox_redis::{RedisConnection, RedisStore};

/// One of the compiled-in stores.
#[derive(Clone)]
pub enum AnyStore {
    /// Redis protocol server.
    #[cfg(feature = "redis")]
    Redis(RedisStore),
    /// Process-local store.
    #[cfg(feature = "memory")]
    Memory(MemoryStore),
}

/// Connection of an [`AnyStore`].
pub enum AnyConnection {
    /// Redis protocol server.
    #[cfg(feature = "redis")]
    Redis(RedisConnection),
    /// Process-local store.
    #[cfg(feature = "memory")]
    Memory(MemoryConnection),
}

#[async_trait]
impl StoreConnection for AnyConnection {
    async fn intersect(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        match self {
            #[cfg(feature = "redis")]
            AnyConnection::Redis(con) => con.intersect(keys).await,
            #[cfg(feature = "memory")]
            AnyConnection::Memory(con) => con.intersect(keys).await,
        }
    }

    async fn union(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        match self {
            #[cfg(feature = "redis")]
            AnyConnection::Redis(con) => con.union(keys).await,
            #[cfg(feature = "memory")]
            AnyConnection::Memory(con) => con.union(keys).await,
        }
    }

    async fn geo_radius(
        &mut self,
        key: &[u8],
        within: Circle,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Bytes>> {
        match self {
            #[cfg(feature = "redis")]
            AnyConnection::Redis(con) => con.geo_radius(key, within, limit).await,
            #[cfg(feature = "memory")]
            AnyConnection::Memory(con) => con.geo_radius(key, within, limit).await,
        }
    }

    async fn hash_get_all(&mut self, keys: &[Bytes]) -> StoreResult<Vec<RawHash>> {
        match self {
            #[cfg(feature = "redis")]
            AnyConnection::Redis(con) => con.hash_get_all(keys).await,
            #[cfg(feature = "memory")]
            AnyConnection::Memory(con) => con.hash_get_all(keys).await,
        }
    }
}

#[async_trait]
impl StoreAdapter for AnyStore {
    type Connection = AnyConnection;

    async fn connection(&self) -> StoreResult<AnyConnection> {
        match self {
            #[cfg(feature = "redis")]
            AnyStore::Redis(store) => store.connection().await.map(AnyConnection::Redis),
            #[cfg(feature = "memory")]
            AnyStore::Memory(store) => store.connection().await.map(AnyConnection::Memory),
        }
    }

    async fn get_all_of(&self, keyspace: &Keyspace, page: Page) -> StoreResult<Vec<RawEntity>> {
        match self {
            #[cfg(feature = "redis")]
            AnyStore::Redis(store) => store.get_all_of(keyspace, page).await,
            #[cfg(feature = "memory")]
            AnyStore::Memory(store) => store.get_all_of(keyspace, page).await,
        }
    }

    async fn count(&self, keyspace: &Keyspace) -> StoreResult<u64> {
        match self {
            #[cfg(feature = "redis")]
            AnyStore::Redis(store) => store.count(keyspace).await,
            #[cfg(feature = "memory")]
            AnyStore::Memory(store) => store.count(keyspace).await,
        }
    }

    async fn get(&self, keyspace: &Keyspace, id: &[u8]) -> StoreResult<Option<RawEntity>> {
        match self {
            #[cfg(feature = "redis")]
            AnyStore::Redis(store) => store.get(keyspace, id).await,
            #[cfg(feature = "memory")]
            AnyStore::Memory(store) => store.get(keyspace, id).await,
        }
    }

    async fn put(&self, write: EntityWrite) -> StoreResult<()> {
        match self {
            #[cfg(feature = "redis")]
            AnyStore::Redis(store) => store.put(write).await,
            #[cfg(feature = "memory")]
            AnyStore::Memory(store) => store.put(write).await,
        }
    }

    async fn delete(
        &self,
        keyspace: &Keyspace,
        id: &[u8],
        geo_paths: &[SmolStr],
    ) -> StoreResult<DeleteStatus> {
        match self {
            #[cfg(feature = "redis")]
            AnyStore::Redis(store) => store.delete(keyspace, id, geo_paths).await,
            #[cfg(feature = "memory")]
            AnyStore::Memory(store) => store.delete(keyspace, id, geo_paths).await,
        }
    }

    fn label(&self) -> &str {
        match self {
            #[cfg(feature = "redis")]
            AnyStore::Redis(store) => store.label(),
            #[cfg(feature = "memory")]
            AnyStore::Memory(store) => store.label(),
        }
    }
}
