use std::sync::Arc;

use async_trait::async_trait;
use indexbox_core::{Keyspace, Page};
use smol_str::SmolStr;

use crate::{EntityWrite, RawEntity, StoreConnection, StoreResult};

/// Outcome of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Entity removed.
    Deleted,
    /// Entity was already missing.
    Missing,
}

/// A key-value store holding entity hashes and their secondary indexes.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Connection handed out to a single query execution.
    type Connection: StoreConnection;

    /// Acquires a connection. It is released when dropped.
    async fn connection(&self) -> StoreResult<Self::Connection>;

    /// Every entity registered in `keyspace`, restricted to `page`.
    ///
    /// Ids whose hash is gone are skipped.
    async fn get_all_of(&self, keyspace: &Keyspace, page: Page) -> StoreResult<Vec<RawEntity>>;

    /// Number of ids registered in `keyspace`.
    async fn count(&self, keyspace: &Keyspace) -> StoreResult<u64>;

    /// A single entity hash, `None` when missing.
    async fn get(&self, keyspace: &Keyspace, id: &[u8]) -> StoreResult<Option<RawEntity>>;

    /// Replaces an entity hash and brings its index memberships up to date.
    async fn put(&self, write: EntityWrite) -> StoreResult<()>;

    /// Removes an entity hash, its registry entry and all its index
    /// memberships, including the geo sets of `geo_paths`.
    async fn delete(
        &self,
        keyspace: &Keyspace,
        id: &[u8],
        geo_paths: &[SmolStr],
    ) -> StoreResult<DeleteStatus>;

    /// Name of the store used in logs and metrics.
    fn label(&self) -> &str {
        "store"
    }
}

#[async_trait]
impl<A> StoreAdapter for Arc<A>
where
    A: StoreAdapter,
{
    type Connection = A::Connection;

    async fn connection(&self) -> StoreResult<Self::Connection> {
        (**self).connection().await
    }

    async fn get_all_of(&self, keyspace: &Keyspace, page: Page) -> StoreResult<Vec<RawEntity>> {
        (**self).get_all_of(keyspace, page).await
    }

    async fn count(&self, keyspace: &Keyspace) -> StoreResult<u64> {
        (**self).count(keyspace).await
    }

    async fn get(&self, keyspace: &Keyspace, id: &[u8]) -> StoreResult<Option<RawEntity>> {
        (**self).get(keyspace, id).await
    }

    async fn put(&self, write: EntityWrite) -> StoreResult<()> {
        (**self).put(write).await
    }

    async fn delete(
        &self,
        keyspace: &Keyspace,
        id: &[u8],
        geo_paths: &[SmolStr],
    ) -> StoreResult<DeleteStatus> {
        (**self).delete(keyspace, id, geo_paths).await
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}
