use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use indexbox_backend::{RawHash, StoreConnection, StoreResult};
use indexbox_core::Circle;
use tokio::sync::RwLock;

use crate::state::State;

/// Connection of a [`MemoryStore`](crate::MemoryStore).
///
/// Every command takes the shared read lock for its own duration only, so
/// writers interleave between the commands of one query the same way they do
/// on a network store.
#[derive(Debug, Clone)]
pub struct MemoryConnection {
    pub(crate) state: Arc<RwLock<State>>,
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    async fn intersect(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        Ok(self.state.read().await.intersect(keys))
    }

    async fn union(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        Ok(self.state.read().await.union(keys))
    }

    async fn geo_radius(
        &mut self,
        key: &[u8],
        within: Circle,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Bytes>> {
        Ok(self.state.read().await.geo_radius(key, within, limit))
    }

    async fn hash_get_all(&mut self, keys: &[Bytes]) -> StoreResult<Vec<RawHash>> {
        let state = self.state.read().await;
        Ok(keys.iter().map(|key| state.hash(key)).collect())
    }
}
