//! Redis connection used by a single query execution.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use indexbox_backend::{RawHash, StoreConnection, StoreResult};
use indexbox_core::Circle;
use redis::aio::ConnectionManager;
use tracing::trace;

use crate::error::Error;

/// A clone of the store's [`ConnectionManager`] handed to one query.
///
/// Dropping it releases nothing but the handle; the underlying multiplexed
/// connection stays with the store.
#[derive(Clone)]
pub struct RedisConnection {
    pub(crate) manager: ConnectionManager,
}

impl RedisConnection {
    async fn members(&mut self, command: &str, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut cmd = redis::cmd(command);
        for key in keys {
            cmd.arg(key.as_ref());
        }
        let members: Vec<Vec<u8>> = cmd
            .query_async(&mut self.manager)
            .await
            .map_err(Error::from)?;
        trace!(command, keys = keys.len(), members = members.len(), "Set lookup");
        Ok(members.into_iter().map(Bytes::from).collect())
    }
}

#[async_trait]
impl StoreConnection for RedisConnection {
    async fn intersect(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        self.members("SINTER", keys).await
    }

    async fn union(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        self.members("SUNION", keys).await
    }

    async fn geo_radius(
        &mut self,
        key: &[u8],
        within: Circle,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Bytes>> {
        // GEORADIUS key longitude latitude radius unit [COUNT count]
        let mut cmd = redis::cmd("GEORADIUS");
        cmd.arg(key)
            .arg(within.center.x)
            .arg(within.center.y)
            .arg(within.radius.value)
            .arg(within.radius.metric.unit());
        if let Some(limit) = limit {
            cmd.arg("COUNT").arg(limit);
        }
        let members: Vec<Vec<u8>> = cmd
            .query_async(&mut self.manager)
            .await
            .map_err(Error::from)?;
        Ok(members.into_iter().map(Bytes::from).collect())
    }

    async fn hash_get_all(&mut self, keys: &[Bytes]) -> StoreResult<Vec<RawHash>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("HGETALL").arg(key.as_ref());
        }
        let hashes: Vec<HashMap<Vec<u8>, Vec<u8>>> = pipe
            .query_async(&mut self.manager)
            .await
            .map_err(Error::from)?;
        Ok(hashes.into_iter().map(RawHash::from).collect())
    }
}
