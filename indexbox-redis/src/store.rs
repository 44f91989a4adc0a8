//! Redis store implementation.

use async_trait::async_trait;
use bytes::Bytes;
use indexbox_backend::{
    DeleteStatus, EntityWrite, RawEntity, StoreAdapter, StoreConnection, StoreError, StoreResult,
};
use indexbox_core::{Keyspace, Page};
use redis::{Client, aio::ConnectionManager};
use smol_str::SmolStr;
use tokio::sync::OnceCell;
use tracing::trace;

use crate::{connection::RedisConnection, error::Error};

/// Redis store based on redis-rs crate.
///
/// This struct provides Redis as a [`StoreAdapter`] for indexbox.
/// It uses a [`ConnectionManager`] for asynchronous network interaction.
///
/// [`ConnectionManager`]: redis::aio::ConnectionManager
/// [`StoreAdapter`]: indexbox_backend::StoreAdapter
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    connection: OnceCell<ConnectionManager>,
    label: SmolStr,
}

impl RedisStore {
    /// Create new store instance with default settings.
    ///
    /// # Examples
    /// ```
    /// use indexbox_redis::RedisStore;
    ///
    /// let store = RedisStore::new().unwrap();
    /// ```
    pub fn new() -> Result<Self, Error> {
        Self::builder().build()
    }

    /// Creates new RedisStore builder with default settings.
    #[must_use]
    pub fn builder() -> RedisStoreBuilder {
        RedisStoreBuilder::default()
    }

    /// Create lazy connection to redis via [`ConnectionManager`]
    pub async fn manager(&self) -> Result<&ConnectionManager, StoreError> {
        trace!("Get connection manager");
        let manager = self
            .connection
            .get_or_try_init(|| {
                trace!("Initialize new redis connection manager");
                self.client.get_connection_manager()
            })
            .await
            .map_err(Error::from)?;
        Ok(manager)
    }
}

/// Part of builder pattern implementation for RedisStore.
pub struct RedisStoreBuilder {
    connection_info: String,
    label: SmolStr,
}

impl Default for RedisStoreBuilder {
    fn default() -> Self {
        Self {
            connection_info: "redis://127.0.0.1/".to_owned(),
            label: SmolStr::new_static("redis"),
        }
    }
}

impl RedisStoreBuilder {
    /// Set connection info (host, port, database, etc.) for RedisStore.
    pub fn server(mut self, connection_info: impl Into<String>) -> Self {
        self.connection_info = connection_info.into();
        self
    }

    /// Set a custom label for this store, used in logs and metrics.
    pub fn label(mut self, label: impl Into<SmolStr>) -> Self {
        self.label = label.into();
        self
    }

    /// Create new instance of Redis store with passed settings.
    pub fn build(self) -> Result<RedisStore, Error> {
        Ok(RedisStore {
            client: Client::open(self.connection_info)?,
            connection: OnceCell::new(),
            label: self.label,
        })
    }
}

#[async_trait]
impl StoreAdapter for RedisStore {
    type Connection = RedisConnection;

    async fn connection(&self) -> StoreResult<RedisConnection> {
        Ok(RedisConnection {
            manager: self.manager().await?.clone(),
        })
    }

    async fn get_all_of(&self, keyspace: &Keyspace, page: Page) -> StoreResult<Vec<RawEntity>> {
        let mut con = self.connection().await?;

        let ids: Vec<Vec<u8>> = redis::cmd("SMEMBERS")
            .arg(keyspace.registry_key().as_ref())
            .query_async(&mut con.manager)
            .await
            .map_err(Error::from)?;
        let ids: Vec<Bytes> = page.apply(ids).into_iter().map(Bytes::from).collect();

        let keys: Vec<Bytes> = ids.iter().map(|id| keyspace.entity_key(id)).collect();
        let hashes = con.hash_get_all(&keys).await?;

        Ok(ids
            .into_iter()
            .zip(hashes)
            .filter(|(_, hash)| !hash.is_empty())
            .map(|(id, hash)| RawEntity::new(id, keyspace.clone(), hash))
            .collect())
    }

    async fn count(&self, keyspace: &Keyspace) -> StoreResult<u64> {
        let mut con = self.manager().await?.clone();
        let count: u64 = redis::cmd("SCARD")
            .arg(keyspace.registry_key().as_ref())
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        Ok(count)
    }

    async fn get(&self, keyspace: &Keyspace, id: &[u8]) -> StoreResult<Option<RawEntity>> {
        let mut con = self.connection().await?;
        let hash = con
            .hash_get_all(&[keyspace.entity_key(id)])
            .await?
            .pop()
            .unwrap_or_default();
        Ok((!hash.is_empty())
            .then(|| RawEntity::new(Bytes::copy_from_slice(id), keyspace.clone(), hash)))
    }

    async fn put(&self, write: EntityWrite) -> StoreResult<()> {
        let mut con = self.manager().await?.clone();
        let EntityWrite {
            entity,
            indexes,
            geo,
        } = write;
        let keyspace = &entity.keyspace;
        let id = entity.id.as_ref();
        let entity_key = keyspace.entity_key(id);
        let helper = keyspace.index_helper_key(id);

        let stale: Vec<Vec<u8>> = redis::cmd("SMEMBERS")
            .arg(helper.as_ref())
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;

        // MULTI/EXEC: drop stale memberships, rewrite hash, add current memberships
        let mut pipe = redis::pipe();
        pipe.atomic();
        for index_key in &stale {
            pipe.cmd("SREM").arg(index_key).arg(id).ignore();
        }
        pipe.cmd("DEL").arg(helper.as_ref()).ignore();
        pipe.cmd("DEL").arg(entity_key.as_ref()).ignore();
        if !entity.hash.is_empty() {
            let mut hset = redis::cmd("HSET");
            hset.arg(entity_key.as_ref());
            for (field, value) in &entity.hash {
                hset.arg(field.as_ref()).arg(value.as_ref());
            }
            pipe.add_command(hset).ignore();
        }
        pipe.cmd("SADD")
            .arg(keyspace.registry_key().as_ref())
            .arg(id)
            .ignore();
        for entry in &indexes {
            let index_key = keyspace.index_key(&entry.path, entry.value.as_bytes());
            pipe.cmd("SADD").arg(index_key.as_ref()).arg(id).ignore();
            pipe.cmd("SADD")
                .arg(helper.as_ref())
                .arg(index_key.as_ref())
                .ignore();
        }
        for entry in &geo {
            let geo_key = keyspace.geo_key(&entry.path);
            pipe.cmd("ZREM").arg(geo_key.as_ref()).arg(id).ignore();
            if let Some(point) = entry.point {
                pipe.cmd("GEOADD")
                    .arg(geo_key.as_ref())
                    .arg(point.x)
                    .arg(point.y)
                    .arg(id)
                    .ignore();
            }
        }

        pipe.query_async::<()>(&mut con)
            .await
            .map_err(Error::from)?;
        trace!(
            store = %self.label,
            keyspace = %keyspace,
            stale = stale.len(),
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
        let mut con = self.manager().await?.clone();
        let helper = keyspace.index_helper_key(id);

        let stale: Vec<Vec<u8>> = redis::cmd("SMEMBERS")
            .arg(helper.as_ref())
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for index_key in &stale {
            pipe.cmd("SREM").arg(index_key).arg(id).ignore();
        }
        for path in geo_paths {
            pipe.cmd("ZREM")
                .arg(keyspace.geo_key(path).as_ref())
                .arg(id)
                .ignore();
        }
        pipe.cmd("DEL").arg(helper.as_ref()).ignore();
        pipe.cmd("SREM").arg(keyspace.registry_key().as_ref()).arg(id);
        pipe.cmd("DEL").arg(keyspace.entity_key(id).as_ref());

        let (registered, deleted): (u64, u64) = pipe
            .query_async(&mut con)
            .await
            .map_err(Error::from)?;
        trace!(store = %self.label, keyspace = %keyspace, deleted, "Entity deleted");

        Ok(if registered > 0 || deleted > 0 {
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

    #[test]
    fn test_builder_defaults() {
        let store = RedisStore::builder().build().unwrap();
        assert_eq!(store.label(), "redis");
    }

    #[test]
    fn test_builder_label() {
        let store = RedisStore::builder()
            .server("redis://localhost:6380/2")
            .label("persons")
            .build()
            .unwrap();
        assert_eq!(store.label(), "persons");
    }

    #[test]
    fn test_invalid_url() {
        let result = RedisStore::builder().server("not-a-valid-url").build();
        assert!(matches!(result, Err(Error::Redis(_))));
    }
}
