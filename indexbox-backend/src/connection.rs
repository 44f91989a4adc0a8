use async_trait::async_trait;
use bytes::Bytes;
use indexbox_core::Circle;

use crate::{RawHash, StoreResult};

/// Commands the query engine issues against a store.
///
/// A connection is owned by one query execution at a time and released when
/// dropped. Implementations must return empty results for empty key lists
/// without contacting the store.
#[async_trait]
pub trait StoreConnection: Send {
    /// Members present in every set, in the order of the first set (SINTER).
    async fn intersect(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>>;

    /// Members present in any set (SUNION).
    async fn union(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>>;

    /// Members of the geo set `key` located inside `within`, at most `limit`
    /// of them when a limit is given (GEORADIUS ... COUNT).
    async fn geo_radius(
        &mut self,
        key: &[u8],
        within: Circle,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Bytes>>;

    /// Full hashes stored at `keys`, one per key and in the same order. A
    /// missing key yields an empty hash.
    async fn hash_get_all(&mut self, keys: &[Bytes]) -> StoreResult<Vec<RawHash>>;
}
