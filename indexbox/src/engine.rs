//! Execution of criteria against a store.
//!
//! A query is planned first: every property path of the criteria is resolved
//! against the entity metadata and turned into store keys. Only then is a
//! connection acquired, so a malformed query never reaches the store.
//!
//! Ids are gathered from three sources and merged by union, first-seen
//! order, duplicates dropped:
//!
//! 1. the AND group: a single predicate goes through the [`KeySelector`]
//!    (an identifier predicate needs no set read at all), several
//!    predicates always intersect their index sets;
//! 2. the OR group: the union of index sets followed by direct identifier
//!    keys;
//! 3. the near predicate: a geo-radius lookup bounded by the page rows.
//!
//! The merged list is paginated, the surviving hashes are fetched in one
//! pipelined round-trip, hashes that vanished in between are skipped and the
//! rest is converted and finally sorted.

use bytes::Bytes;
use indexbox_backend::{Converter, StoreAdapter, StoreConnection, StoreResult};
use indexbox_core::{
    Circle, Entity, EntityMetadata, Keyspace, MappingError, OperationChain, Page, PathAndValue,
};
use indexmap::IndexSet;
use tracing::{debug, trace};

use crate::{
    QueryResult, RawEntity, Sort,
    metrics::{self, Timer},
    selector::KeySelector,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetOperation {
    Intersect,
    Union,
}

/// Ids of one predicate group: keys usable as-is, plus index sets combined
/// with `operation`.
#[derive(Debug)]
struct GroupPlan {
    direct: Vec<Bytes>,
    keys: Vec<Bytes>,
    operation: SetOperation,
}

impl GroupPlan {
    async fn members<Con: StoreConnection>(&self, con: &mut Con) -> StoreResult<Vec<Bytes>> {
        if self.keys.is_empty() {
            return Ok(Vec::new());
        }
        match self.operation {
            SetOperation::Intersect => con.intersect(&self.keys).await,
            SetOperation::Union => con.union(&self.keys).await,
        }
    }

    /// Set members first, direct keys after them.
    async fn ids<Con: StoreConnection>(&self, con: &mut Con) -> StoreResult<Vec<Bytes>> {
        let mut ids = self.members(con).await?;
        ids.extend(self.direct.iter().cloned());
        Ok(ids)
    }

    /// Distinct ids of the group where a direct key only counts when its
    /// entity hash exists.
    async fn stored_ids<Con: StoreConnection>(
        &self,
        con: &mut Con,
        keyspace: &Keyspace,
    ) -> StoreResult<IndexSet<Bytes>> {
        let mut ids: IndexSet<Bytes> = self.members(con).await?.into_iter().collect();
        if !self.direct.is_empty() {
            let keys: Vec<Bytes> = self.direct.iter().map(|id| keyspace.entity_key(id)).collect();
            let hashes = con.hash_get_all(&keys).await?;
            ids.extend(
                self.direct
                    .iter()
                    .zip(hashes)
                    .filter(|(_, hash)| !hash.is_empty())
                    .map(|(id, _)| id.clone()),
            );
        }
        Ok(ids)
    }
}

#[derive(Debug)]
struct GeoPlan {
    key: Bytes,
    within: Circle,
}

#[derive(Debug)]
struct QueryPlan {
    and: GroupPlan,
    or: GroupPlan,
    near: Option<GeoPlan>,
}

impl QueryPlan {
    fn resolve<C: Converter>(
        converter: &C,
        criteria: &OperationChain,
        metadata: &EntityMetadata,
        keyspace: &Keyspace,
    ) -> Result<Self, MappingError> {
        let and_group = criteria.and_group();
        let and = if and_group.len() == 1 {
            let (direct, set_keys) =
                KeySelector::select(converter, and_group, metadata)?.into_parts();
            GroupPlan {
                direct,
                keys: index_keys(keyspace, &set_keys),
                operation: SetOperation::Intersect,
            }
        } else {
            for predicate in and_group {
                metadata.resolve(predicate.path())?;
            }
            GroupPlan {
                direct: Vec::new(),
                keys: index_keys(keyspace, and_group),
                operation: SetOperation::Intersect,
            }
        };

        let (direct, set_keys) =
            KeySelector::select(converter, criteria.or_group(), metadata)?.into_parts();
        let or = GroupPlan {
            direct,
            keys: index_keys(keyspace, &set_keys),
            operation: SetOperation::Union,
        };

        let near = match criteria.near_path() {
            Some(near) => {
                metadata.resolve_geo(near.path())?;
                Some(GeoPlan {
                    key: keyspace.geo_key(near.path()),
                    within: near.circle(),
                })
            }
            None => None,
        };

        debug!(
            and_direct = and.direct.len(),
            and_keys = and.keys.len(),
            or_direct = or.direct.len(),
            or_keys = or.keys.len(),
            near = near.is_some(),
            "Query planned"
        );
        Ok(Self { and, or, near })
    }

    async fn ids<Con: StoreConnection>(
        &self,
        con: &mut Con,
        limit: Option<usize>,
    ) -> StoreResult<IndexSet<Bytes>> {
        let mut ids = IndexSet::new();
        ids.extend(self.and.ids(con).await?);
        ids.extend(self.or.ids(con).await?);
        if let Some(near) = &self.near {
            ids.extend(con.geo_radius(&near.key, near.within, limit).await?);
        }
        Ok(ids)
    }
}

fn index_keys<'a, I>(keyspace: &Keyspace, predicates: I) -> Vec<Bytes>
where
    I: IntoIterator<Item = &'a PathAndValue>,
{
    predicates
        .into_iter()
        .flat_map(|predicate| {
            predicate
                .values()
                .iter()
                .map(move |value| keyspace.index_key(predicate.path(), value.as_bytes()))
        })
        .collect()
}

/// Executes criteria against a [`StoreAdapter`], converting hashes with a
/// [`Converter`].
///
/// Both collaborators are owned by the engine and passed in at construction.
/// The engine itself keeps no per-query state and can be shared freely.
#[derive(Clone)]
pub struct QueryEngine<A, C> {
    adapter: A,
    converter: C,
}

impl<A, C> QueryEngine<A, C>
where
    A: StoreAdapter,
    C: Converter,
{
    /// Creates an engine over `adapter`.
    pub fn new(adapter: A, converter: C) -> Self {
        Self { adapter, converter }
    }

    /// The store adapter.
    #[inline]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The converter.
    #[inline]
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// Entities of `keyspace` matching `criteria`, restricted to `page` and
    /// then ordered by `sort`.
    ///
    /// Sorting happens after pagination, it orders the page, not the whole
    /// result. Ids without a hash are skipped.
    #[tracing::instrument(skip_all, fields(keyspace = %keyspace, store = self.adapter.label()))]
    pub async fn find<T: Entity>(
        &self,
        criteria: &OperationChain,
        sort: Option<&Sort<T>>,
        page: Page,
        keyspace: &Keyspace,
    ) -> QueryResult<Vec<T>> {
        let timer = Timer::new();
        let (mut entities, missing) = if criteria.is_empty() {
            (self.find_all_of(keyspace, page).await?, 0)
        } else {
            let plan = QueryPlan::resolve(&self.converter, criteria, T::metadata(), keyspace)?;
            self.find_planned(&plan, page, keyspace).await?
        };

        if let Some(sort) = sort {
            sort.apply(&mut entities);
        }
        metrics::record_find(keyspace, timer.elapsed(), missing);
        Ok(entities)
    }

    /// Number of entities of `keyspace` matching `criteria`.
    ///
    /// For empty criteria this is the size of the keyspace registry.
    /// Otherwise the sizes of the AND ids and the OR ids are added up without
    /// removing ids found by both, so the result overcounts when the groups
    /// overlap. Identifier predicates count only stored entities. A near
    /// predicate is validated but does not contribute to the count.
    #[tracing::instrument(skip_all, fields(keyspace = %keyspace, store = self.adapter.label()))]
    pub async fn count<T: Entity>(
        &self,
        criteria: &OperationChain,
        keyspace: &Keyspace,
    ) -> QueryResult<u64> {
        metrics::record_count(keyspace);
        if criteria.is_empty() {
            return Ok(self.adapter.count(keyspace).await?);
        }

        let plan = QueryPlan::resolve(&self.converter, criteria, T::metadata(), keyspace)?;
        let mut con = self.adapter.connection().await?;

        let and = plan.and.stored_ids(&mut con, keyspace).await?;
        let or = plan.or.stored_ids(&mut con, keyspace).await?;

        trace!(and = and.len(), or = or.len(), "Counted");
        Ok((and.len() + or.len()) as u64)
    }

    async fn find_all_of<T: Entity>(&self, keyspace: &Keyspace, page: Page) -> QueryResult<Vec<T>> {
        let raws = self.adapter.get_all_of(keyspace, page).await?;
        trace!(entities = raws.len(), "Fetched whole keyspace page");
        raws.into_iter()
            .map(|raw| self.converter.read::<T>(raw).map_err(Into::into))
            .collect()
    }

    async fn find_planned<T: Entity>(
        &self,
        plan: &QueryPlan,
        page: Page,
        keyspace: &Keyspace,
    ) -> QueryResult<(Vec<T>, usize)> {
        let mut con = self.adapter.connection().await?;

        let ids = plan.ids(&mut con, page.limit()).await?;
        debug!(ids = ids.len(), "Ids collected");
        let ids = page.apply(ids.into_iter().collect());

        let keys: Vec<Bytes> = ids.iter().map(|id| keyspace.entity_key(id)).collect();
        let hashes = con.hash_get_all(&keys).await?;
        drop(con);

        let mut missing = 0;
        let mut entities = Vec::with_capacity(ids.len());
        for (id, hash) in ids.into_iter().zip(hashes) {
            if hash.is_empty() {
                trace!(id = ?id, "Skipping id without hash");
                missing += 1;
                continue;
            }
            let raw = RawEntity::new(id, keyspace.clone(), hash);
            entities.push(self.converter.read::<T>(raw)?);
        }
        Ok((entities, missing))
    }
}
