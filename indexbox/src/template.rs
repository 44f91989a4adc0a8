//! Entity-level access on top of a [`QueryEngine`].

use indexbox_backend::{Converter, DeleteStatus, HashConverter, StoreAdapter};
use indexbox_core::{Entity, IndexValue, OperationChain, Page};
use smol_str::SmolStr;
use tracing::debug;

use crate::{QueryEngine, QueryResult, Sort};

/// A query over one entity type: criteria, an optional ordering and a page.
///
/// # Examples
///
/// ```
/// use indexbox::{OperationChain, Page, Query, Sort};
///
/// struct Person { age: u32 }
///
/// let query = Query::new(OperationChain::new().and("firstname", "rand"))
///     .with_sort(Sort::by_key(|p: &Person| p.age))
///     .with_page(Page::new(0, 10));
/// assert_eq!(query.page().limit(), Some(10));
/// ```
#[derive(Debug)]
pub struct Query<T> {
    criteria: OperationChain,
    sort: Option<Sort<T>>,
    page: Page,
}

impl<T> Query<T> {
    /// Matches `criteria`, unsorted and unpaged.
    pub fn new(criteria: OperationChain) -> Self {
        Self {
            criteria,
            sort: None,
            page: Page::unpaged(),
        }
    }

    /// Matches every entity of the keyspace.
    pub fn all() -> Self {
        Self::new(OperationChain::new())
    }

    /// Orders the page with `sort`.
    #[must_use]
    pub fn with_sort(mut self, sort: Sort<T>) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Restricts the result to `page`.
    #[must_use]
    pub fn with_page(mut self, page: Page) -> Self {
        self.page = page;
        self
    }

    /// Criteria of the query.
    #[inline]
    pub fn criteria(&self) -> &OperationChain {
        &self.criteria
    }

    /// Ordering applied to the page.
    #[inline]
    pub fn sort(&self) -> Option<&Sort<T>> {
        self.sort.as_ref()
    }

    /// Requested page.
    #[inline]
    pub fn page(&self) -> Page {
        self.page
    }
}

/// Stores, loads, deletes and queries entities.
///
/// The keyspace of every operation comes from [`Entity::metadata`].
///
/// # Examples
///
/// ```
/// use std::sync::LazyLock;
/// use indexbox::{Entity, EntityMetadata, IndexValue, KeyValueTemplate, OperationChain, Query};
/// use indexbox_memory::MemoryStore;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct City {
///     id: String,
///     country: String,
/// }
///
/// static CITY: LazyLock<EntityMetadata> = LazyLock::new(|| {
///     EntityMetadata::builder("City", "cities").id("id").indexed("country").build()
/// });
///
/// impl Entity for City {
///     fn metadata() -> &'static EntityMetadata { &CITY }
///     fn id(&self) -> IndexValue { self.id.as_str().into() }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), indexbox::QueryError> {
/// let template = KeyValueTemplate::new(MemoryStore::new());
/// template.insert(&City { id: "tear".into(), country: "illian".into() }).await?;
///
/// let query = Query::new(OperationChain::new().and("country", "illian"));
/// let cities: Vec<City> = template.find(&query).await?;
/// assert_eq!(cities[0].id, "tear");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct KeyValueTemplate<A, C = HashConverter> {
    engine: QueryEngine<A, C>,
}

impl<A: StoreAdapter> KeyValueTemplate<A, HashConverter> {
    /// Creates a template converting entities with [`HashConverter`].
    pub fn new(adapter: A) -> Self {
        Self::with_converter(adapter, HashConverter)
    }
}

impl<A, C> KeyValueTemplate<A, C>
where
    A: StoreAdapter,
    C: Converter,
{
    /// Creates a template with a custom converter.
    pub fn with_converter(adapter: A, converter: C) -> Self {
        Self {
            engine: QueryEngine::new(adapter, converter),
        }
    }

    /// The underlying engine.
    #[inline]
    pub fn engine(&self) -> &QueryEngine<A, C> {
        &self.engine
    }

    /// Stores `entity`, replacing a previous version and its index entries.
    pub async fn insert<T: Entity>(&self, entity: &T) -> QueryResult<()> {
        let write = self.engine.converter().write(entity)?;
        debug!(
            keyspace = %write.entity.keyspace,
            indexes = write.indexes.len(),
            "Inserting entity"
        );
        self.engine.adapter().put(write).await?;
        Ok(())
    }

    /// Loads the entity with the given id.
    pub async fn find_by_id<T: Entity>(&self, id: impl Into<IndexValue>) -> QueryResult<Option<T>> {
        let id = self.engine.converter().convert_id(&id.into());
        let keyspace = T::metadata().keyspace();
        match self.engine.adapter().get(keyspace, &id).await? {
            Some(raw) => Ok(Some(self.engine.converter().read(raw)?)),
            None => Ok(None),
        }
    }

    /// Removes the entity with the given id together with its index entries.
    pub async fn delete<T: Entity>(&self, id: impl Into<IndexValue>) -> QueryResult<DeleteStatus> {
        let metadata = T::metadata();
        let id = self.engine.converter().convert_id(&id.into());
        let geo_paths: Vec<SmolStr> = metadata
            .geo_indexed()
            .map(|property| SmolStr::new(property.path()))
            .collect();
        let status = self
            .engine
            .adapter()
            .delete(metadata.keyspace(), &id, &geo_paths)
            .await?;
        debug!(keyspace = %metadata.keyspace(), ?status, "Entity delete");
        Ok(status)
    }

    /// Every entity of the keyspace, restricted to `page`.
    pub async fn find_all<T: Entity>(&self, page: Page) -> QueryResult<Vec<T>> {
        self.engine
            .find(&OperationChain::new(), None, page, T::metadata().keyspace())
            .await
    }

    /// Entities matching `query`.
    pub async fn find<T: Entity>(&self, query: &Query<T>) -> QueryResult<Vec<T>> {
        self.engine
            .find(
                query.criteria(),
                query.sort(),
                query.page(),
                T::metadata().keyspace(),
            )
            .await
    }

    /// Number of entities matching `criteria`.
    pub async fn count<T: Entity>(&self, criteria: &OperationChain) -> QueryResult<u64> {
        self.engine
            .count::<T>(criteria, T::metadata().keyspace())
            .await
    }
}
