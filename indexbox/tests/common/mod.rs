#![allow(dead_code)]

use std::io;
use std::sync::{Arc, LazyLock, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use indexbox::{
    Circle, DeleteStatus, Entity, EntityMetadata, IndexValue, KeyValueTemplate, Keyspace, Page,
    Point, RawEntity, RawHash, StoreAdapter, StoreConnection, StoreError, StoreResult,
};
use indexbox_backend::EntityWrite;
use indexbox_memory::{MemoryConnection, MemoryStore};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub const PALERMO: Point = Point::new(13.361389, 38.115556);
pub const CATANIA: Point = Point::new(15.087269, 37.502669);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub city: String,
    pub location: Option<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub firstname: String,
    pub lastname: String,
    pub age: u32,
    pub address: Option<Address>,
}

static PERSON: LazyLock<EntityMetadata> = LazyLock::new(|| {
    EntityMetadata::builder("Person", "persons")
        .id("id")
        .indexed("firstname")
        .indexed("lastname")
        .indexed("age")
        .indexed("address.city")
        .geo_indexed("address.location")
        .property("nickname")
        .build()
});

impl Entity for Person {
    fn metadata() -> &'static EntityMetadata {
        &PERSON
    }

    fn id(&self) -> IndexValue {
        self.id.as_str().into()
    }
}

impl Person {
    pub fn new(id: &str, firstname: &str, lastname: &str, age: u32) -> Self {
        Self {
            id: id.to_owned(),
            firstname: firstname.to_owned(),
            lastname: lastname.to_owned(),
            age,
            address: None,
        }
    }

    pub fn living_in(mut self, city: &str, location: Option<Point>) -> Self {
        self.address = Some(Address {
            city: city.to_owned(),
            location,
        });
        self
    }
}

pub fn keyspace() -> Keyspace {
    Keyspace::new("persons")
}

/// rand, egwene, mat, perrin, tam; registered in that order.
pub fn people() -> Vec<Person> {
    vec![
        Person::new("rand", "rand", "al'thor", 20).living_in("palermo", Some(PALERMO)),
        Person::new("egwene", "egwene", "al'vere", 19).living_in("catania", Some(CATANIA)),
        Person::new("mat", "mat", "cauthon", 20),
        Person::new("perrin", "perrin", "aybara", 21)
            .living_in("emond's field", Some(Point::new(0.0, 0.0))),
        Person::new("tam", "tam", "al'thor", 48).living_in("emond's field", None),
    ]
}

pub fn ids(people: &[Person]) -> Vec<&str> {
    people.iter().map(|person| person.id.as_str()).collect()
}

pub fn key(key: &'static str) -> Bytes {
    Bytes::from_static(key.as_bytes())
}

/// A template over a store seeded with [`people`], and a handle on the
/// store's command log. The log is empty on return.
pub async fn seeded() -> (KeyValueTemplate<CountingStore>, CountingStore) {
    seeded_with(people()).await
}

pub async fn seeded_with(people: Vec<Person>) -> (KeyValueTemplate<CountingStore>, CountingStore) {
    let store = CountingStore::default();
    let template = KeyValueTemplate::new(store.clone());
    for person in &people {
        template.insert(person).await.unwrap();
    }
    store.reset();
    (template, store)
}

/// Store command observed by [`CountingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Connection,
    Intersect(Vec<Bytes>),
    Union(Vec<Bytes>),
    GeoRadius { key: Bytes, limit: Option<usize> },
    HashGetAll(Vec<Bytes>),
    GetAllOf(Page),
    Count,
}

impl Command {
    pub fn is_set_read(&self) -> bool {
        matches!(self, Command::Intersect(_) | Command::Union(_))
    }
}

type Log = Arc<Mutex<Vec<Command>>>;

/// Memory store recording every read command the engine issues.
#[derive(Clone, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    log: Log,
}

impl CountingStore {
    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn commands(&self) -> Vec<Command> {
        self.log.lock().unwrap().clone()
    }

    pub fn count_of(&self, filter: impl Fn(&Command) -> bool) -> usize {
        self.log.lock().unwrap().iter().filter(|c| filter(c)).count()
    }

    pub fn reset(&self) {
        self.log.lock().unwrap().clear();
    }

    fn record(&self, command: Command) {
        self.log.lock().unwrap().push(command);
    }
}

pub struct CountingConnection {
    inner: MemoryConnection,
    log: Log,
}

impl CountingConnection {
    fn record(&self, command: Command) {
        self.log.lock().unwrap().push(command);
    }
}

#[async_trait]
impl StoreConnection for CountingConnection {
    async fn intersect(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        self.record(Command::Intersect(keys.to_vec()));
        self.inner.intersect(keys).await
    }

    async fn union(&mut self, keys: &[Bytes]) -> StoreResult<Vec<Bytes>> {
        self.record(Command::Union(keys.to_vec()));
        self.inner.union(keys).await
    }

    async fn geo_radius(
        &mut self,
        key: &[u8],
        within: Circle,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Bytes>> {
        self.record(Command::GeoRadius {
            key: Bytes::copy_from_slice(key),
            limit,
        });
        self.inner.geo_radius(key, within, limit).await
    }

    async fn hash_get_all(&mut self, keys: &[Bytes]) -> StoreResult<Vec<RawHash>> {
        self.record(Command::HashGetAll(keys.to_vec()));
        self.inner.hash_get_all(keys).await
    }
}

#[async_trait]
impl StoreAdapter for CountingStore {
    type Connection = CountingConnection;

    async fn connection(&self) -> StoreResult<CountingConnection> {
        self.record(Command::Connection);
        Ok(CountingConnection {
            inner: self.inner.connection().await?,
            log: self.log.clone(),
        })
    }

    async fn get_all_of(&self, keyspace: &Keyspace, page: Page) -> StoreResult<Vec<RawEntity>> {
        self.record(Command::GetAllOf(page));
        self.inner.get_all_of(keyspace, page).await
    }

    async fn count(&self, keyspace: &Keyspace) -> StoreResult<u64> {
        self.record(Command::Count);
        self.inner.count(keyspace).await
    }

    async fn get(&self, keyspace: &Keyspace, id: &[u8]) -> StoreResult<Option<RawEntity>> {
        self.inner.get(keyspace, id).await
    }

    async fn put(&self, write: EntityWrite) -> StoreResult<()> {
        self.inner.put(write).await
    }

    async fn delete(
        &self,
        keyspace: &Keyspace,
        id: &[u8],
        geo_paths: &[SmolStr],
    ) -> StoreResult<DeleteStatus> {
        self.inner.delete(keyspace, id, geo_paths).await
    }

    fn label(&self) -> &str {
        "counting"
    }
}

/// Store whose every call fails as if the server were unreachable.
pub struct FailingStore;

fn refused() -> StoreError {
    StoreError::ConnectionError(Box::new(io::Error::new(
        io::ErrorKind::ConnectionRefused,
        "connection refused",
    )))
}

#[async_trait]
impl StoreAdapter for FailingStore {
    type Connection = MemoryConnection;

    async fn connection(&self) -> StoreResult<MemoryConnection> {
        Err(refused())
    }

    async fn get_all_of(&self, _keyspace: &Keyspace, _page: Page) -> StoreResult<Vec<RawEntity>> {
        Err(refused())
    }

    async fn count(&self, _keyspace: &Keyspace) -> StoreResult<u64> {
        Err(refused())
    }

    async fn get(&self, _keyspace: &Keyspace, _id: &[u8]) -> StoreResult<Option<RawEntity>> {
        Err(refused())
    }

    async fn put(&self, _write: EntityWrite) -> StoreResult<()> {
        Err(refused())
    }

    async fn delete(
        &self,
        _keyspace: &Keyspace,
        _id: &[u8],
        _geo_paths: &[SmolStr],
    ) -> StoreResult<DeleteStatus> {
        Err(refused())
    }
}
