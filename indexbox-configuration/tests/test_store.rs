use indexbox_backend::{StoreAdapter, StoreConnection};
use indexbox_configuration::{AnyStore, ConfigError, Memory, Redis, StoreConfig};
use indexbox_core::Keyspace;
use pretty_assertions::assert_eq;

#[test]
fn test_redis_store_deserialize() {
    let yaml = r#"
type: Redis
connection_string: "redis://localhost:6379/2"
label: persons
"#;

    let config = StoreConfig::from_yaml(yaml).expect("failed to deserialize");

    assert_eq!(
        config,
        StoreConfig::Redis(Redis {
            connection_string: "redis://localhost:6379/2".to_string(),
            label: Some("persons".to_string()),
        })
    );
}

#[test]
fn test_memory_store_deserialize() {
    let config = StoreConfig::from_yaml("type: Memory\n").expect("failed to deserialize");
    assert_eq!(config, StoreConfig::Memory(Memory::default()));
}

#[test]
fn test_unknown_store_type() {
    let error = StoreConfig::from_yaml("type: Cassandra\n").unwrap_err();
    assert!(matches!(error, ConfigError::Parse(_)));
}

#[test]
fn test_missing_connection_string() {
    let error = StoreConfig::from_yaml("type: Redis\nlabel: persons\n").unwrap_err();
    assert!(matches!(error, ConfigError::Parse(_)));
}

#[test]
fn test_redis_into_store() {
    let store = StoreConfig::Redis(Redis {
        connection_string: "redis://localhost:6379".to_string(),
        label: Some("persons".to_string()),
    })
    .into_store()
    .expect("redis store");

    assert!(matches!(store, AnyStore::Redis(_)));
    assert_eq!(store.label(), "persons");
}

#[test]
fn test_redis_invalid_url() {
    let result = StoreConfig::Redis(Redis {
        connection_string: "definitely not a url".to_string(),
        label: None,
    })
    .into_store();

    assert!(matches!(result, Err(ConfigError::StoreNotAvailable(_))));
}

#[tokio::test]
async fn test_memory_into_store() {
    let store = StoreConfig::from_yaml("type: Memory\nlabel: scratch\n")
        .and_then(StoreConfig::into_store)
        .expect("memory store");

    assert_eq!(store.label(), "scratch");
    assert_eq!(store.count(&Keyspace::new("persons")).await.unwrap(), 0);

    let mut connection = store.connection().await.unwrap();
    assert!(connection.union(&[]).await.unwrap().is_empty());
}
