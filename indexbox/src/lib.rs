#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Query execution.
///
/// [`QueryEngine`] plans criteria into store keys, gathers and paginates
/// ids, then fetches and converts the matching hashes.
pub mod engine;

/// Error types of queries and template operations.
pub mod error;

/// Metrics collection for query observability.
///
/// When the `metrics` feature is enabled, this module records counters and
/// a latency histogram per keyspace.
pub mod metrics;

/// Predicate partitioning into direct id keys and index set keys.
pub mod selector;

/// Ordering of materialised results.
pub mod sort;

/// Entity-level facade over the engine.
pub mod template;

pub use engine::QueryEngine;
pub use error::{QueryError, QueryResult};
pub use selector::{KeySelection, KeySelector};
pub use sort::Sort;
pub use template::{KeyValueTemplate, Query};

pub use indexbox_backend::{
    ConvertError, Converter, DeleteStatus, HashConverter, RawEntity, RawHash, StoreAdapter,
    StoreConnection, StoreError, StoreResult,
};
pub use indexbox_core::{
    Circle, Distance, Entity, EntityMetadata, IndexValue, Keyspace, MappingError, Metric,
    NearPath, OperationChain, Page, PathAndValue, Point, PropertyKind,
};
