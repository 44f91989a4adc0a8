#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod criteria;
pub mod error;
pub mod keyspace;
pub mod mapping;
pub mod page;

pub use criteria::{Circle, Distance, IndexValue, Metric, NearPath, OperationChain, PathAndValue, Point};
pub use error::MappingError;
pub use keyspace::{Keyspace, geo_index_name};
pub use mapping::{
    Entity, EntityMetadata, EntityMetadataBuilder, PersistentProperty, PropertyKind,
};
pub use page::Page;
