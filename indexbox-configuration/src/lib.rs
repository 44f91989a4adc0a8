#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

#[cfg(not(any(feature = "redis", feature = "memory")))]
compile_error!("enable at least one store feature: `redis` or `memory`");

/// Store selected by configuration.
pub mod any;
/// Configuration errors.
pub mod error;
/// Store configuration types.
pub mod store;

pub use any::{AnyConnection, AnyStore};
pub use error::ConfigError;
pub use store::{Memory, Redis, StoreConfig};
