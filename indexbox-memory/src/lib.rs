#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

mod builder;
mod connection;
mod geo;
mod state;
mod store;

pub use builder::MemoryStoreBuilder;
pub use connection::MemoryConnection;
pub use store::MemoryStore;
