#![forbid(unsafe_code)]

pub mod repository;
pub mod results;
pub mod sqlite;

pub use repository::{InMemoryKeyValueStore, KeyValueStore, StorageError};
pub use results::ResultStore;
