//! Persisted position state

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStateStore;
pub use sqlite::SqliteStateStore;
