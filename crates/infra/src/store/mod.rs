//! Aggregate persistence: the repository contract and its adapters.

pub mod in_memory;
pub mod postgres;
pub mod repository;

pub use in_memory::InMemoryMenuStore;
pub use postgres::PostgresMenuStore;
pub use repository::{MenuQuery, PageRequest, Repository, StoreError};
