//! Infrastructure layer: aggregate stores and configuration.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use store::{InMemoryMenuStore, MenuQuery, PageRequest, PostgresMenuStore, Repository, StoreError};
