//! Repository implementations for TinyURL records.

pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::MySqlRepository;
pub use tinyurl_core::repository::{ReadRepository, Repository, Result, ShortUrlRecord};
pub use tinyurl_core::StorageError;
