//! Named request/response caches.
//!
//! Caches are reached through the [`CacheStorage`] trait so the worker can
//! run against either backend:
//!
//! - [`CacheDb`]: persistent SQLite storage (WAL mode, schema migrations)
//! - [`MemoryStorage`]: process-local storage with the same contract
//!
//! Entries are addressed by the SHA-256 of the request's method and URL.

pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod storage;

pub use crate::Error;

pub use connection::CacheDb;
pub use memory::MemoryStorage;
pub use storage::CacheStorage;
