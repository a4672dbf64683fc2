//! Core types and shared functionality for shellcache.
//!
//! This crate provides:
//! - Request/response snapshots and the network boundary
//! - Named cache storage with SQLite and in-memory backends
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod network;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cache::{CacheDb, CacheStorage, MemoryStorage};
pub use config::{AppConfig, CacheNames, ConfigError};
pub use error::Error;
pub use http::{Request, Response};
pub use network::Network;
