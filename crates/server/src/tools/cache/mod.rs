//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and pruning the named caches.

pub mod delete;
pub mod list;

pub use delete::{CacheDeleteParams, delete_impl};
pub use list::list_impl;
