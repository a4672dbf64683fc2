//! cache_list tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_worker::OfflineCacheManager;

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheSummary {
    pub name: String,
    /// Number of stored request/response pairs.
    pub entries: usize,
    /// Whether this is one of the current versioned caches.
    pub current: bool,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Caches in creation order.
    pub caches: Vec<CacheSummary>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl(manager: &OfflineCacheManager) -> Result<CallToolResult, McpError> {
    let storage = manager.storage();
    let current = manager.caches().all();

    let mut caches = Vec::new();
    for name in storage.keys().await? {
        let entries = storage.requests(&name).await?.len();
        let current = current.contains(&name.as_str());
        caches.push(CacheSummary { name, entries, current });
    }

    json_result(&CacheListOutput { caches })
}
