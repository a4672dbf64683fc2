//! cache_delete tool implementation.
//!
//! Deletes one named cache and all of its entries.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_core::Error;
use shellcache_worker::OfflineCacheManager;

use crate::tools::json_result;

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Cache name (e.g. "images-v1").
    pub name: String,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub name: String,
    /// False when no cache had that name.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(manager: &OfflineCacheManager, params: CacheDeleteParams) -> Result<CallToolResult, McpError> {
    let name = params.name.trim();
    if name.is_empty() {
        return Err(Error::InvalidInput("Cache name cannot be empty".to_string()).into());
    }

    let deleted = manager.storage().delete(name).await?;
    if deleted {
        tracing::info!(cache = name, "cache deleted");
    }

    json_result(&CacheDeleteOutput { name: name.to_string(), deleted })
}
