//! Lifecycle tools: offline_install, offline_activate, offline_status.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_worker::OfflineCacheManager;

use super::json_result;

/// Output shared by the lifecycle tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LifecycleOutput {
    /// Current lifecycle state.
    pub state: String,
    /// Whether already-open pages have been claimed.
    pub claimed: bool,
    /// Caches removed by the activation sweep (offline_activate only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deleted_caches: Vec<String>,
}

fn output(manager: &OfflineCacheManager, deleted_caches: Vec<String>) -> LifecycleOutput {
    LifecycleOutput { state: manager.state().to_string(), claimed: manager.is_claimed(), deleted_caches }
}

/// Implementation of the offline_install tool.
pub async fn install_impl(manager: &OfflineCacheManager) -> Result<CallToolResult, McpError> {
    manager.install().await?;
    json_result(&output(manager, Vec::new()))
}

/// Implementation of the offline_activate tool.
pub async fn activate_impl(manager: &OfflineCacheManager) -> Result<CallToolResult, McpError> {
    let deleted = manager.activate().await?;
    json_result(&output(manager, deleted))
}

/// Implementation of the offline_status tool.
pub fn status_impl(manager: &OfflineCacheManager) -> Result<CallToolResult, McpError> {
    json_result(&output(manager, Vec::new()))
}
