//! background_sync tool implementation.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_worker::{OfflineCacheManager, SyncOutcome};

use super::json_result;

/// Parameters for the background_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundSyncParams {
    /// Sync tag to fire (the worker handles "form-submission").
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BackgroundSyncOutput {
    pub tag: String,
    /// Whether the worker handled the tag.
    pub handled: bool,
}

/// Implementation of the background_sync tool.
pub fn sync_impl(manager: &OfflineCacheManager, params: BackgroundSyncParams) -> Result<CallToolResult, McpError> {
    let handled = manager.handle_sync(&params.tag) == SyncOutcome::Handled;
    json_result(&BackgroundSyncOutput { tag: params.tag, handled })
}
