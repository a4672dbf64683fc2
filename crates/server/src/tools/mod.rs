//! MCP tool implementations.
//!
//! This module contains all tools exposed by the shellcache server.

pub mod cache;
pub mod fetch;
pub mod lifecycle;
pub mod sync;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use shellcache_core::Error;

/// Serialize a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use std::sync::Arc;

    use rmcp::model::CallToolResult;
    use serde::de::DeserializeOwned;
    use shellcache_core::test_support::FakeNetwork;
    use shellcache_core::{AppConfig, MemoryStorage, Response};
    use shellcache_worker::OfflineCacheManager;

    pub const ORIGIN: &str = "https://connect-digitals.example";

    pub fn parse_output<T: DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }

    /// A manager over in-memory storage whose manifest is just the root document.
    pub fn manager() -> (Arc<OfflineCacheManager>, Arc<MemoryStorage>, Arc<FakeNetwork>) {
        let config = AppConfig { origin: ORIGIN.into(), static_manifest: vec!["/".into()], ..Default::default() };
        let storage = Arc::new(MemoryStorage::new());
        let network = Arc::new(FakeNetwork::new());
        network.respond(&format!("{ORIGIN}/"), Response::new(200, "<html>shell</html>"));
        let manager = OfflineCacheManager::new(&config, storage.clone(), network.clone()).unwrap();
        (Arc::new(manager), storage, network)
    }
}
