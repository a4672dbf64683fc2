//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheDeleteParams, delete_impl, list_impl};
use crate::tools::fetch::{OfflineFetchParams, fetch_impl};
use crate::tools::lifecycle::{activate_impl, install_impl, status_impl};
use crate::tools::sync::{BackgroundSyncParams, sync_impl};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use shellcache_worker::OfflineCacheManager;

/// The main MCP server handler for shellcache.
#[derive(Clone)]
pub struct ShellcacheServer {
    tool_router: ToolRouter<Self>,
    manager: Arc<OfflineCacheManager>,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl ShellcacheServer {
    pub fn new(manager: Arc<OfflineCacheManager>) -> Self {
        Self { tool_router: Self::tool_router(), manager }
    }

    /// Fetch a URL through the offline cache.
    ///
    /// GET requests are routed to a cache strategy once the worker is activated;
    /// everything else goes straight to the network.
    #[tool(description = "Fetch a path or URL through the offline cache. Returns status, headers, body and source.")]
    async fn offline_fetch(&self, params: Parameters<OfflineFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.manager, params.0).await
    }

    #[tool(description = "Install the worker: precache the static asset manifest. Fails if any asset is unavailable.")]
    async fn offline_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.manager).await
    }

    #[tool(description = "Activate the worker: delete caches from previous versions and start intercepting fetches.")]
    async fn offline_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.manager).await
    }

    #[tool(description = "Report the worker lifecycle state and whether it controls pages.")]
    async fn offline_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.manager)
    }

    #[tool(description = "List cache names with entry counts, marking the current versioned caches.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&self.manager).await
    }

    #[tool(description = "Delete a named cache and all of its entries.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.manager, params.0).await
    }

    #[tool(description = "Fire a background sync event with the given tag (e.g. \"form-submission\").")]
    async fn background_sync(&self, params: Parameters<BackgroundSyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.manager, params.0)
    }
}

impl ServerHandler for ShellcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "shellcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline asset cache for a single origin. Install and activate the worker, then fetch through it."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_helpers::manager;

    #[test]
    fn test_lists_all_tools() {
        let (manager, _, _) = manager();
        let server = ShellcacheServer::new(manager);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(
            names,
            vec![
                "background_sync",
                "cache_delete",
                "cache_list",
                "offline_activate",
                "offline_fetch",
                "offline_install",
                "offline_status",
            ]
        );
    }

    #[test]
    fn test_server_info() {
        let (manager, _, _) = manager();
        let info = ShellcacheServer::new(manager).get_info();
        assert_eq!(info.server_info.name, "shellcache");
        assert!(info.capabilities.tools.is_some());
    }
}
