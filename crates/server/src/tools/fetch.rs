//! offline_fetch tool implementation.
//!
//! Issues a request the way a page controlled by the worker would.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shellcache_client::resolve;
use shellcache_core::{Error, Request};
use shellcache_worker::OfflineCacheManager;

use super::json_result;

/// Input parameters for offline_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OfflineFetchParams {
    /// Path on the origin (e.g. "/img/logo.webp") or an absolute http(s) URL.
    pub url: String,

    /// HTTP method (default: GET). Only GET requests are served by the caches.
    #[serde(default = "default_method")]
    pub method: String,

    /// Extra request headers forwarded to the network.
    #[serde(default)]
    pub headers: Vec<HeaderParam>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HeaderParam {
    pub name: String,
    pub value: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for offline_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OfflineFetchOutput {
    /// The resolved request URL.
    pub url: String,
    pub method: String,
    pub status: u16,
    pub status_text: String,
    /// Where the response came from: cache, network, fallback or passthrough.
    pub source: String,
    pub content_type: Option<String>,
    pub headers: Vec<HeaderParam>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the offline_fetch tool.
pub async fn fetch_impl(manager: &OfflineCacheManager, params: OfflineFetchParams) -> Result<CallToolResult, McpError> {
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()).into());
    }

    let url = resolve(manager.origin(), &params.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
    let request = params
        .headers
        .into_iter()
        .fold(Request::new(&params.method, url), |req, h| req.with_header(h.name, h.value));

    let served = manager.fetch(&request).await?;
    let response = served.response;

    let output = OfflineFetchOutput {
        url: request.url().to_string(),
        method: request.method().to_string(),
        status: response.status(),
        status_text: response.status_text().to_string(),
        source: served.source.to_string(),
        content_type: response.header("content-type").map(str::to_string),
        headers: response
            .headers()
            .iter()
            .map(|(name, value)| HeaderParam { name: name.clone(), value: value.clone() })
            .collect(),
        body: response.body_text(),
        body_bytes: response.body().len(),
    };

    json_result(&output)
}
