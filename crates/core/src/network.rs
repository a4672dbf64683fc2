//! The network boundary.
//!
//! The worker never talks to an HTTP client directly; it goes through
//! [`Network`] so the fetch path can be replaced in tests or by a different
//! transport.

use async_trait::async_trait;

use crate::Error;
use crate::http::{Request, Response};

/// Performs network fetches on behalf of the worker.
///
/// Any HTTP status, including 4xx and 5xx, is a resolved response. An `Err`
/// means no response was produced at all (offline, DNS failure, timeout).
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
