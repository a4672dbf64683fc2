//! The named-cache contract.
//!
//! A storage holds any number of named caches for one origin. Each cache maps
//! a GET request descriptor to a response snapshot. Writes are upserts and the
//! last writer wins; there are no transactions across caches.

use async_trait::async_trait;

use crate::Error;
use crate::http::{Request, Response};

/// Persistent registry of named request/response caches.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Create the named cache if it does not exist yet.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Whether a cache with this name exists.
    async fn has(&self, name: &str) -> Result<bool, Error>;

    /// Delete a cache and every entry in it.
    ///
    /// Returns false if no cache had that name.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// All cache names, oldest first.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Look up the stored response for a request.
    ///
    /// Non-GET requests never match.
    async fn match_request(&self, name: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Store a response for a request, replacing any previous entry.
    ///
    /// Opens the cache if needed. Non-GET requests are rejected.
    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error>;

    /// Store several entries at once: either all of them are written or none.
    async fn put_all(&self, name: &str, entries: &[(Request, Response)]) -> Result<(), Error>;

    /// Request descriptors currently stored in a cache.
    async fn requests(&self, name: &str) -> Result<Vec<Request>, Error>;
}

/// Reject requests that may not be written to a cache.
pub(crate) fn ensure_cacheable(request: &Request) -> Result<(), Error> {
    if request.is_get() {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "only GET requests can be cached, got {} {}",
            request.method(),
            request.url()
        )))
    }
}
