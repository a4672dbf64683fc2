//! Cache-first and network-first fetch strategies.
//!
//! The two strategies fail differently. Cache-first never lets a
//! network error reach the page: it answers with a 404 placeholder. Network-first
//! falls back to the cache and, when that misses too, returns the original
//! network error to the caller.

use std::fmt;

use shellcache_core::{CacheStorage, Error, Network, Request, Response};

/// Placeholder body for images that are neither cached nor reachable.
pub const IMAGE_UNAVAILABLE: &str = "Image not available";

/// Placeholder body for other assets that are neither cached nor reachable.
pub const ASSET_UNAVAILABLE: &str = "Asset not available";

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    /// A stored response; the network was not consulted.
    Cache,
    /// A live network response.
    Network,
    /// A synthetic placeholder produced after a network failure.
    Fallback,
    /// The worker declined the request and it went straight to the network.
    Passthrough,
}

impl ResponseSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
            ResponseSource::Fallback => "fallback",
            ResponseSource::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response handed back to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: Response,
    pub source: ResponseSource,
}

impl Served {
    pub fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Store a copy of `response`. Write failures are logged and swallowed.
async fn store(storage: &dyn CacheStorage, cache: &str, request: &Request, response: &Response) {
    if let Err(err) = storage.put(cache, request, response).await {
        tracing::warn!(cache, url = %request.url(), error = %err, "failed to store response");
    }
}

/// Serve from `cache` when possible; fetch and store on a miss.
///
/// Only ok (2xx) responses are stored. A failed cache lookup counts as a
/// miss. When the network fails on a miss, a 404 with `fallback_body` is
/// returned instead of the error.
pub async fn cache_first(
    storage: &dyn CacheStorage, network: &dyn Network, cache: &str, request: &Request, fallback_body: &str,
) -> Result<Served, Error> {
    let lookup = async {
        storage.open(cache).await?;
        storage.match_request(cache, request).await
    };

    match lookup.await {
        Ok(Some(response)) => {
            tracing::debug!(cache, url = %request.url(), "cache hit");
            return Ok(Served::new(response, ResponseSource::Cache));
        }
        Ok(None) => tracing::debug!(cache, url = %request.url(), "cache miss"),
        Err(err) => tracing::warn!(cache, url = %request.url(), error = %err, "cache lookup failed, treating as miss"),
    }

    match network.fetch(request).await {
        Ok(response) => {
            if response.is_ok() {
                store(storage, cache, request, &response).await;
            }
            Ok(Served::new(response, ResponseSource::Network))
        }
        Err(err) if err.is_network() => {
            tracing::warn!(cache, url = %request.url(), error = %err, "network failed on cache miss");
            Ok(Served::new(Response::text(404, "Not Found", fallback_body), ResponseSource::Fallback))
        }
        Err(err) => Err(err),
    }
}

/// Try the network first, refreshing `cache`; fall back to the stored copy.
///
/// Every resolved response is stored, whatever its status. If the network
/// fails and nothing is cached, the network error is returned unchanged.
pub async fn network_first(
    storage: &dyn CacheStorage, network: &dyn Network, cache: &str, request: &Request,
) -> Result<Served, Error> {
    let err = match network.fetch(request).await {
        Ok(response) => {
            store(storage, cache, request, &response).await;
            return Ok(Served::new(response, ResponseSource::Network));
        }
        Err(err) => err,
    };

    tracing::warn!(cache, url = %request.url(), error = %err, "network failed, trying cache");
    match storage.match_request(cache, request).await {
        Ok(Some(response)) => Ok(Served::new(response, ResponseSource::Cache)),
        Ok(None) => Err(err),
        Err(cache_err) => {
            tracing::warn!(cache, url = %request.url(), error = %cache_err, "cache lookup failed");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shellcache_core::MemoryStorage;
    use shellcache_core::test_support::FakeNetwork;

    /// Storage whose every operation fails.
    struct UnreadableStorage;

    #[async_trait]
    impl CacheStorage for UnreadableStorage {
        async fn open(&self, _name: &str) -> Result<(), Error> {
            Err(Error::CorruptEntry("disk unreadable".into()))
        }
        async fn has(&self, _name: &str) -> Result<bool, Error> {
            Err(Error::CorruptEntry("disk unreadable".into()))
        }
        async fn delete(&self, _name: &str) -> Result<bool, Error> {
            Err(Error::CorruptEntry("disk unreadable".into()))
        }
        async fn keys(&self) -> Result<Vec<String>, Error> {
            Err(Error::CorruptEntry("disk unreadable".into()))
        }
        async fn match_request(&self, _name: &str, _request: &Request) -> Result<Option<Response>, Error> {
            Err(Error::CorruptEntry("disk unreadable".into()))
        }
        async fn put(&self, _name: &str, _request: &Request, _response: &Response) -> Result<(), Error> {
            Err(Error::CorruptEntry("disk unreadable".into()))
        }
        async fn put_all(&self, _name: &str, _entries: &[(Request, Response)]) -> Result<(), Error> {
            Err(Error::CorruptEntry("disk unreadable".into()))
        }
        async fn requests(&self, _name: &str) -> Result<Vec<Request>, Error> {
            Err(Error::CorruptEntry("disk unreadable".into()))
        }
    }

    const URL: &str = "https://example.test/img/logo.webp";
    const API: &str = "https://example.test/api/data";

    fn get(url: &str) -> Request {
        Request::parse("GET", url).unwrap()
    }

    #[tokio::test]
    async fn test_cache_first_miss_stores_ok_response() {
        let storage = MemoryStorage::new();
        let network = FakeNetwork::new();
        network.respond(URL, Response::new(200, "logo"));

        let served = cache_first(&storage, &network, "images-v1", &get(URL), IMAGE_UNAVAILABLE)
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.body_text(), "logo");
        let stored = storage.match_request("images-v1", &get(URL)).await.unwrap();
        assert_eq!(stored, Some(served.response));
    }

    #[tokio::test]
    async fn test_cache_first_hit_skips_network() {
        let storage = MemoryStorage::new();
        let network = FakeNetwork::new();
        storage.put("images-v1", &get(URL), &Response::new(200, "cached")).await.unwrap();

        let served = cache_first(&storage, &network, "images-v1", &get(URL), IMAGE_UNAVAILABLE)
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.body_text(), "cached");
        assert_eq!(network.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_cache_first_does_not_store_error_status() {
        let storage = MemoryStorage::new();
        let network = FakeNetwork::new();
        network.respond(URL, Response::new(500, "boom"));

        let served = cache_first(&storage, &network, "images-v1", &get(URL), IMAGE_UNAVAILABLE)
            .await
            .unwrap();

        assert_eq!(served.response.status(), 500);
        assert!(storage.match_request("images-v1", &get(URL)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cache_first_offline_returns_placeholder() {
        let storage = MemoryStorage::new();
        let network = FakeNetwork::new();
        network.set_offline(true);

        let served = cache_first(&storage, &network, "static-v1", &get("https://example.test/about"), ASSET_UNAVAILABLE)
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Fallback);
        assert_eq!(served.response.status(), 404);
        assert_eq!(served.response.body_text(), "Asset not available");
    }

    #[tokio::test]
    async fn test_cache_first_unreadable_cache_uses_network() {
        let network = FakeNetwork::new();
        network.respond(URL, Response::new(200, "logo"));

        let served = cache_first(&UnreadableStorage, &network, "images-v1", &get(URL), IMAGE_UNAVAILABLE)
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.body_text(), "logo");
    }

    #[tokio::test]
    async fn test_cache_first_unreadable_cache_offline_returns_placeholder() {
        let network = FakeNetwork::new();
        network.set_offline(true);

        let served = cache_first(&UnreadableStorage, &network, "images-v1", &get(URL), IMAGE_UNAVAILABLE)
            .await
            .unwrap();

        assert_eq!(served.source, ResponseSource::Fallback);
        assert_eq!(served.response.status(), 404);
        assert_eq!(served.response.body_text(), "Image not available");
    }

    #[tokio::test]
    async fn test_network_first_overwrites_cache() {
        let storage = MemoryStorage::new();
        let network = FakeNetwork::new();
        storage.put("connect-digitals-v1", &get(API), &Response::new(200, "old")).await.unwrap();
        network.respond(API, Response::new(200, "fresh"));

        let served = network_first(&storage, &network, "connect-digitals-v1", &get(API)).await.unwrap();

        assert_eq!(served.source, ResponseSource::Network);
        assert_eq!(served.response.body_text(), "fresh");
        let stored = storage.match_request("connect-digitals-v1", &get(API)).await.unwrap().unwrap();
        assert_eq!(stored, served.response);
    }

    #[tokio::test]
    async fn test_network_first_falls_back_to_cache() {
        let storage = MemoryStorage::new();
        let network = FakeNetwork::new();
        storage.put("connect-digitals-v1", &get(API), &Response::new(200, "stale")).await.unwrap();
        network.fail(API, "connection reset");

        let served = network_first(&storage, &network, "connect-digitals-v1", &get(API)).await.unwrap();

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(served.response.body_text(), "stale");
    }

    #[tokio::test]
    async fn test_network_first_reraises_original_error() {
        let storage = MemoryStorage::new();
        let network = FakeNetwork::new();
        network.fail(API, "connection reset");

        let result = network_first(&storage, &network, "connect-digitals-v1", &get(API)).await;

        match result {
            Err(Error::Network(msg)) => assert_eq!(msg, "connection reset"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[test]
    fn test_response_source_display() {
        assert_eq!(ResponseSource::Fallback.to_string(), "fallback");
    }
}
