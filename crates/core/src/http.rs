//! Request descriptors and response snapshots.
//!
//! Caches are addressed by request identity (method + URL). Responses carry
//! their body as [`Bytes`], so storing a copy in a cache never consumes the
//! response handed back to the caller.

use bytes::Bytes;
use url::Url;

use crate::Error;
use crate::cache::hash::compute_cache_key;

/// The only method that participates in caching.
pub const GET: &str = "GET";

/// An intercepted request: method, URL and forwarded headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    url: Url,
    headers: Vec<(String, String)>,
}

impl Request {
    /// Build a request, normalizing the method to upper case.
    ///
    /// The fragment is dropped: it never reaches the network and is not part
    /// of the cache identity.
    pub fn new(method: &str, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method: method.trim().to_ascii_uppercase(), url, headers: Vec::new() }
    }

    /// Shorthand for a GET request.
    pub fn get(url: Url) -> Self {
        Self::new(GET, url)
    }

    /// Parse an absolute URL string into a request.
    pub fn parse(method: &str, url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Self::new(method, url))
    }

    /// Attach a header that is forwarded to the network.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn is_get(&self) -> bool {
        self.method == GET
    }

    /// Storage key for this request: SHA-256 of method and URL.
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, self.url.as_str())
    }
}

/// A response snapshot: status, headers and body bytes.
///
/// Cloning is cheap; the body is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, status_text: String::new(), headers: Vec::new(), body: body.into() }
    }

    /// A plain-text response with the given status.
    pub fn text(status: u16, status_text: &str, body: &str) -> Self {
        Self::new(status, Bytes::copy_from_slice(body.as_bytes()))
            .with_status_text(status_text)
            .with_header("content-type", "text/plain")
    }

    /// Restore a response from its stored parts.
    pub fn from_parts(status: u16, status_text: String, headers: Vec<(String, String)>, body: Bytes) -> Self {
        Self { status, status_text, headers, body }
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = status_text.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether the status is in the successful 2xx range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
