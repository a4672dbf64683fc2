//! Scripted network fake for testing.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::Error;
use crate::http::{Request, Response};
use crate::network::Network;

enum Scripted {
    Respond(Response),
    Fail(String),
}

/// Network fake with pre-configured responses and per-URL call counts.
///
/// URLs that were never scripted resolve to an empty 404, like a real
/// server would.
pub struct FakeNetwork {
    routes: Mutex<HashMap<String, Scripted>>,
    calls: Mutex<HashMap<String, usize>>,
    offline: AtomicBool,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self { routes: Mutex::new(HashMap::new()), calls: Mutex::new(HashMap::new()), offline: AtomicBool::new(false) }
    }

    /// Answer `url` with `response`.
    pub fn respond(&self, url: &str, response: Response) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Respond(response));
        self
    }

    /// Fail every fetch of `url` with a network error.
    pub fn fail(&self, url: &str, message: &str) -> &Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), Scripted::Fail(message.to_string()));
        self
    }

    /// Fail every fetch regardless of URL.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// How many times `url` was fetched.
    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl Default for FakeNetwork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Network for FakeNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let url = request.url().to_string();
        *self.calls.lock().unwrap().entry(url.clone()).or_insert(0) += 1;

        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {url}")));
        }

        match self.routes.lock().unwrap().get(&url) {
            Some(Scripted::Respond(response)) => Ok(response.clone()),
            Some(Scripted::Fail(message)) => Err(Error::Network(message.clone())),
            None => Ok(Response::new(404, "").with_status_text("Not Found")),
        }
    }
}
