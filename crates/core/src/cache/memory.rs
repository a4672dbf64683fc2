//! In-memory cache storage.
//!
//! Implements the same contract as [`CacheDb`](super::CacheDb) without
//! touching disk. Used by tests and by ephemeral runs that do not need the
//! caches to outlive the process.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::storage::{CacheStorage, ensure_cacheable};
use crate::Error;
use crate::http::{Request, Response};

#[derive(Debug, Default)]
struct NamedCache {
    name: String,
    /// key hash -> (request, response, insertion sequence)
    entries: HashMap<String, (Request, Response, u64)>,
}

#[derive(Debug, Default)]
struct Inner {
    caches: Vec<NamedCache>,
    seq: u64,
}

impl Inner {
    fn get_or_open(&mut self, name: &str) -> &mut NamedCache {
        let idx = match self.caches.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.caches.push(NamedCache { name: name.to_string(), entries: HashMap::new() });
                self.caches.len() - 1
            }
        };
        &mut self.caches[idx]
    }

    fn insert(&mut self, name: &str, request: &Request, response: &Response) {
        self.seq += 1;
        let seq = self.seq;
        let cache = self.get_or_open(name);
        let key = request.cache_key();
        // An overwrite keeps the original position, like an SQL upsert.
        let seq = cache.entries.get(&key).map_or(seq, |(_, _, s)| *s);
        cache.entries.insert(key, (request.clone(), response.clone(), seq));
    }
}

/// Cache storage held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Inner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.lock().get_or_open(name);
        Ok(())
    }

    async fn has(&self, name: &str) -> Result<bool, Error> {
        Ok(self.lock().caches.iter().any(|c| c.name == name))
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        let mut inner = self.lock();
        let before = inner.caches.len();
        inner.caches.retain(|c| c.name != name);
        Ok(inner.caches.len() != before)
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        Ok(self.lock().caches.iter().map(|c| c.name.clone()).collect())
    }

    async fn match_request(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }
        let inner = self.lock();
        Ok(inner
            .caches
            .iter()
            .find(|c| c.name == name)
            .and_then(|c| c.entries.get(&request.cache_key()))
            .map(|(_, response, _)| response.clone()))
    }

    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error> {
        ensure_cacheable(request)?;
        self.lock().insert(name, request, response);
        Ok(())
    }

    async fn put_all(&self, name: &str, entries: &[(Request, Response)]) -> Result<(), Error> {
        for (request, _) in entries {
            ensure_cacheable(request)?;
        }
        let mut inner = self.lock();
        for (request, response) in entries {
            inner.insert(name, request, response);
        }
        Ok(())
    }

    async fn requests(&self, name: &str) -> Result<Vec<Request>, Error> {
        let inner = self.lock();
        let Some(cache) = inner.caches.iter().find(|c| c.name == name) else {
            return Ok(Vec::new());
        };
        let mut entries: Vec<_> = cache.entries.values().collect();
        entries.sort_by_key(|(_, _, seq)| *seq);
        Ok(entries.into_iter().map(|(request, _, _)| request.clone()).collect())
    }
}
