//! The offline asset cache manager.
//!
//! Owns the lifecycle (install, activate) and mediates intercepted fetches
//! between the network and the three versioned caches.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::try_join_all;
use url::Url;

use shellcache_core::{AppConfig, CacheNames, CacheStorage, Error, Network, Request, Response};

use crate::lifecycle::LifecycleState;
use crate::routing::{RequestClass, RouteTable};
use crate::strategy::{self, ASSET_UNAVAILABLE, IMAGE_UNAVAILABLE, ResponseSource, Served};
use crate::sync::{BackgroundSync, SyncOutcome};

#[derive(Debug)]
struct Lifecycle {
    state: LifecycleState,
    claimed: bool,
}

/// Marks the worker `Redundant` when an install is dropped before it settles.
struct InstallGuard<'a> {
    manager: &'a OfflineCacheManager,
    settled: bool,
}

impl Drop for InstallGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.manager.set_state(LifecycleState::Redundant);
            tracing::warn!("install cancelled before completion");
        }
    }
}

/// Mediates fetches for one origin across the static, image and dynamic caches.
///
/// Request-path methods take `&self`; share the manager behind an `Arc` to
/// serve requests concurrently. Concurrent misses for the same URL may both
/// write to the cache, and the last write wins.
pub struct OfflineCacheManager {
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    origin: Url,
    caches: CacheNames,
    manifest: Vec<String>,
    routes: RouteTable,
    sync: BackgroundSync,
    skip_waiting: bool,
    lifecycle: Mutex<Lifecycle>,
}

impl OfflineCacheManager {
    /// Build a manager in the `Parsed` state.
    pub fn new(config: &AppConfig, storage: Arc<dyn CacheStorage>, network: Arc<dyn Network>) -> Result<Self, Error> {
        let origin = config.origin_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            storage,
            network,
            origin,
            caches: config.caches.clone(),
            manifest: config.static_manifest.clone(),
            routes: RouteTable::from_config(config),
            sync: BackgroundSync::new(config.sync_tag.clone()),
            skip_waiting: config.skip_waiting,
            lifecycle: Mutex::new(Lifecycle { state: LifecycleState::Parsed, claimed: false }),
        })
    }

    /// Replace the routing table.
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle().state
    }

    /// Whether the worker has claimed already-open pages.
    pub fn is_claimed(&self) -> bool {
        self.lifecycle().claimed
    }

    /// Origin that manifest paths resolve against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn caches(&self) -> &CacheNames {
        &self.caches
    }

    pub fn storage(&self) -> &Arc<dyn CacheStorage> {
        &self.storage
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move from `from` to `to`, failing if the worker is anywhere else.
    fn transition(&self, action: &'static str, from: LifecycleState, to: LifecycleState) -> Result<(), Error> {
        let mut lifecycle = self.lifecycle();
        if lifecycle.state != from {
            return Err(Error::InvalidTransition { action, state: lifecycle.state.to_string() });
        }
        lifecycle.state = to;
        Ok(())
    }

    fn set_state(&self, state: LifecycleState) {
        self.lifecycle().state = state;
    }

    /// Populate the static cache from the manifest.
    ///
    /// All or nothing: if any asset fails to fetch or answers with a non-ok
    /// status, nothing is written and the worker becomes `Redundant`. Dropping
    /// the future mid-install also leaves the worker `Redundant`.
    pub async fn install(&self) -> Result<(), Error> {
        self.transition("install", LifecycleState::Parsed, LifecycleState::Installing)?;
        tracing::info!(cache = %self.caches.r#static, assets = self.manifest.len(), "installing");

        let mut guard = InstallGuard { manager: self, settled: false };
        let precached = self.precache().await;
        guard.settled = true;

        match precached {
            Ok(()) => {
                self.set_state(LifecycleState::Installed);
                tracing::info!(cache = %self.caches.r#static, skip_waiting = self.skip_waiting, "installed");
                Ok(())
            }
            Err(err) => {
                self.set_state(LifecycleState::Redundant);
                tracing::error!(error = %err, "install failed");
                Err(Error::InstallFailed(err.to_string()))
            }
        }
    }

    async fn precache(&self) -> Result<(), Error> {
        let requests = self
            .manifest
            .iter()
            .map(|path| {
                self.origin
                    .join(path)
                    .map(Request::get)
                    .map_err(|e| Error::InvalidUrl(format!("{path}: {e}")))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let entries = try_join_all(requests.into_iter().map(|request| async move {
            let response = self.network.fetch(&request).await?;
            if !response.is_ok() {
                return Err(Error::Network(format!("{} returned status {}", request.url(), response.status())));
            }
            Ok::<_, Error>((request, response))
        }))
        .await?;

        self.storage.open(&self.caches.r#static).await?;
        self.storage.put_all(&self.caches.r#static, &entries).await
    }

    /// Sweep caches from previous versions, then take control of open pages.
    ///
    /// Only allowed after a successful install. Returns the names of the
    /// deleted caches. A storage failure here propagates and leaves the worker
    /// in `Activating`.
    pub async fn activate(&self) -> Result<Vec<String>, Error> {
        self.transition("activate", LifecycleState::Installed, LifecycleState::Activating)?;
        tracing::info!("activating");

        let keep = self.caches.all();
        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if keep.contains(&name.as_str()) {
                continue;
            }
            tracing::info!(cache = %name, "deleting stale cache");
            self.storage.delete(&name).await?;
            deleted.push(name);
        }

        for name in keep {
            self.storage.open(name).await?;
        }

        {
            let mut lifecycle = self.lifecycle();
            lifecycle.state = LifecycleState::Activated;
            lifecycle.claimed = true;
        }
        tracing::info!(deleted = deleted.len(), "activated; claiming clients");

        Ok(deleted)
    }

    /// Install, then activate straight away when `skip_waiting` is set.
    pub async fn start(&self) -> Result<LifecycleState, Error> {
        self.install().await?;
        if self.skip_waiting {
            self.activate().await?;
        }
        Ok(self.state())
    }

    /// Intercept a request.
    ///
    /// Returns `Ok(None)` when the worker declines: non-GET requests, or any
    /// request while the worker is not activated. Declined requests must go to
    /// the network untouched.
    pub async fn handle_fetch(&self, request: &Request) -> Result<Option<Served>, Error> {
        if !request.is_get() {
            tracing::trace!(method = request.method(), url = %request.url(), "not intercepting non-GET");
            return Ok(None);
        }
        if !self.state().controls_fetches() {
            return Ok(None);
        }

        let class = self.routes.classify(request);
        tracing::debug!(%class, url = %request.url(), "intercepted");

        let storage = self.storage.as_ref();
        let network = self.network.as_ref();
        let served = match class {
            RequestClass::Image => {
                strategy::cache_first(storage, network, &self.caches.images, request, IMAGE_UNAVAILABLE).await?
            }
            RequestClass::Static => {
                strategy::cache_first(storage, network, &self.caches.r#static, request, ASSET_UNAVAILABLE).await?
            }
            RequestClass::Dynamic => strategy::network_first(storage, network, &self.caches.dynamic, request).await?,
        };

        Ok(Some(served))
    }

    /// What the page sees: the worker's answer, or the raw network when the
    /// worker declines.
    pub async fn fetch(&self, request: &Request) -> Result<Served, Error> {
        match self.handle_fetch(request).await? {
            Some(served) => Ok(served),
            None => {
                let response: Response = self.network.fetch(request).await?;
                Ok(Served::new(response, ResponseSource::Passthrough))
            }
        }
    }

    /// Deliver a background sync event. Ignored unless the worker is activated.
    pub fn handle_sync(&self, tag: &str) -> SyncOutcome {
        if !self.state().controls_fetches() {
            tracing::debug!(tag, state = %self.state(), "sync event before activation");
            return SyncOutcome::Ignored;
        }
        self.sync.dispatch(tag)
    }
}
