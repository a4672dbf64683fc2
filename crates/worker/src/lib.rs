//! Offline asset cache worker.
//!
//! This crate provides:
//! - The install/activate lifecycle as an explicit state machine
//! - A routing table mapping requests to request classes
//! - Cache-first and network-first strategies over injected storage
//! - Background sync dispatch for the form-submission tag

pub mod lifecycle;
pub mod manager;
pub mod routing;
pub mod strategy;
pub mod sync;

pub use lifecycle::LifecycleState;
pub use manager::OfflineCacheManager;
pub use routing::{RequestClass, Route, RouteMatcher, RouteTable};
pub use strategy::{ResponseSource, Served};
pub use sync::{BackgroundSync, SyncOutcome};
