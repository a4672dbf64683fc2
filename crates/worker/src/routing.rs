//! Request classification.
//!
//! An ordered table of matchers decides which class, and therefore which
//! caching strategy, handles a request. The first matching route wins;
//! unmatched requests fall into the default class.

use std::fmt;

use shellcache_core::{AppConfig, Request};

/// The request classes the worker knows how to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// Images: cache-first against the image cache.
    Image,
    /// API and form-backend traffic: network-first against the dynamic cache.
    Dynamic,
    /// Everything else: cache-first against the static cache.
    Static,
}

impl RequestClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestClass::Image => "image",
            RequestClass::Dynamic => "dynamic",
            RequestClass::Static => "static",
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pattern over the request URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatcher {
    /// URL path starts with the prefix.
    PathPrefix(String),
    /// URL host contains the substring.
    HostContains(String),
}

impl RouteMatcher {
    pub fn matches(&self, request: &Request) -> bool {
        match self {
            RouteMatcher::PathPrefix(prefix) => request.path().starts_with(prefix.as_str()),
            RouteMatcher::HostContains(needle) => request.host().is_some_and(|h| h.contains(needle.as_str())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub matcher: RouteMatcher,
    pub class: RequestClass,
}

/// Ordered routing table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
    default_class: RequestClass,
}

impl RouteTable {
    /// An empty table sending everything to `default_class`.
    pub fn new(default_class: RequestClass) -> Self {
        Self { routes: Vec::new(), default_class }
    }

    /// The deployment's table: image prefix, then API prefix, then form host.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(RequestClass::Static)
            .route(RouteMatcher::PathPrefix(config.image_prefix.clone()), RequestClass::Image)
            .route(RouteMatcher::PathPrefix(config.api_prefix.clone()), RequestClass::Dynamic)
            .route(RouteMatcher::HostContains(config.form_host.clone()), RequestClass::Dynamic)
    }

    /// Append a route. Earlier routes take precedence.
    pub fn route(mut self, matcher: RouteMatcher, class: RequestClass) -> Self {
        self.routes.push(Route { matcher, class });
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn classify(&self, request: &Request) -> RequestClass {
        self.routes
            .iter()
            .find(|route| route.matcher.matches(request))
            .map_or(self.default_class, |route| route.class)
    }
}
