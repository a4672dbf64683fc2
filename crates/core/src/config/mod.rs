//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SHELLCACHE_*)
//! 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Versioned names of the three caches the worker owns.
///
/// Bumping a name makes the worker start from an empty cache and sweep the
/// old one at its next activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheNames {
    /// App shell assets populated at install time.
    #[serde(default = "default_static_cache")]
    pub r#static: String,

    /// Image assets populated on first fetch.
    #[serde(default = "default_images_cache")]
    pub images: String,

    /// Network-first responses (API and form backend).
    #[serde(default = "default_dynamic_cache")]
    pub dynamic: String,
}

impl CacheNames {
    /// The allow-list kept by the activation sweep.
    pub fn all(&self) -> [&str; 3] {
        [&self.r#static, &self.images, &self.dynamic]
    }
}

impl Default for CacheNames {
    fn default() -> Self {
        Self { r#static: default_static_cache(), images: default_images_cache(), dynamic: default_dynamic_cache() }
    }
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SHELLCACHE_*), nested keys split on `__`
/// 2. TOML config file (if SHELLCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the worker is registered for. Manifest paths resolve against it.
    ///
    /// Set via SHELLCACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Path to SQLite cache database.
    ///
    /// Set via SHELLCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SHELLCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SHELLCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Run install (and activation) when the server boots.
    ///
    /// Set via SHELLCACHE_INSTALL_ON_START environment variable.
    #[serde(default = "default_true")]
    pub install_on_start: bool,

    /// Activate right after a successful install instead of waiting.
    ///
    /// Set via SHELLCACHE_SKIP_WAITING environment variable.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Versioned cache names.
    ///
    /// Set via SHELLCACHE_CACHES__STATIC, SHELLCACHE_CACHES__IMAGES,
    /// SHELLCACHE_CACHES__DYNAMIC.
    #[serde(default)]
    pub caches: CacheNames,

    /// Paths fetched into the static cache at install time.
    #[serde(default = "default_static_manifest")]
    pub static_manifest: Vec<String>,

    /// Path prefix served by the image strategy.
    #[serde(default = "default_image_prefix")]
    pub image_prefix: String,

    /// Path prefix served by the network-first strategy.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Host substring identifying the third-party form backend.
    #[serde(default = "default_form_host")]
    pub form_host: String,

    /// Background sync tag that wakes the form-submission handler.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./shellcache.sqlite")
}

fn default_user_agent() -> String {
    "shellcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

fn default_static_cache() -> String {
    "static-v1".into()
}

fn default_images_cache() -> String {
    "images-v1".into()
}

fn default_dynamic_cache() -> String {
    "connect-digitals-v1".into()
}

fn default_static_manifest() -> Vec<String> {
    [
        "/",
        "/manifest.json",
        "/img/logo.webp",
        "/img/hero-bg.webp",
        "/img/services-bg.webp",
        "/img/contact-bg.webp",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_image_prefix() -> String {
    "/img/".into()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_form_host() -> String {
    "formspree.io".into()
}

fn default_sync_tag() -> String {
    "form-submission".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            install_on_start: true,
            skip_waiting: true,
            caches: CacheNames::default(),
            static_manifest: default_static_manifest(),
            image_prefix: default_image_prefix(),
            api_prefix: default_api_prefix(),
            form_host: default_form_host(),
            sync_tag: default_sync_tag(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed, or
    /// if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SHELLCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        Self::extract(figment.merge(Env::prefixed("SHELLCACHE_").split("__")))
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// The origin parsed as a URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the origin is not an absolute http(s) URL.
    pub fn origin_url(&self) -> Result<url::Url, ConfigError> {
        let url = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => {
                Err(ConfigError::Invalid { field: "origin".into(), reason: format!("unsupported scheme: {scheme}") })
            }
        }
    }
}
