//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn require_path(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') { Ok(()) } else { Err(invalid(field, format!("path must start with '/': {value:?}"))) }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent`, `form_host` or `sync_tag` is empty
    /// - a cache name is empty or two cache names collide
    /// - a routing prefix or manifest entry does not start with `/`
    ///
    /// Returns `ConfigError::Missing` if the static manifest is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.origin_url()?;

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.form_host.is_empty() {
            return Err(invalid("form_host", "must not be empty"));
        }
        if self.sync_tag.is_empty() {
            return Err(invalid("sync_tag", "must not be empty"));
        }

        let names = self.caches.all();
        if names.iter().any(|n| n.is_empty()) {
            return Err(invalid("caches", "cache names must not be empty"));
        }
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(invalid("caches", "cache names must be distinct"));
        }

        require_path("image_prefix", &self.image_prefix)?;
        require_path("api_prefix", &self.api_prefix)?;

        if self.static_manifest.is_empty() {
            return Err(ConfigError::Missing {
                field: "static_manifest".into(),
                hint: "list at least the root document, e.g. [\"/\"]".into(),
            });
        }
        for entry in &self.static_manifest {
            require_path("static_manifest", entry)?;
        }

        if self.image_prefix == self.api_prefix {
            tracing::warn!(
                prefix = %self.image_prefix,
                "image_prefix and api_prefix are equal; image routing takes precedence"
            );
        }

        Ok(())
    }
}
