//! Loading, layering and validation of [`PassboltConfig`].
//!
//! Sources are applied in order, later ones winning: an optional YAML file,
//! then `PASSBOLT_*` environment variables, then explicit overrides made by
//! the caller on the returned value.

use crate::passbolt::types::{PassboltConfig, PassboltError};
use log::{debug, warn};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const ENV_URL: &str = "PASSBOLT_URL";
pub const ENV_ACCESS_TOKEN: &str = "PASSBOLT_ACCESS_TOKEN";
pub const ENV_REFRESH_TOKEN: &str = "PASSBOLT_REFRESH_TOKEN";
pub const ENV_VERIFY_TLS: &str = "PASSBOLT_VERIFY_TLS";
pub const ENV_TIMEOUT_SECS: &str = "PASSBOLT_TIMEOUT_SECS";

const REDACTED: &str = "[REDACTED]";

impl PassboltConfig {
    /// Parse a YAML config document. Missing keys keep their defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, PassboltError> {
        serde_yaml::from_str(text)
            .map_err(|e| PassboltError::invalid_config(format!("Invalid config YAML: {}", e)))
    }

    /// Read a YAML config file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, PassboltError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PassboltError::invalid_config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Loaded config file {}", path.display());
        Self::from_yaml_str(&text)
    }

    /// Overlay values from an environment lookup. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), PassboltError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_URL) {
            self.server_url = url;
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.access_token = Some(token);
        }
        if let Some(token) = get(ENV_REFRESH_TOKEN) {
            self.refresh_token = Some(token);
        }
        if let Some(raw) = get(ENV_VERIFY_TLS) {
            self.verify_tls = parse_bool(&raw).ok_or_else(|| {
                PassboltError::invalid_config(format!(
                    "{} must be true or false, got {}",
                    ENV_VERIFY_TLS, raw
                ))
            })?;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            self.operation_timeout_secs = Some(raw.trim().parse().map_err(|_| {
                PassboltError::invalid_config(format!(
                    "{} must be a whole number of seconds, got {}",
                    ENV_TIMEOUT_SECS, raw
                ))
            })?);
        }
        Ok(())
    }

    /// Reject configurations that cannot reach a server.
    pub fn validate(&self) -> Result<(), PassboltError> {
        if self.server_url.trim().is_empty() {
            return Err(PassboltError::invalid_config("Server URL is required"));
        }
        let url = Url::parse(&self.server_url).map_err(|e| {
            PassboltError::invalid_config(format!("Invalid server URL {}: {}", self.server_url, e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PassboltError::invalid_config(format!(
                "Server URL must be http or https, got {}",
                url.scheme()
            )));
        }
        if url.scheme() == "http" {
            warn!("Server URL {} is not using TLS", self.server_url);
        }
        if self.access_token.as_deref().map_or(true, str::is_empty) {
            return Err(PassboltError::invalid_config("Access token is required"));
        }
        if self.request_timeout_secs == 0 {
            return Err(PassboltError::invalid_config(
                "Request timeout must be at least one second",
            ));
        }
        Ok(())
    }

    /// Copy with secrets hidden, safe to log.
    pub fn redacted(&self) -> Self {
        let mut c = self.clone();
        if c.access_token.is_some() {
            c.access_token = Some(REDACTED.into());
        }
        if c.refresh_token.is_some() {
            c.refresh_token = Some(REDACTED.into());
        }
        c
    }

    /// Overall deadline for one reconciliation, if configured.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_secs.map(Duration::from_secs)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
