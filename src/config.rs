//! Client configuration
//!
//! The only required setting is the API base URL. It is normally read from the
//! environment once at start-up, or from a JSON file next to the session data.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// Primary environment variable holding the API base URL
pub const BASE_URL_VAR: &str = "ASKDR_API_BASE_URL";

/// Fallback variable, the name used by the web front end's build
pub const LEGACY_BASE_URL_VAR: &str = "VITE_API_BASE_URL";

pub const SIGN_IN_ROUTE_VAR: &str = "ASKDR_SIGN_IN_ROUTE";

pub const COALESCE_REFRESH_VAR: &str = "ASKDR_COALESCE_REFRESH";

/// Errors raised while building a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither base URL variable is set
    #[error("API base URL is not configured (set ASKDR_API_BASE_URL)")]
    MissingBaseUrl,

    /// The base URL does not parse as an absolute URL
    #[error("Invalid base URL '{0}': {1}")]
    InvalidBaseUrl(String, url::ParseError),

    /// The config file could not be read or written
    #[error("Config file error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for this struct
    #[error("Config format error: {0}")]
    Format(#[from] serde_json::Error),

    /// The HTTP client could not be built from this configuration
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

fn default_sign_in_route() -> String {
    "/login".to_string()
}

/// Configuration of the authenticated API client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every request path is joined to, e.g. `https://askdr.ai/api/`
    pub base_url: String,
    /// Route the navigator is sent to when a session cannot be recovered
    #[serde(default = "default_sign_in_route")]
    pub sign_in_route: String,
    /// Serialize concurrent token refreshes behind one lock
    #[serde(default)]
    pub coalesce_refresh: bool,
    /// Per-request timeout in milliseconds; the transport default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            sign_in_route: default_sign_in_route(),
            coalesce_refresh: false,
            timeout_ms: None,
        }
    }

    #[must_use]
    pub fn with_sign_in_route(mut self, route: impl Into<String>) -> Self {
        self.sign_in_route = route.into();
        self
    }

    #[must_use]
    pub fn with_coalesce_refresh(mut self, enabled: bool) -> Self {
        self.coalesce_refresh = enabled;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Reads the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .or_else(|| lookup(LEGACY_BASE_URL_VAR))
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let mut config = Self::new(base_url.trim());
        if let Some(route) = lookup(SIGN_IN_ROUTE_VAR).filter(|r| !r.is_empty()) {
            config.sign_in_route = route;
        }
        if let Some(flag) = lookup(COALESCE_REFRESH_VAR) {
            config.coalesce_refresh = matches!(flag.trim(), "1" | "true" | "yes" | "on");
        }

        config.validate()?;
        Ok(config)
    }

    /// Loads a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Checks that the base URL is an absolute URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        url::Url::parse(&self.base_url)
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidBaseUrl(self.base_url.clone(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_new_defaults() {
        let config = ClientConfig::new("http://localhost:8000/api/");
        assert_eq!(config.sign_in_route, "/login");
        assert!(!config.coalesce_refresh);
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_from_vars_primary() {
        let config = ClientConfig::from_vars(lookup(&[
            (BASE_URL_VAR, "https://askdr.ai/api/"),
            (LEGACY_BASE_URL_VAR, "http://ignored/"),
            (COALESCE_REFRESH_VAR, "true"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "https://askdr.ai/api/");
        assert!(config.coalesce_refresh);
    }

    #[test]
    fn test_from_vars_legacy_fallback() {
        let config = ClientConfig::from_vars(lookup(&[
            (LEGACY_BASE_URL_VAR, "http://localhost:8000/api/"),
            (SIGN_IN_ROUTE_VAR, "/auth"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8000/api/");
        assert_eq!(config.sign_in_route, "/auth");
    }

    #[test]
    fn test_from_vars_missing() {
        assert!(matches!(
            ClientConfig::from_vars(lookup(&[])),
            Err(ConfigError::MissingBaseUrl)
        ));
        assert!(matches!(
            ClientConfig::from_vars(lookup(&[(BASE_URL_VAR, "  ")])),
            Err(ConfigError::MissingBaseUrl)
        ));
    }

    #[test]
    fn test_from_vars_invalid_url() {
        assert!(matches!(
            ClientConfig::from_vars(lookup(&[(BASE_URL_VAR, "not a url")])),
            Err(ConfigError::InvalidBaseUrl(_, _))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("client.json");

        let config = ClientConfig::new("https://askdr.ai/api/")
            .with_coalesce_refresh(true)
            .with_timeout(Duration::from_secs(30));
        config.save(&path).unwrap();

        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_sub_second_timeout_is_kept() {
        let config = ClientConfig::new("http://localhost:8000/api/")
            .with_timeout(Duration::from_millis(500));
        assert_eq!(config.timeout(), Some(Duration::from_millis(500)));

        let json = serde_json::to_string(&config).unwrap();
        let loaded: ClientConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.timeout(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_fractional_timeout_keeps_millis() {
        let config = ClientConfig::new("http://localhost:8000/api/")
            .with_timeout(Duration::from_millis(2_750));
        assert_eq!(config.timeout_ms, Some(2_750));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost:8000/api/"}"#).unwrap();
        assert_eq!(config.sign_in_route, "/login");
        assert!(!config.coalesce_refresh);
        assert_eq!(config.timeout_ms, None);
    }
}
