//! Page object configuration.
//!
//! Loaded once at session start and passed by value into every
//! [`PageObject`](crate::PageObject). Sources, lowest precedence first:
//! defaults, a YAML file, `PAGEOBJECT_*` environment variables.
//!
//! ```yaml
//! default_timeout_ms: 15000
//! alert_timeout_ms: 1500
//! poll_interval_ms: 250
//! base_url: https://staging.example.com
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::result::{PageError, PageResult};
use crate::wait::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS};

/// Default alert detection timeout (2 seconds)
pub const DEFAULT_ALERT_TIMEOUT_MS: u64 = 2_000;

/// Default base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// Environment variable overriding the default timeout
pub const ENV_DEFAULT_TIMEOUT_MS: &str = "PAGEOBJECT_DEFAULT_TIMEOUT_MS";
/// Environment variable overriding the alert timeout
pub const ENV_ALERT_TIMEOUT_MS: &str = "PAGEOBJECT_ALERT_TIMEOUT_MS";
/// Environment variable overriding the poll interval
pub const ENV_POLL_INTERVAL_MS: &str = "PAGEOBJECT_POLL_INTERVAL_MS";
/// Environment variable overriding the base URL
pub const ENV_BASE_URL: &str = "PAGEOBJECT_BASE_URL";

/// Immutable configuration for page objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Budget for element waits in milliseconds
    pub default_timeout_ms: u64,
    /// Budget for alert detection in milliseconds
    pub alert_timeout_ms: u64,
    /// Interval between wait polls in milliseconds
    pub poll_interval_ms: u64,
    /// Base URL pages are opened relative to
    pub base_url: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            alert_timeout_ms: DEFAULT_ALERT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl PageConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default timeout
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    /// Set the alert timeout
    #[must_use]
    pub const fn with_alert_timeout(mut self, timeout_ms: u64) -> Self {
        self.alert_timeout_ms = timeout_ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Parse YAML; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> PageResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> PageResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading page object configuration");
        Self::from_yaml_str(&yaml)
    }

    /// Apply `PAGEOBJECT_*` overrides from the process environment
    pub fn with_env_overrides(self) -> PageResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production)
    pub fn with_overrides<F>(mut self, lookup: F) -> PageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |key: &str| -> PageResult<Option<u64>> {
            lookup(key)
                .map(|raw| {
                    raw.trim().parse::<u64>().map_err(|e| {
                        PageError::config(format!("{key} must be a number of milliseconds: {e}"))
                    })
                })
                .transpose()
        };

        if let Some(ms) = millis(ENV_DEFAULT_TIMEOUT_MS)? {
            self.default_timeout_ms = ms;
        }
        if let Some(ms) = millis(ENV_ALERT_TIMEOUT_MS)? {
            self.alert_timeout_ms = ms;
        }
        if let Some(ms) = millis(ENV_POLL_INTERVAL_MS)? {
            self.poll_interval_ms = ms;
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = url;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check the invariants between the fields
    pub fn validate(&self) -> PageResult<()> {
        if self.default_timeout_ms == 0 {
            return Err(PageError::config("default_timeout_ms must be greater than 0"));
        }
        if self.alert_timeout_ms == 0 {
            return Err(PageError::config("alert_timeout_ms must be greater than 0"));
        }
        if self.poll_interval_ms == 0 {
            return Err(PageError::config("poll_interval_ms must be greater than 0"));
        }
        if self.poll_interval_ms > self.default_timeout_ms {
            return Err(PageError::config(
                "poll_interval_ms must not exceed default_timeout_ms",
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(PageError::config("base_url must not be empty"));
        }
        Ok(())
    }

    /// Default timeout as Duration
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Alert timeout as Duration
    #[must_use]
    pub const fn alert_timeout(&self) -> Duration {
        Duration::from_millis(self.alert_timeout_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Join the base URL and a page path with exactly one `/`
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        if path.is_empty() {
            return self.base_url.clone();
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
