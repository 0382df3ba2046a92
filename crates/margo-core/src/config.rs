//! Session and store configuration.
//!
//! All timing is injected through [`Intervals`] so tests can shrink or
//! pause the periodic tasks instead of waiting out wall-clock defaults.

use std::time::Duration;

use crate::defaults::{
    CLEAN_INTERVAL_SECS, EVENT_BUS_CAPACITY, GROUP_NAME, RECONCILE_INTERVAL_SECS,
    RELOAD_INTERVAL_SECS, SEARCH_LIMIT, STORE_TIMEOUT_SECS, STORE_URL, URL_POLL_INTERVAL_SECS,
};

// =============================================================================
// INTERVALS
// =============================================================================

/// Periods of the session's background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intervals {
    /// Full refresh from the remote store.
    pub reload: Duration,
    /// Re-anchoring sweep for annotations whose marks went missing.
    pub reconcile: Duration,
    /// Sweep removing marks whose content became empty.
    pub clean: Duration,
    /// Poll for document URL changes.
    pub url_poll: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            reload: Duration::from_secs(RELOAD_INTERVAL_SECS),
            reconcile: Duration::from_secs(RECONCILE_INTERVAL_SECS),
            clean: Duration::from_secs(CLEAN_INTERVAL_SECS),
            url_poll: Duration::from_secs(URL_POLL_INTERVAL_SECS),
        }
    }
}

impl Intervals {
    /// Read intervals from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MARGO_RELOAD_INTERVAL_SECS` | `60` | Remote refresh period |
    /// | `MARGO_RECONCILE_INTERVAL_SECS` | `3` | Re-anchoring sweep period |
    /// | `MARGO_CLEAN_INTERVAL_SECS` | `3` | Empty-mark sweep period |
    /// | `MARGO_URL_POLL_INTERVAL_SECS` | `1` | URL change poll period |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reload: std::env::var("MARGO_RELOAD_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.reload),
            reconcile: std::env::var("MARGO_RECONCILE_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.reconcile),
            clean: std::env::var("MARGO_CLEAN_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.clean),
            url_poll: std::env::var("MARGO_URL_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.url_poll),
        }
    }

    pub fn with_reload(mut self, period: Duration) -> Self {
        self.reload = period;
        self
    }

    pub fn with_reconcile(mut self, period: Duration) -> Self {
        self.reconcile = period;
        self
    }

    pub fn with_clean(mut self, period: Duration) -> Self {
        self.clean = period;
        self
    }

    pub fn with_url_poll(mut self, period: Duration) -> Self {
        self.url_poll = period;
        self
    }
}

// =============================================================================
// STORE
// =============================================================================

/// Configuration for the remote annotation store client.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the store API.
    pub api_url: String,
    /// Bearer token; unauthenticated requests see only public annotations.
    pub api_token: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Maximum rows requested per search.
    pub search_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: STORE_URL.to_string(),
            api_token: None,
            timeout: Duration::from_secs(STORE_TIMEOUT_SECS),
            search_limit: SEARCH_LIMIT,
        }
    }
}

impl StoreConfig {
    /// Read store configuration from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MARGO_STORE_URL` | `https://api.hypothes.is/api` | Store API base URL |
    /// | `MARGO_STORE_TOKEN` | unset | Bearer token |
    /// | `MARGO_STORE_TIMEOUT_SECS` | `30` | Request timeout |
    /// | `MARGO_SEARCH_LIMIT` | `200` | Max rows per search |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("MARGO_STORE_URL").unwrap_or(defaults.api_url),
            api_token: std::env::var("MARGO_STORE_TOKEN").ok(),
            timeout: std::env::var("MARGO_STORE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            search_limit: std::env::var("MARGO_SEARCH_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.search_limit),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Configuration for one annotation session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the workspace group to use or create.
    pub group_name: String,
    pub intervals: Intervals,
    /// Capacity of the session event bus.
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            group_name: GROUP_NAME.to_string(),
            intervals: Intervals::default(),
            event_capacity: EVENT_BUS_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Read session configuration from environment variables.
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `MARGO_GROUP_NAME` | `Annotations` | Workspace group name |
    ///
    /// Interval variables are documented on [`Intervals::from_env`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            group_name: std::env::var("MARGO_GROUP_NAME").unwrap_or(defaults.group_name),
            intervals: Intervals::from_env(),
            event_capacity: defaults.event_capacity,
        }
    }

    pub fn with_group_name(mut self, name: impl Into<String>) -> Self {
        self.group_name = name.into();
        self
    }

    pub fn with_intervals(mut self, intervals: Intervals) -> Self {
        self.intervals = intervals;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervals_default_values() {
        let intervals = Intervals::default();
        assert_eq!(intervals.reload, Duration::from_secs(60));
        assert_eq!(intervals.reconcile, Duration::from_secs(3));
        assert_eq!(intervals.clean, Duration::from_secs(3));
        assert_eq!(intervals.url_poll, Duration::from_secs(1));
    }

    #[test]
    fn test_intervals_builders() {
        let intervals = Intervals::default()
            .with_reload(Duration::from_millis(50))
            .with_reconcile(Duration::from_millis(10))
            .with_clean(Duration::from_millis(10))
            .with_url_poll(Duration::from_millis(5));
        assert_eq!(intervals.reload, Duration::from_millis(50));
        assert_eq!(intervals.reconcile, Duration::from_millis(10));
        assert_eq!(intervals.clean, Duration::from_millis(10));
        assert_eq!(intervals.url_poll, Duration::from_millis(5));
    }

    #[test]
    fn test_intervals_from_env_override() {
        std::env::set_var("MARGO_RELOAD_INTERVAL_SECS", "120");
        let intervals = Intervals::from_env();
        assert_eq!(intervals.reload, Duration::from_secs(120));
        // Unset variables keep defaults
        assert_eq!(intervals.reconcile, Duration::from_secs(3));
        std::env::remove_var("MARGO_RELOAD_INTERVAL_SECS");
    }

    #[test]
    fn test_intervals_from_env_ignores_garbage() {
        std::env::set_var("MARGO_CLEAN_INTERVAL_SECS", "not-a-number");
        let intervals = Intervals::from_env();
        assert_eq!(intervals.clean, Duration::from_secs(3));
        std::env::remove_var("MARGO_CLEAN_INTERVAL_SECS");
    }

    #[test]
    fn test_store_config_default_values() {
        let config = StoreConfig::default();
        assert_eq!(config.api_url, "https://api.hypothes.is/api");
        assert!(config.api_token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.search_limit, 200);
    }

    #[test]
    fn test_store_config_builders() {
        let config = StoreConfig::default()
            .with_api_url("http://localhost:5000/api")
            .with_api_token("secret")
            .with_timeout(Duration::from_secs(5))
            .with_search_limit(50);
        assert_eq!(config.api_url, "http://localhost:5000/api");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.search_limit, 50);
    }

    #[test]
    fn test_store_config_from_env() {
        std::env::set_var("MARGO_STORE_TOKEN", "env-token");
        let config = StoreConfig::from_env();
        assert_eq!(config.api_token.as_deref(), Some("env-token"));
        assert_eq!(config.api_url, "https://api.hypothes.is/api");
        std::env::remove_var("MARGO_STORE_TOKEN");
    }

    #[test]
    fn test_session_config_default_values() {
        let config = SessionConfig::default();
        assert_eq!(config.group_name, "Annotations");
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.intervals, Intervals::default());
    }

    #[test]
    fn test_session_config_builders() {
        let config = SessionConfig::default()
            .with_group_name("Pilot study")
            .with_intervals(Intervals::default().with_reload(Duration::from_secs(10)));
        assert_eq!(config.group_name, "Pilot study");
        assert_eq!(config.intervals.reload, Duration::from_secs(10));
    }
}
