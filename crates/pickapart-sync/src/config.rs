//! Synchronization configuration

use pickapart_build::DEFAULT_BUILD_NAME;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Session storage key used by the browser client
pub const DEFAULT_SESSION_KEY: &str = "currentBuild";

/// Reconciler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Upper bound on the single remote fetch at session start
    pub fetch_timeout_ms: u64,
    /// Upper bound on a single detached push
    pub push_timeout_ms: u64,
    /// Local cache key
    pub session_key: String,
    /// Name for saved builds saved without one
    pub default_build_name: String,
}

impl SyncConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With fetch timeout
    #[inline]
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = duration_ms(timeout);
        self
    }

    /// With push timeout
    #[inline]
    #[must_use]
    pub fn with_push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout_ms = duration_ms(timeout);
        self
    }

    /// With session key
    #[inline]
    #[must_use]
    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.session_key = key.into();
        self
    }

    /// With default saved-build name
    #[inline]
    #[must_use]
    pub fn with_default_build_name(mut self, name: impl Into<String>) -> Self {
        self.default_build_name = name.into();
        self
    }

    /// Fetch timeout as a duration
    #[inline]
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Push timeout as a duration
    #[inline]
    #[must_use]
    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 5_000,
            push_timeout_ms: 5_000,
            session_key: DEFAULT_SESSION_KEY.to_string(),
            default_build_name: DEFAULT_BUILD_NAME.to_string(),
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
