//! Client configuration

use shared::Identity;
use std::time::Duration;

/// Notification channel configuration
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// WebSocket endpoint, e.g. `ws://localhost:8080/ws`
    pub url: String,
    /// Session token, sent as `?token=` on the upgrade request
    pub token: String,
    /// Identity registered after every (re)connect
    pub identity: Identity,
    /// First reconnect delay
    pub reconnect_delay: Duration,
    /// Upper bound for the exponential backoff
    pub max_reconnect_delay: Duration,
    /// Maximum consecutive reconnect attempts (0 means unlimited)
    pub max_reconnect_attempts: u32,
}

impl ChannelConfig {
    /// Defaults: 500 ms first retry, 10 s backoff ceiling, 20 attempts
    pub fn new(url: impl Into<String>, token: impl Into<String>, identity: Identity) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            identity,
            reconnect_delay: Duration::from_millis(500),
            max_reconnect_delay: Duration::from_secs(10),
            max_reconnect_attempts: 20,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    pub fn with_max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.max_reconnect_delay = delay;
        self
    }

    /// 0 means unlimited
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Upgrade URL including the token query parameter
    pub fn endpoint(&self) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{separator}token={}", self.url, self.token)
    }
}

/// Notification store configuration
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Entries older than this are purged
    pub retention: chrono::Duration,
    /// Only the newest entries are written to storage
    pub max_persisted: usize,
    /// Period of the background purge
    pub purge_interval: Duration,
    /// Key under which the list is persisted
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            retention: chrono::Duration::days(7),
            max_persisted: 50,
            purge_interval: Duration::from_secs(2 * 60 * 60),
            storage_key: "packgo.notifications".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_retention(mut self, retention: chrono::Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_max_persisted(mut self, max: usize) -> Self {
        self.max_persisted = max;
        self
    }

    pub fn with_purge_interval(mut self, interval: Duration) -> Self {
        self.purge_interval = interval;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}
