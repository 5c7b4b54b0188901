//! Cache configuration.
//!
//! Controls the aggregate TTL cache via `chess-stats.toml`.

use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 3600;

/// Aggregate cache configuration from `chess-stats.toml`.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve aggregate queries through the TTL cache.
    pub enabled: bool,
    /// Lifetime of every entry, measured from its insertion.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            ttl: settings.ttl,
        }
    }
}

impl CacheConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}
