//! Cache configuration.

use std::str::FromStr;
use std::time::Duration;

/// Which cache capability backs the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    #[default]
    Redis,
    Memory,
    /// No cache; every request goes to the store.
    None,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "none" | "off" | "disabled" => Ok(Self::None),
            _ => Err(format!("unknown cache backend: {value}")),
        }
    }
}

/// Configuration for the cache layer.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Connection string for the Redis backend.
    pub redis_url: String,

    /// Time-to-live for every entry written by the coordinator.
    pub ttl: Duration,

    /// Upper bound on any single cache call.
    /// A call that takes longer is treated as a miss / no-op.
    pub op_timeout: Duration,

    /// Maximum number of entries held by the in-process backend.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            ttl: Duration::from_secs(3600), // 1 hour
            op_timeout: Duration::from_millis(250),
            max_capacity: 10_000,
        }
    }
}

impl CacheConfig {
    /// Longest accepted entry time-to-live (one year).
    pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

    /// Set the backend (builder pattern).
    #[must_use]
    pub fn backend(mut self, backend: CacheBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Set the entry time-to-live. Sub-second values are rounded up to one
    /// second since Redis expiry has whole-second resolution.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = duration.max(Duration::from_secs(1));
        self
    }

    #[must_use]
    pub fn op_timeout(mut self, duration: Duration) -> Self {
        self.op_timeout = duration;
        self
    }

    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("redis".parse::<CacheBackend>().unwrap(), CacheBackend::Redis);
        assert_eq!("Memory".parse::<CacheBackend>().unwrap(), CacheBackend::Memory);
        assert_eq!("none".parse::<CacheBackend>().unwrap(), CacheBackend::None);
        assert!("memcached".parse::<CacheBackend>().is_err());
    }

    #[test]
    fn test_ttl_has_one_second_floor() {
        let config = CacheConfig::default().ttl(Duration::ZERO);
        assert_eq!(config.ttl, Duration::from_secs(1));
    }
}
