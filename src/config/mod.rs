//! Configuration module for the movie service.
//!
//! Loads configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::cache::{CacheBackend, CacheConfig};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // HTTP
    pub port: u16,

    /// Directory served for paths no route matches.
    pub public_dir: PathBuf,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Page size of the movie listing.
    pub listing_limit: i64,

    // Cache
    pub cache: CacheConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns error if `MONGODB_URI` is missing, a value fails to parse, or
    /// `CACHE_TTL_SECS` exceeds one year.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mongodb_uri = lookup("MONGODB_URI")
            .or_else(|| lookup("MONGOURI"))
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| anyhow!("MONGODB_URI must be set"))?;

        let ttl = Duration::from_secs(parse(&lookup, "CACHE_TTL_SECS", 3600)?);
        if ttl > CacheConfig::MAX_TTL {
            return Err(anyhow!(
                "CACHE_TTL_SECS must be at most {}, got {}",
                CacheConfig::MAX_TTL.as_secs(),
                ttl.as_secs()
            ));
        }

        let defaults = CacheConfig::default();
        let cache = CacheConfig {
            backend: parse(&lookup, "CACHE_BACKEND", CacheBackend::Redis)?,
            redis_url: lookup("REDIS_URL").unwrap_or_else(|| defaults.redis_url.clone()),
            max_capacity: parse(&lookup, "CACHE_MAX_CAPACITY", defaults.max_capacity)?,
            ..defaults
        }
        .ttl(ttl)
        .op_timeout(Duration::from_millis(parse(&lookup, "CACHE_TIMEOUT_MS", 250)?));

        let listing_limit: i64 = parse(&lookup, "LISTING_LIMIT", 10)?;
        if listing_limit <= 0 {
            return Err(anyhow!("LISTING_LIMIT must be positive, got {listing_limit}"));
        }

        Ok(Self {
            port: parse(&lookup, "PORT", 3000)?,
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("public")),
            mongodb_uri,
            mongodb_database: lookup("MONGODB_DATABASE")
                .or_else(|| lookup("MONGODBNAME"))
                .unwrap_or_else(|| "sample_mflix".to_string()),
            listing_limit,
            cache,
        })
    }
}

/// Parse `key` if set, otherwise fall back to `default`.
fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|err| anyhow!("invalid {key}={raw:?}: {err}")),
        None => Ok(default),
    }
}
