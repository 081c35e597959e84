//! Cache key derivation.
//!
//! Every cacheable query shape maps to exactly one key, and distinct shapes
//! never share one. Listing keys carry every parameter that changes the
//! result, so a new filter or sort must become a new field here.

use std::fmt;

/// Entity kind for movie records.
pub const MOVIE_KIND: &str = "movie";

/// Key of a cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// One record, `{kind}:{id}`.
    Record { kind: &'static str, id: String },

    /// First page of a listing in the store's natural order,
    /// `{kind}s:first:{limit}`.
    FirstPage { kind: &'static str, limit: i64 },
}

impl CacheKey {
    pub fn movie(id: &str) -> Self {
        Self::Record {
            kind: MOVIE_KIND,
            id: id.to_string(),
        }
    }

    pub fn movie_listing(limit: i64) -> Self {
        Self::FirstPage {
            kind: MOVIE_KIND,
            limit,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record { kind, id } => write!(f, "{kind}:{id}"),
            Self::FirstPage { kind, limit } => write!(f, "{kind}s:first:{limit}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key() {
        assert_eq!(CacheKey::movie("m1").to_string(), "movie:m1");
    }

    #[test]
    fn test_listing_key_encodes_limit() {
        assert_eq!(CacheKey::movie_listing(10).to_string(), "movies:first:10");
        assert_ne!(
            CacheKey::movie_listing(10).to_string(),
            CacheKey::movie_listing(20).to_string()
        );
    }

    #[test]
    fn test_record_and_listing_never_collide() {
        // an id shaped like the listing suffix still lands in the record namespace
        let record = CacheKey::movie("s:first:10").to_string();
        let listing = CacheKey::movie_listing(10).to_string();
        assert_eq!(record, "movie:s:first:10");
        assert_ne!(record, listing);
    }

    #[test]
    fn test_keys_are_deterministic() {
        assert_eq!(CacheKey::movie("abc"), CacheKey::movie("abc"));
        assert_eq!(CacheKey::movie("abc").to_string(), CacheKey::movie("abc").to_string());
    }
}
