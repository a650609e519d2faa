//! Port interface for the read-side cache.
//!
//! Values are opaque to the port: callers serialize before `set` and
//! deserialize after `get`. TTL expiry is the adapter's concern; an expired
//! entry behaves exactly like an absent one at read time.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Validated cache key: non-empty, no surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a cache key after validating it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if raw.trim() != raw {
            return Err(CacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("cache key must not be empty")]
    Empty,
    /// Key has leading or trailing whitespace.
    #[error("cache key must not contain surrounding whitespace")]
    ContainsWhitespace,
}

/// Errors surfaced by cache adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// Cache backend is unavailable or timing out.
    #[error("cache backend failure: {message}")]
    Backend {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

/// Port for the key-value cache.
///
/// Callers must treat every operation as best-effort: a failing cache must
/// never gate the correctness of a use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Cache: Send + Sync {
    /// Read a cached value. Expired entries read as `None`.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Store a pre-serialized value. A `None` TTL leaves expiry to the
    /// adapter's default policy.
    async fn set(
        &self,
        key: &CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError>;

    /// Remove a value. Returns whether something was removed.
    async fn delete(&self, key: &CacheKey) -> Result<bool, CacheError>;

    /// Whether a live entry exists for this key.
    async fn exists(&self, key: &CacheKey) -> Result<bool, CacheError>;
}

/// Fixture cache that stores nothing and never hits.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCache;

#[async_trait]
impl Cache for FixtureCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &CacheKey,
        _value: &str,
        _ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &CacheKey) -> Result<bool, CacheError> {
        Ok(false)
    }

    async fn exists(&self, _key: &CacheKey) -> Result<bool, CacheError> {
        Ok(false)
    }
}
