//! Port for password hashing and verification.
//!
//! The hash is one-way and opaque to the core; the algorithm (argon2,
//! bcrypt, ...) is the adapter's choice.

use async_trait::async_trait;

/// Errors surfaced by password security adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordSecurityError {
    /// Hashing or verification failed inside the adapter.
    #[error("password security operation failed: {message}")]
    Hashing {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

/// Port for one-way password hashing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordSecurity: Send + Sync {
    /// Hash a plain-text password into an opaque string.
    async fn hash_password(&self, plain: &str) -> Result<String, PasswordSecurityError>;

    /// Check a plain-text password against a stored hash.
    async fn verify_password(
        &self,
        plain: &str,
        hashed: &str,
    ) -> Result<bool, PasswordSecurityError>;
}

/// Fixture hasher with a reversible marker format, for tests only.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordSecurity;

#[async_trait]
impl PasswordSecurity for FixturePasswordSecurity {
    async fn hash_password(&self, plain: &str) -> Result<String, PasswordSecurityError> {
        Ok(format!("hashed:{plain}"))
    }

    async fn verify_password(
        &self,
        plain: &str,
        hashed: &str,
    ) -> Result<bool, PasswordSecurityError> {
        Ok(hashed == format!("hashed:{plain}"))
    }
}
