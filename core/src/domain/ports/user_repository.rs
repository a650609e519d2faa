//! Port abstraction for user persistence adapters.

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// A uniqueness constraint on email or username rejected the write.
    ///
    /// Adapters must enforce uniqueness on both natural keys; the cheap
    /// `exists_by_*` pre-flight checks cannot close the check-then-act
    /// window on their own.
    #[error("user already exists for natural key {key}")]
    DuplicateKey {
        /// The conflicting natural key.
        key: String,
    },
}

/// Port for user storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update a user record, keyed by identity.
    async fn save(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Delete a user. Deleting an absent user is not an error.
    async fn delete(&self, id: UserId) -> Result<(), UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by email address.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Cheap existence check by email, distinct from a full fetch.
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, UserRepositoryError>;

    /// Cheap existence check by username.
    async fn exists_by_username(&self, username: &str) -> Result<bool, UserRepositoryError>;
}

/// Fixture implementation for tests that do not exercise user persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserRepository;

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn save(&self, _user: &User) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _id: UserId) -> Result<(), UserRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: UserId) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError> {
        Ok(None)
    }

    async fn exists_by_email(&self, _email: &EmailAddress) -> Result<bool, UserRepositoryError> {
        Ok(false)
    }

    async fn exists_by_username(&self, _username: &str) -> Result<bool, UserRepositoryError> {
        Ok(false)
    }
}
