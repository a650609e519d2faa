//! Port abstraction for review persistence adapters.

use async_trait::async_trait;

use crate::domain::book::BookId;
use crate::domain::review::{Review, ReviewId};
use crate::domain::user::UserId;

/// Persistence errors raised by review repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewRepositoryError {
    /// Repository connection could not be established.
    #[error("review repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("review repository query failed: {message}")]
    Query {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

/// Port for review storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert or update a review record, keyed by identity.
    async fn save(&self, review: &Review) -> Result<(), ReviewRepositoryError>;

    /// Delete a review. Deleting an absent review is not an error.
    async fn delete(&self, id: ReviewId) -> Result<(), ReviewRepositoryError>;

    /// Fetch a review by identifier.
    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, ReviewRepositoryError>;

    /// List a user's reviews with offset pagination.
    async fn list_by_user(
        &self,
        user_id: UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Review>, ReviewRepositoryError>;

    /// List a book's reviews with offset pagination.
    async fn list_by_book(
        &self,
        book_id: BookId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Review>, ReviewRepositoryError>;

    /// Fetch the review a user wrote for a book, if any. Backs the
    /// one-review-per-(user, book) application rule.
    async fn find_by_user_and_book(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<Option<Review>, ReviewRepositoryError>;
}

/// Fixture implementation for tests that do not exercise review persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureReviewRepository;

#[async_trait]
impl ReviewRepository for FixtureReviewRepository {
    async fn save(&self, _review: &Review) -> Result<(), ReviewRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _id: ReviewId) -> Result<(), ReviewRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: ReviewId) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(None)
    }

    async fn list_by_user(
        &self,
        _user_id: UserId,
        _limit: u32,
        _offset: u32,
    ) -> Result<Vec<Review>, ReviewRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_by_book(
        &self,
        _book_id: BookId,
        _limit: u32,
        _offset: u32,
    ) -> Result<Vec<Review>, ReviewRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_by_user_and_book(
        &self,
        _user_id: UserId,
        _book_id: BookId,
    ) -> Result<Option<Review>, ReviewRepositoryError> {
        Ok(None)
    }
}
