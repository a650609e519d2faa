//! Port abstraction for per-user favourite books.
//!
//! A favourite is a bare (user, book) pair with existence semantics only;
//! it has no identity of its own beyond the pair.

use async_trait::async_trait;

use crate::domain::book::{Book, BookId};
use crate::domain::user::UserId;

/// Persistence errors raised by favourite repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FavoriteRepositoryError {
    /// Repository connection could not be established.
    #[error("favorite repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("favorite repository query failed: {message}")]
    Query {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

/// Port for the user-to-book favourite association.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Mark a book as a favourite for a user. Re-adding an existing pair is
    /// a no-op.
    async fn add(&self, user_id: UserId, book_id: BookId) -> Result<(), FavoriteRepositoryError>;

    /// Remove a favourite. Returns whether anything was removed.
    async fn remove(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<bool, FavoriteRepositoryError>;

    /// Whether the user has favourited this book.
    async fn is_favorited(
        &self,
        user_id: UserId,
        book_id: BookId,
    ) -> Result<bool, FavoriteRepositoryError>;

    /// List a user's favourite books with offset pagination.
    async fn list_by_user(
        &self,
        user_id: UserId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Book>, FavoriteRepositoryError>;
}

/// Fixture implementation for tests that do not exercise favourites.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFavoriteRepository;

#[async_trait]
impl FavoriteRepository for FixtureFavoriteRepository {
    async fn add(
        &self,
        _user_id: UserId,
        _book_id: BookId,
    ) -> Result<(), FavoriteRepositoryError> {
        Ok(())
    }

    async fn remove(
        &self,
        _user_id: UserId,
        _book_id: BookId,
    ) -> Result<bool, FavoriteRepositoryError> {
        Ok(false)
    }

    async fn is_favorited(
        &self,
        _user_id: UserId,
        _book_id: BookId,
    ) -> Result<bool, FavoriteRepositoryError> {
        Ok(false)
    }

    async fn list_by_user(
        &self,
        _user_id: UserId,
        _limit: u32,
        _offset: u32,
    ) -> Result<Vec<Book>, FavoriteRepositoryError> {
        Ok(Vec::new())
    }
}
