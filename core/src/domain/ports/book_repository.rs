//! Port abstraction for book persistence adapters.

use async_trait::async_trait;

use crate::domain::book::{Book, BookId, ExternalBookId, Isbn};

/// Persistence errors raised by book repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookRepositoryError {
    /// Repository connection could not be established.
    #[error("book repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("book repository query failed: {message}")]
    Query {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// A uniqueness constraint on a natural key rejected the write.
    ///
    /// Adapters must enforce uniqueness on the external-id natural key so
    /// concurrent get-then-create sequences resolve here instead of
    /// producing duplicate rows; callers treat this as "someone else won,
    /// re-fetch and return theirs".
    #[error("book already exists for natural key {key}")]
    DuplicateKey {
        /// The conflicting natural key.
        key: String,
    },
}

/// Port for book storage and retrieval.
///
/// Lookups return `Ok(None)` for absence; "not found" is never an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Fetch a book by identifier.
    async fn find_by_id(&self, id: BookId) -> Result<Option<Book>, BookRepositoryError>;

    /// Fetch a book by its external-source natural key.
    async fn find_by_external_id(
        &self,
        external_id: &ExternalBookId,
    ) -> Result<Option<Book>, BookRepositoryError>;

    /// Fetch a book by ISBN (either ISBN-10 or ISBN-13 column).
    async fn find_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, BookRepositoryError>;

    /// Insert or update a book record, keyed by identity.
    async fn save(&self, book: &Book) -> Result<(), BookRepositoryError>;

    /// Delete a book. Deleting an absent book is not an error.
    async fn delete(&self, id: BookId) -> Result<(), BookRepositoryError>;

    /// List books with offset pagination.
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Book>, BookRepositoryError>;
}

/// Fixture implementation for tests that do not exercise book persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBookRepository;

#[async_trait]
impl BookRepository for FixtureBookRepository {
    async fn find_by_id(&self, _id: BookId) -> Result<Option<Book>, BookRepositoryError> {
        Ok(None)
    }

    async fn find_by_external_id(
        &self,
        _external_id: &ExternalBookId,
    ) -> Result<Option<Book>, BookRepositoryError> {
        Ok(None)
    }

    async fn find_by_isbn(&self, _isbn: &Isbn) -> Result<Option<Book>, BookRepositoryError> {
        Ok(None)
    }

    async fn save(&self, _book: &Book) -> Result<(), BookRepositoryError> {
        Ok(())
    }

    async fn delete(&self, _id: BookId) -> Result<(), BookRepositoryError> {
        Ok(())
    }

    async fn list(&self, _limit: u32, _offset: u32) -> Result<Vec<Book>, BookRepositoryError> {
        Ok(Vec::new())
    }
}
