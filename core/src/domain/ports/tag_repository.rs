//! Port abstraction for tag persistence and book-tag associations.

use async_trait::async_trait;

use crate::domain::book::BookId;
use crate::domain::tag::{Tag, TagId, TagName};

/// Persistence errors raised by tag repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagRepositoryError {
    /// Repository connection could not be established.
    #[error("tag repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied diagnostic.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("tag repository query failed: {message}")]
    Query {
        /// Adapter-supplied diagnostic.
        message: String,
    },
}

/// Port for global tags and their many-to-many book associations.
///
/// Names passed in are already normalized by the caller ([`TagName`]
/// normalizes at construction). Adapters must hold a uniqueness constraint
/// on the name so concurrent get-or-create calls converge on one row.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Fetch the tag with this normalized name, creating it when absent.
    async fn get_or_create(&self, name: &TagName) -> Result<Tag, TagRepositoryError>;

    /// Fetch a tag by identifier.
    async fn find_by_id(&self, id: TagId) -> Result<Option<Tag>, TagRepositoryError>;

    /// List tags with offset pagination.
    async fn list(&self, limit: u32, offset: u32) -> Result<Vec<Tag>, TagRepositoryError>;

    /// Associate a tag with a book. Linking an existing pair is a no-op.
    async fn link_to_book(&self, book_id: BookId, tag_id: TagId)
        -> Result<(), TagRepositoryError>;

    /// Remove one book-tag association.
    async fn unlink_from_book(
        &self,
        book_id: BookId,
        tag_id: TagId,
    ) -> Result<(), TagRepositoryError>;

    /// Remove every tag association for a book.
    async fn unlink_all_from_book(&self, book_id: BookId) -> Result<(), TagRepositoryError>;

    /// List the tags associated with a book.
    async fn tags_for_book(&self, book_id: BookId) -> Result<Vec<Tag>, TagRepositoryError>;
}

/// Fixture implementation for tests that do not exercise tag persistence.
///
/// `get_or_create` fabricates a fresh tag for the requested name.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTagRepository;

#[async_trait]
impl TagRepository for FixtureTagRepository {
    async fn get_or_create(&self, name: &TagName) -> Result<Tag, TagRepositoryError> {
        let now = chrono::Utc::now();
        Ok(Tag::new(
            TagId::random(),
            name.clone(),
            crate::domain::timestamps::Timestamps::at_creation(now),
        ))
    }

    async fn find_by_id(&self, _id: TagId) -> Result<Option<Tag>, TagRepositoryError> {
        Ok(None)
    }

    async fn list(&self, _limit: u32, _offset: u32) -> Result<Vec<Tag>, TagRepositoryError> {
        Ok(Vec::new())
    }

    async fn link_to_book(
        &self,
        _book_id: BookId,
        _tag_id: TagId,
    ) -> Result<(), TagRepositoryError> {
        Ok(())
    }

    async fn unlink_from_book(
        &self,
        _book_id: BookId,
        _tag_id: TagId,
    ) -> Result<(), TagRepositoryError> {
        Ok(())
    }

    async fn unlink_all_from_book(&self, _book_id: BookId) -> Result<(), TagRepositoryError> {
        Ok(())
    }

    async fn tags_for_book(&self, _book_id: BookId) -> Result<Vec<Tag>, TagRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Fixture get-or-create behaviour.
    use super::*;

    #[tokio::test]
    async fn fixture_get_or_create_echoes_the_name() {
        let repo = FixtureTagRepository;
        let name = TagName::new("Sci-Fi ").expect("valid name");

        let tag = repo.get_or_create(&name).await.expect("create ok");
        assert_eq!(tag.name().as_ref(), "sci-fi");
    }
}
