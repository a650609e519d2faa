//! Tag application service.
//!
//! Tags are a global, deduplicated vocabulary; the service normalizes
//! incoming names through the value object and defers uniqueness to the
//! repository's get-or-create.

use std::sync::Arc;

use crate::domain::book::BookId;
use crate::domain::error::{DomainResult, Error};
use crate::domain::ports::{
    BookRepository, BookRepositoryError, TagRepository, TagRepositoryError,
};
use crate::domain::tag::{Tag, TagId, TagName};

/// Application service for tag use-cases.
#[derive(Clone)]
pub struct TagService<T, B> {
    tags: Arc<T>,
    books: Arc<B>,
}

impl<T, B> TagService<T, B> {
    /// Create a new service over the given ports.
    pub fn new(tags: Arc<T>, books: Arc<B>) -> Self {
        Self { tags, books }
    }
}

impl<T, B> TagService<T, B>
where
    T: TagRepository,
    B: BookRepository,
{
    /// Fetch the tag named `raw_name` (after normalization), creating it
    /// when absent.
    pub async fn get_or_create(&self, raw_name: &str) -> DomainResult<Tag> {
        let name = TagName::new(raw_name).map_err(|err| Error::invalid_request(err.to_string()))?;
        self.tags
            .get_or_create(&name)
            .await
            .map_err(map_tag_repo_error)
    }

    /// Attach the tag named `raw_name` to a registered book, creating the
    /// tag when absent.
    pub async fn tag_book(&self, book_id: BookId, raw_name: &str) -> DomainResult<Tag> {
        self.existing_book(book_id).await?;
        let tag = self.get_or_create(raw_name).await?;
        self.tags
            .link_to_book(book_id, tag.id())
            .await
            .map_err(map_tag_repo_error)?;
        Ok(tag)
    }

    /// Detach one tag from a book. Detaching an absent association is a
    /// no-op, mirroring the repository contract.
    pub async fn untag_book(&self, book_id: BookId, tag_id: TagId) -> DomainResult<()> {
        self.tags
            .unlink_from_book(book_id, tag_id)
            .await
            .map_err(map_tag_repo_error)
    }

    /// Replace a book's tag set with the given names.
    ///
    /// Every name is normalized and resolved via get-or-create; the book's
    /// previous associations are cleared first.
    pub async fn retag_book(&self, book_id: BookId, raw_names: &[String]) -> DomainResult<Vec<Tag>> {
        self.existing_book(book_id).await?;
        self.tags
            .unlink_all_from_book(book_id)
            .await
            .map_err(map_tag_repo_error)?;

        let mut tags = Vec::with_capacity(raw_names.len());
        for raw_name in raw_names {
            let tag = self.get_or_create(raw_name).await?;
            self.tags
                .link_to_book(book_id, tag.id())
                .await
                .map_err(map_tag_repo_error)?;
            tags.push(tag);
        }
        Ok(tags)
    }

    /// List the tags attached to a book.
    pub async fn tags_for_book(&self, book_id: BookId) -> DomainResult<Vec<Tag>> {
        self.tags
            .tags_for_book(book_id)
            .await
            .map_err(map_tag_repo_error)
    }

    /// List tags with offset pagination.
    pub async fn list(&self, limit: u32, offset: u32) -> DomainResult<Vec<Tag>> {
        self.tags
            .list(limit, offset)
            .await
            .map_err(map_tag_repo_error)
    }

    async fn existing_book(&self, book_id: BookId) -> DomainResult<()> {
        self.books
            .find_by_id(book_id)
            .await
            .map_err(map_book_repo_error)?
            .ok_or_else(|| Error::not_found(format!("book {book_id} not found")))?;
        Ok(())
    }
}

fn map_tag_repo_error(error: TagRepositoryError) -> Error {
    match error {
        TagRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("tag repository unavailable: {message}"))
        }
        TagRepositoryError::Query { message } => {
            Error::internal(format!("tag repository error: {message}"))
        }
    }
}

fn map_book_repo_error(error: BookRepositoryError) -> Error {
    match error {
        BookRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("book repository unavailable: {message}"))
        }
        BookRepositoryError::Query { message } | BookRepositoryError::DuplicateKey { key: message } => {
            Error::internal(format!("book repository error: {message}"))
        }
    }
}
