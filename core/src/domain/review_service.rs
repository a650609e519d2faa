//! Review application service.
//!
//! Guards every mutation: a review can only be added for a locally
//! registered book by an existing user who has not reviewed it yet, and
//! only its author may update or delete it.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::book::ExternalBookId;
use crate::domain::error::{DomainResult, Error};
use crate::domain::ports::{
    BookRepository, BookRepositoryError, ReviewRepository, ReviewRepositoryError, UserRepository,
    UserRepositoryError,
};
use crate::domain::review::{Rating, Review, ReviewId, ReviewText};
use crate::domain::timestamps::Timestamps;
use crate::domain::user::UserId;

/// Application service for review use-cases.
#[derive(Clone)]
pub struct ReviewService<R, B, U> {
    reviews: Arc<R>,
    books: Arc<B>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<R, B, U> ReviewService<R, B, U> {
    /// Create a new service over the given ports.
    pub fn new(reviews: Arc<R>, books: Arc<B>, users: Arc<U>, clock: Arc<dyn Clock>) -> Self {
        Self {
            reviews,
            books,
            users,
            clock,
        }
    }
}

impl<R, B, U> ReviewService<R, B, U>
where
    R: ReviewRepository,
    B: BookRepository,
    U: UserRepository,
{
    /// Add a review for the book registered under `external_book_id`.
    ///
    /// Fails with a conflict when the user already reviewed the book; one
    /// review per user and book is the invariant the pair lookup enforces.
    pub async fn add_review_to_book(
        &self,
        external_book_id: &ExternalBookId,
        user_id: UserId,
        rating: u8,
        text: &str,
    ) -> DomainResult<Review> {
        let book = self
            .books
            .find_by_external_id(external_book_id)
            .await
            .map_err(map_book_repo_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "book {external_book_id} is not registered locally"
                ))
            })?;

        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found(format!("user {user_id} not found")))?;

        if self
            .reviews
            .find_by_user_and_book(user_id, book.id())
            .await
            .map_err(map_review_repo_error)?
            .is_some()
        {
            return Err(Error::conflict(format!(
                "user {} has already reviewed \"{}\"",
                user.username(),
                book.title()
            )));
        }

        let rating = Rating::new(rating).map_err(|err| Error::invalid_request(err.to_string()))?;
        let text = ReviewText::new(text).map_err(|err| Error::invalid_request(err.to_string()))?;

        let now = self.clock.utc();
        let review = Review::new(
            ReviewId::random(),
            rating,
            text,
            book.id(),
            user_id,
            Timestamps::at_creation(now),
        );

        self.reviews
            .save(&review)
            .await
            .map_err(map_review_repo_error)?;
        Ok(review)
    }

    /// Update a review on behalf of its author.
    ///
    /// `new_text` and `new_rating` are partial; absent fields keep their
    /// current value. A non-author caller is refused before any change.
    pub async fn update_user_review(
        &self,
        review_id: ReviewId,
        requesting_user: UserId,
        new_text: Option<&str>,
        new_rating: Option<u8>,
    ) -> DomainResult<Review> {
        let mut review = self.owned_review(review_id, requesting_user).await?;

        review
            .update_review(new_text, new_rating, self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        self.reviews
            .save(&review)
            .await
            .map_err(map_review_repo_error)?;
        Ok(review)
    }

    /// Delete a review on behalf of its author.
    pub async fn delete_user_review(
        &self,
        review_id: ReviewId,
        requesting_user: UserId,
    ) -> DomainResult<()> {
        self.owned_review(review_id, requesting_user).await?;
        self.reviews
            .delete(review_id)
            .await
            .map_err(map_review_repo_error)
    }

    /// List reviews for the book registered under `external_book_id`.
    ///
    /// An unregistered book has no local reviews, so it lists as empty
    /// rather than failing.
    pub async fn reviews_for_book(
        &self,
        external_book_id: &ExternalBookId,
        limit: u32,
        offset: u32,
    ) -> DomainResult<Vec<Review>> {
        let Some(book) = self
            .books
            .find_by_external_id(external_book_id)
            .await
            .map_err(map_book_repo_error)?
        else {
            return Ok(Vec::new());
        };

        self.reviews
            .list_by_book(book.id(), limit, offset)
            .await
            .map_err(map_review_repo_error)
    }

    /// List a user's reviews.
    pub async fn reviews_by_user(
        &self,
        user_id: UserId,
        limit: u32,
        offset: u32,
    ) -> DomainResult<Vec<Review>> {
        self.reviews
            .list_by_user(user_id, limit, offset)
            .await
            .map_err(map_review_repo_error)
    }

    /// Fetch a review and refuse callers other than its author.
    async fn owned_review(
        &self,
        review_id: ReviewId,
        requesting_user: UserId,
    ) -> DomainResult<Review> {
        let review = self
            .reviews
            .find_by_id(review_id)
            .await
            .map_err(map_review_repo_error)?
            .ok_or_else(|| Error::not_found(format!("review {review_id} not found")))?;

        if review.user_id() != requesting_user {
            return Err(Error::forbidden(
                "only the review's author may modify or delete it",
            ));
        }
        Ok(review)
    }
}

fn map_review_repo_error(error: ReviewRepositoryError) -> Error {
    match error {
        ReviewRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("review repository unavailable: {message}"))
        }
        ReviewRepositoryError::Query { message } => {
            Error::internal(format!("review repository error: {message}"))
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

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } | UserRepositoryError::DuplicateKey { key: message } => {
            Error::internal(format!("user repository error: {message}"))
        }
    }
}
