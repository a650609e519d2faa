//! Review entity and its value objects.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::book::BookId;
use crate::domain::timestamps::{TimestampError, Timestamps};
use crate::domain::user::UserId;

/// Maximum length of a review body, in characters.
pub const REVIEW_TEXT_MAX: usize = 500;

/// Validation errors raised by review construction and mutation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    /// Rating fell outside the 1–5 range.
    #[error("rating must be an integer between 1 and 5")]
    InvalidRating,
    /// Review body was empty or whitespace-only.
    #[error("review text must not be empty")]
    EmptyText,
    /// Review body exceeded the length cap.
    #[error("review text must not exceed {max} characters")]
    TextTooLong {
        /// The enforced cap.
        max: usize,
    },
    /// Timestamp ordering invariant violated.
    #[error(transparent)]
    Timestamps(#[from] TimestampError),
}

/// Stable review identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewId(Uuid);

impl ReviewId {
    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ReviewId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for ReviewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Star rating in the closed range [1, 5].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Validate and construct a rating.
    pub fn new(value: u8) -> Result<Self, ReviewValidationError> {
        if !(1..=5).contains(&value) {
            return Err(ReviewValidationError::InvalidRating);
        }
        Ok(Self(value))
    }

    /// The rating as a plain integer.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ReviewValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Body of a review: non-blank, at most [`REVIEW_TEXT_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReviewText(String);

impl ReviewText {
    /// Validate and construct a review body.
    pub fn new(value: impl Into<String>) -> Result<Self, ReviewValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ReviewValidationError::EmptyText);
        }
        if value.chars().count() > REVIEW_TEXT_MAX {
            return Err(ReviewValidationError::TextTooLong {
                max: REVIEW_TEXT_MAX,
            });
        }
        Ok(Self(value))
    }
}

impl AsRef<str> for ReviewText {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ReviewText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ReviewText> for String {
    fn from(value: ReviewText) -> Self {
        value.0
    }
}

impl TryFrom<String> for ReviewText {
    type Error = ReviewValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A user's review of a locally registered book.
///
/// ## Invariants
/// - Exactly one book and one user reference, both mandatory by type.
/// - Timestamp ordering per [`Timestamps`].
///
/// One review per (user, book) pair is an application-level rule enforced by
/// the review service, not by this entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Review {
    id: ReviewId,
    rating: Rating,
    text: ReviewText,
    book_id: BookId,
    user_id: UserId,
    timestamps: Timestamps,
}

impl Review {
    /// Construct a review from validated components.
    pub fn new(
        id: ReviewId,
        rating: Rating,
        text: ReviewText,
        book_id: BookId,
        user_id: UserId,
        timestamps: Timestamps,
    ) -> Self {
        Self {
            id,
            rating,
            text,
            book_id,
            user_id,
            timestamps,
        }
    }

    /// Stable review identifier.
    pub fn id(&self) -> ReviewId {
        self.id
    }

    /// Star rating.
    pub fn rating(&self) -> Rating {
        self.rating
    }

    /// Review body.
    pub fn text(&self) -> &ReviewText {
        &self.text
    }

    /// The reviewed book.
    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    /// The review's author.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Moment the review was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.timestamps.created_at()
    }

    /// Moment the review was last mutated.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps.updated_at()
    }

    /// Apply a partial update to the body and/or rating.
    ///
    /// Supplied fields are re-validated through their value objects. Only
    /// actual changes are applied; `updated_at` is stamped only when
    /// something changed, so a no-op update leaves the entity untouched.
    pub fn update_review(
        &mut self,
        new_text: Option<&str>,
        new_rating: Option<u8>,
        now: DateTime<Utc>,
    ) -> Result<(), ReviewValidationError> {
        let mut changed = false;

        if let Some(text) = new_text {
            if self.text.as_ref() != text {
                self.text = ReviewText::new(text)?;
                changed = true;
            }
        }

        if let Some(rating) = new_rating {
            if self.rating.value() != rating {
                self.rating = Rating::new(rating)?;
                changed = true;
            }
        }

        if changed {
            self.timestamps.touch(now);
        }
        Ok(())
    }
}
